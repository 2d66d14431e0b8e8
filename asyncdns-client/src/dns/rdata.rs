use crate::core::{ErrorKind, ResolverError};
use crate::dns::core::QueryType;
use crate::dns::name::Name;
use byteorder::{NetworkEndian, ReadBytesExt};
use std::fmt::{self, Display};
use std::io::{Cursor, Read, Seek};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Decoded rdata of a single answer.
///
/// Each variant corresponds to one `QueryType`. NS, CNAME, and PTR answers are a
/// single name each; the facade combines them into the public record shapes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RecordData {
    A(ARecord),
    NS(Name),
    CNAME(Name),
    SOA(SOARecord),
    PTR(Name),
    MX(MXRecord),
    TXT(TXTRecord),
    AAAA(AAAARecord),
    SRV(SRVRecord),
    NAPTR(NAPTRRecord),
}

impl RecordData {
    pub fn query_type(&self) -> QueryType {
        match self {
            Self::A(_) => QueryType::A,
            Self::NS(_) => QueryType::NS,
            Self::CNAME(_) => QueryType::CNAME,
            Self::SOA(_) => QueryType::SOA,
            Self::PTR(_) => QueryType::PTR,
            Self::MX(_) => QueryType::MX,
            Self::TXT(_) => QueryType::TXT,
            Self::AAAA(_) => QueryType::AAAA,
            Self::SRV(_) => QueryType::SRV,
            Self::NAPTR(_) => QueryType::NAPTR,
        }
    }

    /// Decode the rdata of a single answer for a query of type `qtype`.
    ///
    /// All of `rdata` must be consumed by the decoder for its type. Any failure,
    /// including truncated or trailing bytes, is returned as `ErrorKind::BadResponse`.
    pub fn read_network_bytes(qtype: QueryType, rdata: &[u8], ttl: Option<u32>) -> Result<Self, ResolverError> {
        let mut cur = Cursor::new(rdata);
        let res = match qtype {
            QueryType::A => ARecord::read_network_bytes(ttl, &mut cur).map(RecordData::A),
            QueryType::NS => Name::read_network_bytes(&mut cur).map(RecordData::NS),
            QueryType::CNAME => Name::read_network_bytes(&mut cur).map(RecordData::CNAME),
            QueryType::SOA => SOARecord::read_network_bytes(&mut cur).map(RecordData::SOA),
            QueryType::PTR => Name::read_network_bytes(&mut cur).map(RecordData::PTR),
            QueryType::MX => MXRecord::read_network_bytes(&mut cur).map(RecordData::MX),
            QueryType::TXT => TXTRecord::read_network_bytes(rdata.len(), &mut cur).map(RecordData::TXT),
            QueryType::AAAA => AAAARecord::read_network_bytes(ttl, &mut cur).map(RecordData::AAAA),
            QueryType::SRV => SRVRecord::read_network_bytes(&mut cur).map(RecordData::SRV),
            QueryType::NAPTR => NAPTRRecord::read_network_bytes(&mut cur).map(RecordData::NAPTR),
        };

        let rd = res.map_err(|e| {
            if e.kind() == ErrorKind::BadResponse {
                e
            } else {
                ResolverError::bad_response_cause(format!("malformed {} rdata", qtype), e)
            }
        })?;

        let consumed = cur.position();
        if consumed != rdata.len() as u64 {
            return Err(ResolverError::bad_response(format!(
                "{} rdata has trailing bytes; consumed {} of {}",
                qtype,
                consumed,
                rdata.len()
            )));
        }

        Ok(rd)
    }
}

impl Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(rd) => Display::fmt(rd, f),
            RecordData::NS(rd) => Display::fmt(rd, f),
            RecordData::CNAME(rd) => Display::fmt(rd, f),
            RecordData::SOA(rd) => Display::fmt(rd, f),
            RecordData::PTR(rd) => Display::fmt(rd, f),
            RecordData::MX(rd) => Display::fmt(rd, f),
            RecordData::TXT(rd) => Display::fmt(rd, f),
            RecordData::AAAA(rd) => Display::fmt(rd, f),
            RecordData::SRV(rd) => Display::fmt(rd, f),
            RecordData::NAPTR(rd) => Display::fmt(rd, f),
        }
    }
}

/// Read a single length prefixed character-string.
fn read_character_string<T>(mut buf: T) -> Result<Vec<u8>, ResolverError>
where
    T: ReadBytesExt,
{
    let len = buf.read_u8()?;
    let mut bytes = Vec::with_capacity(usize::from(len));
    let n = buf.take(u64::from(len)).read_to_end(&mut bytes)?;
    if n != usize::from(len) {
        return Err(ResolverError::bad_response(format!(
            "short read for character-string; expected {}, got {}",
            len, n
        )));
    }

    Ok(bytes)
}

/// Character-string as optional text, `None` when the string is empty.
fn read_optional_string<T>(buf: T) -> Result<Option<String>, ResolverError>
where
    T: ReadBytesExt,
{
    let bytes = read_character_string(buf)?;
    if bytes.is_empty() {
        Ok(None)
    } else {
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// IP address in its textual presentation form.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum IpAddress {
    V4(String),
    V6(String),
}

impl Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(addr) => write!(f, "{}", addr),
            Self::V6(addr) => write!(f, "{}", addr),
        }
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(value: Ipv4Addr) -> Self {
        Self::V4(value.to_string())
    }
}

impl From<Ipv6Addr> for IpAddress {
    fn from(value: Ipv6Addr) -> Self {
        Self::V6(value.to_string())
    }
}

fn required_ttl(qtype: QueryType, ttl: Option<u32>) -> Result<u32, ResolverError> {
    ttl.ok_or_else(|| ResolverError::bad_response(format!("missing TTL for {} record", qtype)))
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ARecord {
    address: IpAddress,
    ttl: u32,
}

impl ARecord {
    pub fn new(addr: Ipv4Addr, ttl: u32) -> Self {
        Self {
            address: IpAddress::from(addr),
            ttl,
        }
    }

    pub fn address(&self) -> &IpAddress {
        &self.address
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    fn read_network_bytes<T>(ttl: Option<u32>, mut buf: T) -> Result<Self, ResolverError>
    where
        T: ReadBytesExt + Seek,
    {
        let ttl = required_ttl(QueryType::A, ttl)?;
        let mut bytes = [0_u8; 4];
        buf.read_exact(&mut bytes)?;
        Ok(Self::new(Ipv4Addr::from(bytes), ttl))
    }
}

impl Display for ARecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARecord(address={}, ttl={})", self.address, self.ttl)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AAAARecord {
    address: IpAddress,
    ttl: u32,
}

impl AAAARecord {
    pub fn new(addr: Ipv6Addr, ttl: u32) -> Self {
        Self {
            address: IpAddress::from(addr),
            ttl,
        }
    }

    pub fn address(&self) -> &IpAddress {
        &self.address
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    fn read_network_bytes<T>(ttl: Option<u32>, mut buf: T) -> Result<Self, ResolverError>
    where
        T: ReadBytesExt + Seek,
    {
        let ttl = required_ttl(QueryType::AAAA, ttl)?;
        let mut bytes = [0_u8; 16];
        buf.read_exact(&mut bytes)?;
        Ok(Self::new(Ipv6Addr::from(bytes), ttl))
    }
}

impl Display for AAAARecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AAAARecord(address={}, ttl={})", self.address, self.ttl)
    }
}

/// Name servers for a domain, one per answer of an NS query.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NSRecord {
    nameservers: Vec<String>,
}

impl NSRecord {
    pub fn new(nameservers: Vec<String>) -> Self {
        Self { nameservers }
    }

    pub fn nameservers(&self) -> &[String] {
        &self.nameservers
    }
}

impl Display for NSRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NSRecord(nameservers={:?})", self.nameservers)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SOARecord {
    mname: Option<String>,
    rname: Option<String>,
    serial: u32,
    refresh: u32,
    retry: u32,
    expire: u32,
    ttl: u32,
}

impl SOARecord {
    pub fn new(
        mname: Option<String>,
        rname: Option<String>,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        ttl: u32,
    ) -> Self {
        Self {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            ttl,
        }
    }

    /// Primary name server for the zone, `None` if the rdata named the root.
    pub fn mname(&self) -> Option<&str> {
        self.mname.as_deref()
    }

    /// Mailbox of the person responsible for the zone, `None` if the rdata named the root.
    pub fn rname(&self) -> Option<&str> {
        self.rname.as_deref()
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }

    pub fn refresh(&self) -> u32 {
        self.refresh
    }

    pub fn retry(&self) -> u32 {
        self.retry
    }

    pub fn expire(&self) -> u32 {
        self.expire
    }

    /// Minimum TTL field of the SOA record.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    fn read_network_bytes<T>(mut buf: T) -> Result<Self, ResolverError>
    where
        T: ReadBytesExt + Seek,
    {
        let mname = Name::read_network_bytes(&mut buf)?;
        let rname = Name::read_network_bytes(&mut buf)?;
        let serial = buf.read_u32::<NetworkEndian>()?;
        let refresh = buf.read_u32::<NetworkEndian>()?;
        let retry = buf.read_u32::<NetworkEndian>()?;
        let expire = buf.read_u32::<NetworkEndian>()?;
        let ttl = buf.read_u32::<NetworkEndian>()?;

        let text = |n: Name| if n.is_root() { None } else { Some(n.to_string()) };
        Ok(Self::new(text(mname), text(rname), serial, refresh, retry, expire, ttl))
    }
}

impl Display for SOARecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SOARecord(mname={}, rname={}, serial={}, refresh={}, retry={}, expire={}, ttl={})",
            self.mname.as_deref().unwrap_or(""),
            self.rname.as_deref().unwrap_or(""),
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.ttl
        )
    }
}

/// Names pointed to by a PTR query, one per answer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PTRRecord {
    names: Vec<String>,
}

impl PTRRecord {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl Display for PTRRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PTRRecord(names={:?})", self.names)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MXRecord {
    host: String,
    priority: u16,
}

impl MXRecord {
    pub fn new(host: String, priority: u16) -> Self {
        Self { host, priority }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn priority(&self) -> u16 {
        self.priority
    }

    fn read_network_bytes<T>(mut buf: T) -> Result<Self, ResolverError>
    where
        T: ReadBytesExt + Seek,
    {
        let priority = buf.read_u16::<NetworkEndian>()?;
        let host = Name::read_network_bytes(buf)?;
        Ok(Self::new(host.to_string(), priority))
    }
}

impl Display for MXRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MXRecord(host={}, priority={})", self.host, self.priority)
    }
}

/// Text of a single TXT answer.
///
/// A TXT answer is made up of one or more character-strings. `txt` is all of them
/// concatenated without a separator, the convention used for long SPF and DKIM
/// values that are split across strings. The individual strings are kept as well
/// for key/value style records such as DNS-SD metadata.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TXTRecord {
    txt: String,
    strings: Vec<String>,
}

impl TXTRecord {
    pub fn new<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let strings: Vec<String> = strings.into_iter().map(|s| s.into()).collect();
        let txt = strings.concat();
        Self { txt, strings }
    }

    pub fn txt(&self) -> &str {
        &self.txt
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    fn read_network_bytes<T>(rdata_len: usize, mut buf: T) -> Result<Self, ResolverError>
    where
        T: ReadBytesExt + Seek,
    {
        if rdata_len == 0 {
            return Err(ResolverError::bad_response("TXT rdata must contain at least one string"));
        }

        let mut all = Vec::new();
        let mut consumed = 0;

        while consumed < rdata_len {
            let bytes = read_character_string(&mut buf)?;
            consumed += bytes.len() + 1;
            // Text that isn't valid UTF-8 is kept with replacement characters rather
            // than failing the entire query.
            all.push(String::from_utf8_lossy(&bytes).into_owned());
        }

        Ok(Self::new(all))
    }
}

impl Display for TXTRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TXTRecord({})", self.txt)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SRVRecord {
    host: String,
    port: u16,
    weight: u16,
    priority: u16,
}

impl SRVRecord {
    pub fn new(host: String, port: u16, weight: u16, priority: u16) -> Self {
        Self {
            host,
            port,
            weight,
            priority,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn weight(&self) -> u16 {
        self.weight
    }

    pub fn priority(&self) -> u16 {
        self.priority
    }

    fn read_network_bytes<T>(mut buf: T) -> Result<Self, ResolverError>
    where
        T: ReadBytesExt + Seek,
    {
        let priority = buf.read_u16::<NetworkEndian>()?;
        let weight = buf.read_u16::<NetworkEndian>()?;
        let port = buf.read_u16::<NetworkEndian>()?;
        let target = Name::read_network_bytes(buf)?;

        Ok(Self::new(target.to_string(), port, weight, priority))
    }
}

impl Display for SRVRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SRVRecord(host={}, port={}, weight={}, priority={})",
            self.host, self.port, self.weight, self.priority
        )
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NAPTRRecord {
    flags: Option<String>,
    service: Option<String>,
    regexp: Option<String>,
    replacement: String,
    order: u16,
    preference: u16,
}

impl NAPTRRecord {
    pub fn new(
        flags: Option<String>,
        service: Option<String>,
        regexp: Option<String>,
        replacement: String,
        order: u16,
        preference: u16,
    ) -> Self {
        Self {
            flags,
            service,
            regexp,
            replacement,
            order,
            preference,
        }
    }

    pub fn flags(&self) -> Option<&str> {
        self.flags.as_deref()
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn regexp(&self) -> Option<&str> {
        self.regexp.as_deref()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn order(&self) -> u16 {
        self.order
    }

    pub fn preference(&self) -> u16 {
        self.preference
    }

    fn read_network_bytes<T>(mut buf: T) -> Result<Self, ResolverError>
    where
        T: ReadBytesExt + Seek,
    {
        let order = buf.read_u16::<NetworkEndian>()?;
        let preference = buf.read_u16::<NetworkEndian>()?;
        let flags = read_optional_string(&mut buf)?;
        let service = read_optional_string(&mut buf)?;
        let regexp = read_optional_string(&mut buf)?;
        let replacement = Name::read_network_bytes(buf)?;

        Ok(Self::new(
            flags,
            service,
            regexp,
            replacement.to_string(),
            order,
            preference,
        ))
    }
}

impl Display for NAPTRRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NAPTRRecord(flags={}, service={}, regExp={}, replacement={}, order={}, preference={})",
            self.flags.as_deref().unwrap_or(""),
            self.service.as_deref().unwrap_or(""),
            self.regexp.as_deref().unwrap_or(""),
            self.replacement,
            self.order,
            self.preference
        )
    }
}
