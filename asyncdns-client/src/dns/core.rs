use crate::core::ResolverError;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

/// Class used for every query. Only the internet class is supported.
pub const CLASS_INET: u16 = 1;

/// Type of record requested by a query.
///
/// The query type selects both how the rdata of each answer is decoded and
/// when a query is considered complete.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum QueryType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    SRV,
    NAPTR,
}

impl QueryType {
    /// Return true if answers for this type are a single logical result (NS, CNAME,
    /// SOA, PTR) and a query that completes without any answers is an error.
    pub fn is_single_answer(&self) -> bool {
        matches!(self, Self::NS | Self::CNAME | Self::SOA | Self::PTR)
    }
}

impl TryFrom<u16> for QueryType {
    type Error = ResolverError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::A),
            2 => Ok(Self::NS),
            5 => Ok(Self::CNAME),
            6 => Ok(Self::SOA),
            12 => Ok(Self::PTR),
            15 => Ok(Self::MX),
            16 => Ok(Self::TXT),
            28 => Ok(Self::AAAA),
            33 => Ok(Self::SRV),
            35 => Ok(Self::NAPTR),
            v => Err(ResolverError::invalid_query(format!(
                "invalid or unsupported record type {}",
                v
            ))),
        }
    }
}

impl From<QueryType> for u16 {
    fn from(value: QueryType) -> Self {
        match value {
            QueryType::A => 1,
            QueryType::NS => 2,
            QueryType::CNAME => 5,
            QueryType::SOA => 6,
            QueryType::PTR => 12,
            QueryType::MX => 15,
            QueryType::TXT => 16,
            QueryType::AAAA => 28,
            QueryType::SRV => 33,
            QueryType::NAPTR => 35,
        }
    }
}

impl Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::A => write!(f, "A"),
            QueryType::NS => write!(f, "NS"),
            QueryType::CNAME => write!(f, "CNAME"),
            QueryType::SOA => write!(f, "SOA"),
            QueryType::PTR => write!(f, "PTR"),
            QueryType::MX => write!(f, "MX"),
            QueryType::TXT => write!(f, "TXT"),
            QueryType::AAAA => write!(f, "AAAA"),
            QueryType::SRV => write!(f, "SRV"),
            QueryType::NAPTR => write!(f, "NAPTR"),
        }
    }
}

impl FromStr for QueryType {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_uppercase();
        match s.as_ref() {
            "A" => Ok(QueryType::A),
            "NS" => Ok(QueryType::NS),
            "CNAME" => Ok(QueryType::CNAME),
            "SOA" => Ok(QueryType::SOA),
            "PTR" => Ok(QueryType::PTR),
            "MX" => Ok(QueryType::MX),
            "TXT" => Ok(QueryType::TXT),
            "AAAA" => Ok(QueryType::AAAA),
            "SRV" => Ok(QueryType::SRV),
            "NAPTR" => Ok(QueryType::NAPTR),
            v => Err(ResolverError::invalid_query(format!("unknown record type '{}'", v))),
        }
    }
}

/// Network interfaces a query is scoped to.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Interface {
    /// Any interface, as chosen by the native service.
    #[default]
    Default,
    /// Only records registered on the local host.
    LocalOnly,
}

impl Interface {
    const INDEX_ANY: u32 = 0;
    const INDEX_LOCAL_ONLY: u32 = u32::MAX;

    /// Interface index passed to the native service when opening a session.
    pub fn index(&self) -> u32 {
        match self {
            Self::Default => Self::INDEX_ANY,
            Self::LocalOnly => Self::INDEX_LOCAL_ONLY,
        }
    }
}

impl Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::LocalOnly => write!(f, "local-only"),
        }
    }
}

impl FromStr for Interface {
    type Err = ResolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_ref() {
            "default" => Ok(Self::Default),
            "local-only" | "localonly" => Ok(Self::LocalOnly),
            v => Err(ResolverError::invalid_query(format!("unknown interface '{}'", v))),
        }
    }
}
