use crate::core::ResolverError;
use crate::dns::core::{Interface, QueryType};
use crate::dns::engine::{QueryConfig, QueryEngine};
use crate::dns::rdata::{
    AAAARecord, ARecord, MXRecord, NAPTRRecord, NSRecord, PTRRecord, RecordData, SOARecord, SRVRecord, TXTRecord,
};
use crate::dns::service::ResolverService;
use tokio_util::sync::CancellationToken;

/// Typed, awaitable DNS queries on top of a `ResolverService`.
///
/// Each method performs a single query. Calling `cancel` fails every in-flight query,
/// and every query made afterwards, with `ErrorKind::Cancelled`.
#[derive(Debug)]
pub struct DnsResolver<S>
where
    S: ResolverService,
{
    engine: QueryEngine<S>,
    cancel: CancellationToken,
}

impl<S> DnsResolver<S>
where
    S: ResolverService,
{
    pub fn new(service: S, config: QueryConfig) -> Self {
        Self::with_cancellation(service, config, CancellationToken::new())
    }

    /// Create a resolver whose queries are also cancelled when `token` is cancelled.
    pub fn with_cancellation(service: S, config: QueryConfig, token: CancellationToken) -> Self {
        Self {
            engine: QueryEngine::new(service, config),
            cancel: token,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        self.engine.config()
    }

    /// Cancel every in-flight and future query made by this resolver.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Perform a query of any type, returning the undecorated records.
    pub async fn query(
        &self,
        qtype: QueryType,
        name: &str,
        interface: Interface,
    ) -> Result<Vec<RecordData>, ResolverError> {
        let token = self.cancel.child_token();
        self.engine.query(qtype, name, interface, &token).await
    }

    pub async fn query_a(&self, name: &str) -> Result<Vec<ARecord>, ResolverError> {
        let records = self.query(QueryType::A, name, Interface::Default).await?;
        collect(records, |rd| match rd {
            RecordData::A(a) => Some(a),
            _ => None,
        })
    }

    pub async fn query_aaaa(&self, name: &str) -> Result<Vec<AAAARecord>, ResolverError> {
        let records = self.query(QueryType::AAAA, name, Interface::Default).await?;
        collect(records, |rd| match rd {
            RecordData::AAAA(a) => Some(a),
            _ => None,
        })
    }

    pub async fn query_ns(&self, name: &str) -> Result<NSRecord, ResolverError> {
        let records = self.query(QueryType::NS, name, Interface::Default).await?;
        let names = collect(records, |rd| match rd {
            RecordData::NS(n) => Some(n.to_string()),
            _ => None,
        })?;

        Ok(NSRecord::new(names))
    }

    pub async fn query_cname(&self, name: &str) -> Result<String, ResolverError> {
        let records = self.query(QueryType::CNAME, name, Interface::Default).await?;
        first(QueryType::CNAME, records, |rd| match rd {
            RecordData::CNAME(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub async fn query_soa(&self, name: &str) -> Result<SOARecord, ResolverError> {
        let records = self.query(QueryType::SOA, name, Interface::Default).await?;
        first(QueryType::SOA, records, |rd| match rd {
            RecordData::SOA(s) => Some(s),
            _ => None,
        })
    }

    pub async fn query_ptr(&self, name: &str, interface: Interface) -> Result<PTRRecord, ResolverError> {
        let records = self.query(QueryType::PTR, name, interface).await?;
        let names = collect(records, |rd| match rd {
            RecordData::PTR(n) => Some(n.to_string()),
            _ => None,
        })?;

        Ok(PTRRecord::new(names))
    }

    pub async fn query_mx(&self, name: &str) -> Result<Vec<MXRecord>, ResolverError> {
        let records = self.query(QueryType::MX, name, Interface::Default).await?;
        collect(records, |rd| match rd {
            RecordData::MX(m) => Some(m),
            _ => None,
        })
    }

    pub async fn query_txt(&self, name: &str) -> Result<Vec<TXTRecord>, ResolverError> {
        let records = self.query(QueryType::TXT, name, Interface::Default).await?;
        collect(records, |rd| match rd {
            RecordData::TXT(t) => Some(t),
            _ => None,
        })
    }

    pub async fn query_srv(&self, name: &str, interface: Interface) -> Result<Vec<SRVRecord>, ResolverError> {
        let records = self.query(QueryType::SRV, name, interface).await?;
        collect(records, |rd| match rd {
            RecordData::SRV(s) => Some(s),
            _ => None,
        })
    }

    pub async fn query_naptr(&self, name: &str) -> Result<Vec<NAPTRRecord>, ResolverError> {
        let records = self.query(QueryType::NAPTR, name, Interface::Default).await?;
        collect(records, |rd| match rd {
            RecordData::NAPTR(n) => Some(n),
            _ => None,
        })
    }
}

fn collect<T, F>(records: Vec<RecordData>, f: F) -> Result<Vec<T>, ResolverError>
where
    F: Fn(RecordData) -> Option<T>,
{
    let mut out = Vec::with_capacity(records.len());
    for rd in records {
        let qtype = rd.query_type();
        match f(rd) {
            Some(v) => out.push(v),
            None => {
                return Err(ResolverError::bad_response(format!(
                    "unexpected {} record in response",
                    qtype
                )))
            }
        }
    }

    Ok(out)
}

fn first<T, F>(qtype: QueryType, records: Vec<RecordData>, f: F) -> Result<T, ResolverError>
where
    F: Fn(RecordData) -> Option<T>,
{
    collect(records, f)?
        .into_iter()
        .next()
        .ok_or_else(|| ResolverError::no_data(format!("no {} records in response", qtype)))
}

#[cfg(test)]
mod test {
    use super::DnsResolver;
    use crate::core::ErrorKind;
    use crate::dns::core::Interface;
    use crate::dns::engine::QueryConfig;
    use crate::dns::rdata::{ARecord, IpAddress, MXRecord};
    use crate::dns::test::{ScriptedService, Step};
    use std::net::Ipv4Addr;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[rustfmt::skip]
    const NS1_RDATA: &[u8] = &[
        3,                                // length
        110, 115, 49,                     // "ns1"
        7,                                // length
        101, 120, 97, 109, 112, 108, 101, // "example"
        3,                                // length
        99, 111, 109,                     // "com"
        0,                                // root
    ];

    #[rustfmt::skip]
    const NS2_RDATA: &[u8] = &[
        3,                                // length
        110, 115, 50,                     // "ns2"
        7,                                // length
        101, 120, 97, 109, 112, 108, 101, // "example"
        3,                                // length
        99, 111, 109,                     // "com"
        0,                                // root
    ];

    fn resolver(steps: Vec<Step>) -> DnsResolver<ScriptedService> {
        DnsResolver::new(ScriptedService::new(steps), QueryConfig::default())
    }

    #[tokio::test]
    async fn test_query_a() {
        let resolver = resolver(vec![
            Step::record(&[93, 184, 216, 34], 300, true),
            Step::record(&[93, 184, 216, 35], 300, false),
        ]);

        let records = resolver.query_a("example.com").await.unwrap();
        assert_eq!(
            vec![
                ARecord::new(Ipv4Addr::new(93, 184, 216, 34), 300),
                ARecord::new(Ipv4Addr::new(93, 184, 216, 35), 300),
            ],
            records
        );
        assert_eq!(&IpAddress::V4("93.184.216.35".to_owned()), records[1].address());
    }

    #[tokio::test]
    async fn test_query_ns_aggregates_names() {
        let resolver = resolver(vec![Step::record(NS1_RDATA, 60, true), Step::record(NS2_RDATA, 60, false)]);
        let ns = resolver.query_ns("example.com").await.unwrap();
        assert_eq!(vec!["ns1.example.com.".to_owned(), "ns2.example.com.".to_owned()], ns.nameservers());
    }

    #[tokio::test]
    async fn test_query_ptr_aggregates_names() {
        let resolver = resolver(vec![Step::record(NS1_RDATA, 60, true), Step::record(NS2_RDATA, 60, false)]);
        let ptr = resolver.query_ptr("_dns._udp.local", Interface::LocalOnly).await.unwrap();
        assert_eq!(2, ptr.names().len());
    }

    #[tokio::test]
    async fn test_query_cname() {
        let resolver = resolver(vec![Step::record(NS1_RDATA, 60, false)]);
        assert_eq!("ns1.example.com.", resolver.query_cname("alias.example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_query_cname_no_data() {
        let resolver = resolver(vec![Step::status(0)]);
        let err = resolver.query_cname("alias.example.com").await.unwrap_err();
        assert_eq!(ErrorKind::NoData, err.kind());
    }

    #[rustfmt::skip]
    #[tokio::test]
    async fn test_query_mx() {
        let resolver = resolver(vec![Step::record(&[
            0, 10,                            // priority
            2,                                // length
            109, 120,                         // "mx"
            0,                                // root
        ], 60, false)]);

        assert_eq!(vec![MXRecord::new("mx.".to_owned(), 10)], resolver.query_mx("example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_query_txt_empty() {
        let resolver = resolver(vec![Step::status(0)]);
        assert!(resolver.query_txt("example.com").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_srv_not_found() {
        let resolver = resolver(vec![Step::status(-65538)]);
        let err = resolver.query_srv("_ldap._tcp.example.com", Interface::Default).await.unwrap_err();
        assert_eq!(ErrorKind::NotFound, err.kind());
    }

    #[tokio::test]
    async fn test_cancel_in_flight_and_future() {
        let service = ScriptedService::new(vec![]).hang_after();
        let counters = service.counters();
        let resolver = Arc::new(DnsResolver::new(service, QueryConfig::default()));

        let r = resolver.clone();
        let handle = tokio::spawn(async move { r.query_a("example.com").await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        resolver.cancel();
        assert!(resolver.is_cancelled());

        let err = handle.await.unwrap().unwrap_err();
        assert_eq!(ErrorKind::Cancelled, err.kind());

        let err = resolver.query_aaaa("example.com").await.unwrap_err();
        assert_eq!(ErrorKind::Cancelled, err.kind());

        assert_eq!(1, counters.opened.load(Ordering::Acquire));
        assert_eq!(1, counters.released.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_external_cancellation_token() {
        let token = CancellationToken::new();
        let resolver = DnsResolver::with_cancellation(
            ScriptedService::new(vec![]).hang_after(),
            QueryConfig::default(),
            token.clone(),
        );

        let child = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            child.cancel();
        });

        let err = resolver.query_txt("example.com").await.unwrap_err();
        assert_eq!(ErrorKind::Cancelled, err.kind());
        assert!(resolver.is_cancelled());
    }
}
