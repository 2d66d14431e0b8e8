use asyncdns_client::ResolverError;
use asyncdns_client::dns::{
    AAAARecord, ARecord, DnsResolver, Interface, MXRecord, NAPTRRecord, NSRecord, PTRRecord, QueryConfig, QueryType,
    ResolverService, SOARecord, SRVRecord, SystemService, TXTRecord,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Create a new resolver backed by the native service of this platform. Queries
/// made by the resolver fail with a timeout after `timeout` and are cancelled when
/// `token` is cancelled.
pub fn new_resolver(timeout: Duration, token: CancellationToken) -> DnsResolver<SystemService> {
    let config = QueryConfig { timeout };
    tracing::debug!(message = "creating resolver", timeout = ?config.timeout);
    DnsResolver::with_cancellation(SystemService::new(), config, token)
}

/// Typed result of a single query, one variant per supported record type.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Answer {
    A(Vec<ARecord>),
    AAAA(Vec<AAAARecord>),
    NS(NSRecord),
    CNAME(String),
    SOA(SOARecord),
    PTR(PTRRecord),
    MX(Vec<MXRecord>),
    TXT(Vec<TXTRecord>),
    SRV(Vec<SRVRecord>),
    NAPTR(Vec<NAPTRRecord>),
}

impl Answer {
    pub fn query_type(&self) -> QueryType {
        match self {
            Answer::A(_) => QueryType::A,
            Answer::AAAA(_) => QueryType::AAAA,
            Answer::NS(_) => QueryType::NS,
            Answer::CNAME(_) => QueryType::CNAME,
            Answer::SOA(_) => QueryType::SOA,
            Answer::PTR(_) => QueryType::PTR,
            Answer::MX(_) => QueryType::MX,
            Answer::TXT(_) => QueryType::TXT,
            Answer::SRV(_) => QueryType::SRV,
            Answer::NAPTR(_) => QueryType::NAPTR,
        }
    }
}

/// Perform a query for `name` through the typed resolver method for `qtype`.
///
/// Only PTR and SRV queries can be scoped to an interface, other types always use
/// the default interface.
pub async fn lookup<S>(
    resolver: &DnsResolver<S>,
    qtype: QueryType,
    name: &str,
    interface: Interface,
) -> Result<Answer, ResolverError>
where
    S: ResolverService,
{
    if interface != Interface::Default && !matches!(qtype, QueryType::PTR | QueryType::SRV) {
        tracing::warn!(message = "interface is ignored for record type", rtype = %qtype, interface = %interface);
    }

    Ok(match qtype {
        QueryType::A => Answer::A(resolver.query_a(name).await?),
        QueryType::AAAA => Answer::AAAA(resolver.query_aaaa(name).await?),
        QueryType::NS => Answer::NS(resolver.query_ns(name).await?),
        QueryType::CNAME => Answer::CNAME(resolver.query_cname(name).await?),
        QueryType::SOA => Answer::SOA(resolver.query_soa(name).await?),
        QueryType::PTR => Answer::PTR(resolver.query_ptr(name, interface).await?),
        QueryType::MX => Answer::MX(resolver.query_mx(name).await?),
        QueryType::TXT => Answer::TXT(resolver.query_txt(name).await?),
        QueryType::SRV => Answer::SRV(resolver.query_srv(name, interface).await?),
        QueryType::NAPTR => Answer::NAPTR(resolver.query_naptr(name).await?),
    })
}
