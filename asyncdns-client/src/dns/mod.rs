mod core;
#[cfg(target_os = "macos")]
mod dnssd;
#[cfg(any(target_os = "macos", test))]
mod dnssd_reply;
mod engine;
mod name;
mod rdata;
mod reply;
mod resolver;
mod service;
mod status;
mod system;
#[cfg(test)]
pub(crate) mod test;

pub use crate::dns::core::{Interface, QueryType, CLASS_INET};
#[cfg(target_os = "macos")]
pub use crate::dns::dnssd::{DnssdService, DnssdSession};
pub use crate::dns::engine::{QueryConfig, QueryEngine};
pub use crate::dns::name::Name;
pub use crate::dns::rdata::{
    AAAARecord, ARecord, IpAddress, MXRecord, NAPTRRecord, NSRecord, PTRRecord, RecordData, SOARecord, SRVRecord,
    TXTRecord,
};
pub use crate::dns::reply::{Accumulation, ReplyAccumulator};
pub use crate::dns::resolver::DnsResolver;
pub use crate::dns::service::{RawAnswer, ReplyCallback, ResolverService, SessionRequest};
pub use crate::dns::status::{check_status, map_status, ServiceStatus};
pub use crate::dns::system::{SystemService, UnavailableService, UnavailableSession};
