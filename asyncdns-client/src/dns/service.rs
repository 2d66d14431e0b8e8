use crate::dns::core::{Interface, QueryType};
use crate::dns::name::Name;
use std::fmt;
use std::sync::Arc;

/// One invocation of a native session callback.
///
/// The rdata is only borrowed for the duration of the callback and must be decoded
/// or copied before the callback returns.
#[derive(Debug, Clone, Copy)]
pub struct RawAnswer<'a> {
    /// Native status code, zero for success.
    pub status: i32,
    /// More answers for the same query follow this one.
    pub more_coming: bool,
    /// Wire format rdata, absent for notifications that carry no record.
    pub rdata: Option<&'a [u8]>,
    pub ttl: Option<u32>,
    pub interface_index: u32,
}

impl<'a> RawAnswer<'a> {
    /// Answer carrying a single record.
    pub fn record(rdata: &'a [u8], ttl: u32, more_coming: bool) -> Self {
        Self {
            status: 0,
            more_coming,
            rdata: Some(rdata),
            ttl: Some(ttl),
            interface_index: 0,
        }
    }

    /// Answer carrying only a status code and no record.
    pub fn status(status: i32) -> Self {
        Self {
            status,
            more_coming: false,
            rdata: None,
            ttl: None,
            interface_index: 0,
        }
    }
}

/// Callback registered with a native session. May be invoked from any thread,
/// any number of times, including after the session has been released.
pub type ReplyCallback = Arc<dyn Fn(RawAnswer<'_>) + Send + Sync + 'static>;

/// Parameters of a native session for a single logical query.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SessionRequest {
    pub name: Name,
    pub qtype: QueryType,
    pub interface: Interface,
}

impl fmt::Display for SessionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.qtype, self.name, self.interface)
    }
}

/// Callback driven, session based name resolution service.
///
/// Implementations deliver zero or more answers and then a final answer without
/// the "more coming" flag, or a non-success status, to the callback of an opened
/// session. Every session returned by `open` is passed to `release` exactly once.
pub trait ResolverService: Send + Sync + 'static {
    type Session: Send + 'static;

    /// Open a session for the request, returning a native status code on failure.
    fn open(&self, request: &SessionRequest, callback: ReplyCallback) -> Result<Self::Session, i32>;

    /// Stop delivering answers for the session and free any native resources.
    fn release(&self, session: Self::Session);
}
