use crate::dns::service::{ReplyCallback, ResolverService, SessionRequest};
use crate::dns::status::ServiceStatus;

/// Native resolution service of the current platform.
#[cfg(target_os = "macos")]
pub type SystemService = crate::dns::dnssd::DnssdService;

/// Native resolution service of the current platform.
#[cfg(not(target_os = "macos"))]
pub type SystemService = UnavailableService;

/// `ResolverService` for platforms without a supported native service. Every
/// session fails to open with `ServiceStatus::ServiceNotRunning`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableService;

impl UnavailableService {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug)]
pub struct UnavailableSession;

impl ResolverService for UnavailableService {
    type Session = UnavailableSession;

    fn open(&self, request: &SessionRequest, _callback: ReplyCallback) -> Result<Self::Session, i32> {
        tracing::debug!(message = "no native DNS service available", query = %request);
        Err(ServiceStatus::ServiceNotRunning.code())
    }

    fn release(&self, _session: Self::Session) {}
}
