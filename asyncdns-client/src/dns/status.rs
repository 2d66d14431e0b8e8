use crate::core::{ErrorKind, ResolverError};
use std::fmt;
use std::fmt::Display;

/// Status code reported by the native DNS service.
///
/// Codes are negative except for `NoError`. The value -65546 is not assigned.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum ServiceStatus {
    NoError = 0,
    Unknown = -65537,
    NoSuchName = -65538,
    NoMemory = -65539,
    BadParam = -65540,
    BadReference = -65541,
    BadState = -65542,
    BadFlags = -65543,
    Unsupported = -65544,
    NotInitialized = -65545,
    AlreadyRegistered = -65547,
    NameConflict = -65548,
    Invalid = -65549,
    Firewall = -65550,
    Incompatible = -65551,
    BadInterfaceIndex = -65552,
    Refused = -65553,
    NoSuchRecord = -65554,
    NoAuth = -65555,
    NoSuchKey = -65556,
    NATTraversal = -65557,
    DoubleNAT = -65558,
    BadTime = -65559,
    BadSig = -65560,
    BadKey = -65561,
    Transient = -65562,
    ServiceNotRunning = -65563,
    NATPortMappingUnsupported = -65564,
    NATPortMappingDisabled = -65565,
    NoRouter = -65566,
    PollingMode = -65567,
    Timeout = -65568,
    DefunctConnection = -65569,
    PolicyDenied = -65570,
    NotPermitted = -65571,
}

impl ServiceStatus {
    const ALL: [ServiceStatus; 35] = [
        Self::NoError,
        Self::Unknown,
        Self::NoSuchName,
        Self::NoMemory,
        Self::BadParam,
        Self::BadReference,
        Self::BadState,
        Self::BadFlags,
        Self::Unsupported,
        Self::NotInitialized,
        Self::AlreadyRegistered,
        Self::NameConflict,
        Self::Invalid,
        Self::Firewall,
        Self::Incompatible,
        Self::BadInterfaceIndex,
        Self::Refused,
        Self::NoSuchRecord,
        Self::NoAuth,
        Self::NoSuchKey,
        Self::NATTraversal,
        Self::DoubleNAT,
        Self::BadTime,
        Self::BadSig,
        Self::BadKey,
        Self::Transient,
        Self::ServiceNotRunning,
        Self::NATPortMappingUnsupported,
        Self::NATPortMappingDisabled,
        Self::NoRouter,
        Self::PollingMode,
        Self::Timeout,
        Self::DefunctConnection,
        Self::PolicyDenied,
        Self::NotPermitted,
    ];

    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn all() -> &'static [ServiceStatus] {
        &Self::ALL
    }
}

impl TryFrom<i32> for ServiceStatus {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::ALL.iter().find(|s| s.code() == value).copied().ok_or(value)
    }
}

impl Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug output of a fieldless enum is the variant name
        fmt::Debug::fmt(self, f)
    }
}

/// Translate a native status code into an error.
///
/// Every code produces an error, including `NoError`, so callers must only use this
/// for codes they have already determined to be failures. See `check_status`.
pub fn map_status(code: i32) -> ResolverError {
    let status = match ServiceStatus::try_from(code) {
        Ok(s) => s,
        Err(c) => {
            return ResolverError::native(
                ErrorKind::Other(c),
                c,
                format!("unrecognized DNS service status {}", c),
            );
        }
    };

    let kind = match status {
        ServiceStatus::NoSuchName => ErrorKind::NotFound,
        ServiceStatus::NoMemory => ErrorKind::NoMemory,
        ServiceStatus::BadParam => ErrorKind::BadQuery,
        ServiceStatus::BadFlags => ErrorKind::BadFlags,
        ServiceStatus::Unsupported => ErrorKind::NotImplemented,
        ServiceStatus::NotInitialized => ErrorKind::NotInitialized,
        ServiceStatus::Refused => ErrorKind::ServerRefused,
        ServiceStatus::NoSuchRecord => ErrorKind::NoData,
        ServiceStatus::Timeout => ErrorKind::Timeout,
        ServiceStatus::ServiceNotRunning => ErrorKind::Service,
        ServiceStatus::Invalid => ErrorKind::InvalidQuery,
        s => ErrorKind::NativeService(s),
    };

    ResolverError::native(kind, code, format!("DNS service status {} ({})", status, code))
}

/// Return `Ok` for a successful status code or the mapped error otherwise.
pub fn check_status(code: i32) -> Result<(), ResolverError> {
    if code == ServiceStatus::NoError.code() {
        Ok(())
    } else {
        Err(map_status(code))
    }
}
