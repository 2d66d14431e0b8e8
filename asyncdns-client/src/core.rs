use crate::dns::ServiceStatus;
use std::error;
use std::fmt;
use std::io;
use std::time::Duration;

/// Category of a failed query.
///
/// Every native status code and decoding failure is translated into one of
/// these before it reaches a caller. Failures that came from the native service
/// also retain the raw status code, available via `ResolverError::status`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    NoData,
    InvalidQuery,
    ServerFailure,
    NotFound,
    NotImplemented,
    ServerRefused,
    BadQuery,
    BadName,
    BadFamily,
    BadResponse,
    ConnectionRefused,
    Timeout,
    Eof,
    FileIO,
    NoMemory,
    Destruction,
    BadString,
    BadFlags,
    NoName,
    BadHints,
    NotInitialized,
    InitError,
    Cancelled,
    Service,
    NativeService(ServiceStatus),
    Other(i32),
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "no data"),
            Self::InvalidQuery => write!(f, "invalid query"),
            Self::ServerFailure => write!(f, "server failure"),
            Self::NotFound => write!(f, "not found"),
            Self::NotImplemented => write!(f, "not implemented"),
            Self::ServerRefused => write!(f, "server refused"),
            Self::BadQuery => write!(f, "bad query"),
            Self::BadName => write!(f, "bad name"),
            Self::BadFamily => write!(f, "bad family"),
            Self::BadResponse => write!(f, "bad response"),
            Self::ConnectionRefused => write!(f, "connection refused"),
            Self::Timeout => write!(f, "timeout"),
            Self::Eof => write!(f, "EOF"),
            Self::FileIO => write!(f, "file IO"),
            Self::NoMemory => write!(f, "no memory"),
            Self::Destruction => write!(f, "destruction"),
            Self::BadString => write!(f, "bad string"),
            Self::BadFlags => write!(f, "bad flags"),
            Self::NoName => write!(f, "no name"),
            Self::BadHints => write!(f, "bad hints"),
            Self::NotInitialized => write!(f, "not initialized"),
            Self::InitError => write!(f, "initialization error"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Service => write!(f, "service"),
            Self::NativeService(s) => write!(f, "DNS service: {} [{}]", s, s.code()),
            Self::Other(c) => write!(f, "other [{}]", c),
        }
    }
}

#[derive(Debug)]
enum ErrorRepr {
    Empty,
    Message(String),
    Cause(Box<dyn error::Error + Send + Sync + 'static>),
    MessageCause(String, Box<dyn error::Error + Send + Sync + 'static>),
}

#[derive(Debug)]
pub struct ResolverError {
    kind: ErrorKind,
    status: Option<i32>,
    repr: ErrorRepr,
}

impl ResolverError {
    pub fn new(kind: ErrorKind) -> Self {
        ResolverError {
            kind,
            status: None,
            repr: ErrorRepr::Empty,
        }
    }

    pub fn with_message<S>(kind: ErrorKind, msg: S) -> Self
    where
        S: Into<String>,
    {
        ResolverError {
            kind,
            status: None,
            repr: ErrorRepr::Message(msg.into()),
        }
    }

    pub fn with_cause<S, E>(kind: ErrorKind, msg: S, e: E) -> Self
    where
        S: Into<String>,
        E: error::Error + Send + Sync + 'static,
    {
        ResolverError {
            kind,
            status: None,
            repr: ErrorRepr::MessageCause(msg.into(), Box::new(e)),
        }
    }

    /// Create an error that resulted from a native status code, keeping the code.
    pub fn native<S>(kind: ErrorKind, status: i32, msg: S) -> Self
    where
        S: Into<String>,
    {
        ResolverError {
            kind,
            status: Some(status),
            repr: ErrorRepr::Message(msg.into()),
        }
    }

    pub fn no_data<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::with_message(ErrorKind::NoData, msg)
    }

    pub fn invalid_query<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::with_message(ErrorKind::InvalidQuery, msg)
    }

    pub fn bad_name<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::with_message(ErrorKind::BadName, msg)
    }

    pub fn bad_response<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::with_message(ErrorKind::BadResponse, msg)
    }

    pub fn bad_response_cause<S, E>(msg: S, e: E) -> Self
    where
        S: Into<String>,
        E: error::Error + Send + Sync + 'static,
    {
        Self::with_cause(ErrorKind::BadResponse, msg, e)
    }

    pub fn cancelled<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::with_message(ErrorKind::Cancelled, msg)
    }

    pub fn destruction<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::with_message(ErrorKind::Destruction, msg)
    }

    pub fn timeout<S>(t: Duration, operation: S) -> Self
    where
        S: AsRef<str>,
    {
        Self::with_message(
            ErrorKind::Timeout,
            format!("{} timed out after {:?}", operation.as_ref(), t),
        )
    }

    /// Create an error for a native session that could not be opened.
    pub fn init_error<S>(status: i32, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::native(ErrorKind::InitError, status, msg)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Raw status code reported by the native service, if this error originated there.
    pub fn status(&self) -> Option<i32> {
        self.status
    }

    /// Human readable detail about this error, if any was provided.
    pub fn detail(&self) -> Option<&str> {
        match &self.repr {
            ErrorRepr::Message(msg) | ErrorRepr::MessageCause(msg, _) => Some(msg),
            ErrorRepr::Empty | ErrorRepr::Cause(_) => None,
        }
    }
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            ErrorRepr::Empty => write!(f, "{}", self.kind),
            ErrorRepr::Message(msg) => write!(f, "{}: {}", self.kind, msg),
            ErrorRepr::Cause(e) => write!(f, "{}: {}", self.kind, e),
            ErrorRepr::MessageCause(msg, e) => write!(f, "{}: {}: {}", self.kind, msg, e),
        }
    }
}

impl error::Error for ResolverError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.repr {
            ErrorRepr::Empty | ErrorRepr::Message(_) => None,
            ErrorRepr::Cause(e) => Some(e.as_ref()),
            ErrorRepr::MessageCause(_, e) => Some(e.as_ref()),
        }
    }
}

impl From<io::Error> for ResolverError {
    fn from(e: io::Error) -> Self {
        let kind = if e.kind() == io::ErrorKind::UnexpectedEof {
            ErrorKind::Eof
        } else {
            ErrorKind::FileIO
        };

        ResolverError {
            kind,
            status: None,
            repr: ErrorRepr::Cause(Box::new(e)),
        }
    }
}
