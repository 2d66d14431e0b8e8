mod core;
pub mod dns;

pub use crate::core::{ErrorKind, ResolverError};
