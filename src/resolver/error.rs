use thiserror::Error;

use crate::cancel::Cancelled;

/// Failure of a single DNS query, as reported by a [`HostLookup`](super::HostLookup).
///
/// "No such record" is not an error: lookups return `Ok(false)` for it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("lookup for {host} timed out")]
    Timeout { host: String },
    #[error("lookup for {host} failed: {message}")]
    Failed { host: String, message: String },
}

impl LookupError {
    pub fn timeout(host: impl Into<String>) -> Self {
        Self::Timeout { host: host.into() }
    }

    pub fn failed(host: impl Into<String>, message: impl ToString) -> Self {
        Self::Failed {
            host: host.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("resolver initialization failed: {source}")]
    Init {
        #[source]
        source: std::io::Error,
    },
}

impl ResolverError {
    #[cfg_attr(not(feature = "with-dns"), allow(dead_code))]
    pub(crate) fn init(source: std::io::Error) -> Self {
        Self::Init { source }
    }
}
