use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// Why a mailbox could not be checked. Every variant ends up as a
/// transport error on the verdict: none of them says anything about the
/// mailbox itself.
#[derive(Debug, Error)]
pub enum SmtpVerifyError {
    #[error("cannot start the MX resolver: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("cannot build the TLS connector: {source}")]
    TlsInit {
        #[source]
        source: native_tls::Error,
    },
    #[error("MX lookup for {domain} failed: {source}")]
    MxLookup {
        domain: String,
        #[source]
        source: ResolveError,
    },
    #[error("{domain} has no reachable mail host")]
    NoMailHost { domain: String },
    #[error("cannot reach {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("SMTP session with {host} broke: {source}")]
    Session {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("STARTTLS with {host} failed: {source}")]
    Handshake {
        host: String,
        #[source]
        source: native_tls::Error,
    },
    #[error("malformed SMTP reply: {0}")]
    MalformedReply(String),
}

impl SmtpVerifyError {
    pub(crate) fn session(host: &str, source: std::io::Error) -> Self {
        Self::Session {
            host: host.to_string(),
            source,
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedReply(detail.into())
    }
}
