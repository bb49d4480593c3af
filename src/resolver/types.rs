use std::time::Duration;

/// Outcome of [`HostResolver::resolve`](super::HostResolver::resolve).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolvable(RecordKind),
    Unresolvable(UnresolvableCause),
}

impl Resolution {
    pub fn is_resolvable(&self) -> bool {
        matches!(self, Self::Resolvable(_))
    }
}

/// Record that made a host a mail destination.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Mx,
    /// A/AAAA only; implicit MX (RFC 5321 §5.1).
    Address,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvableCause {
    /// `localhost`, `example.com`.
    Sentinel,
    /// IDNA conversion refused the name.
    InvalidName,
    NoRecords,
    /// Timeout, SERVFAIL, ... Treated like a missing record.
    LookupFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Deadline for a single query. Queries are not retried.
    pub timeout: Duration,
    /// Short-circuit `localhost` and `example.com` as unresolvable.
    pub sentinels: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            sentinels: true,
        }
    }
}
