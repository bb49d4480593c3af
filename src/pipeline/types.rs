use std::fmt;

use crate::fixer::NoCandidate;
use crate::validator::FormatError;

/// Final answer for one address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case", tag = "verdict", content = "detail"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(InvalidReason),
    /// Host replaced by the contained corpus entry.
    Repaired(String),
    /// DNS or SMTP I/O failed, or the caller cancelled. Worth a retry.
    TransportError(String),
}

impl Verdict {
    /// `Valid` or `Repaired`.
    pub fn is_deliverable(&self) -> bool {
        matches!(self, Self::Valid | Self::Repaired(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Invalid(reason) => write!(f, "invalid ({reason})"),
            Self::Repaired(host) => write!(f, "repaired -> {host}"),
            Self::TransportError(detail) => write!(f, "transport error: {detail}"),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    BadUserFormat,
    BadHostFormat,
    UnresolvableHost,
    /// The mailbox probe refused the address; carries its detail.
    MailboxRejected(String),
}

impl InvalidReason {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadUserFormat => "bad-user-format",
            Self::BadHostFormat => "bad-host-format",
            Self::UnresolvableHost => "unresolvable-host",
            Self::MailboxRejected(_) => "mailbox-rejected",
        }
    }
}

impl From<&FormatError> for InvalidReason {
    fn from(err: &FormatError) -> Self {
        match err {
            FormatError::BadUserFormat(_) => Self::BadUserFormat,
            FormatError::BadHostFormat(_) => Self::BadHostFormat,
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MailboxRejected(detail) => write!(f, "{}: {detail}", self.kind()),
            other => f.write_str(other.kind()),
        }
    }
}

/// Everything learned about one address along the pipeline.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressReport {
    pub original: String,
    pub normalized: String,
    pub user: Option<String>,
    pub host: Option<String>,
    pub repaired_host: Option<String>,
    pub distance: Option<usize>,
    /// Human-readable cause behind an `Invalid` verdict.
    pub detail: Option<String>,
    /// Set when repair was attempted and produced nothing.
    pub no_candidate: Option<NoCandidate>,
    pub verdict: Verdict,
}

impl AddressReport {
    /// Address as it should be used: repaired when a repair happened.
    pub fn final_address(&self) -> Option<String> {
        let user = self.user.as_deref()?;
        let host = self.repaired_host.as_deref().or(self.host.as_deref())?;
        Some(format!("{user}@{host}"))
    }
}
