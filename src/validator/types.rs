use thiserror::Error;

/// Address split at its last `@`, produced only by a successful
/// [`validate_format`](super::validate_format).
///
/// `normalized == user + "@" + host`, both parts non-empty lowercase ASCII.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAddress {
    pub normalized: String,
    pub user: String,
    pub host: String,
}

impl ParsedAddress {
    /// Same user part, other host.
    pub fn with_host(&self, host: &str) -> String {
        format!("{}@{}", self.user, host)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("bad user format: {0}")]
    BadUserFormat(UserFormatIssue),
    #[error("bad host format: {0}")]
    BadHostFormat(HostFormatIssue),
}

impl FormatError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadUserFormat(_) => "bad-user-format",
            Self::BadHostFormat(_) => "bad-host-format",
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserFormatIssue {
    #[error("total length {0} outside 6..=254")]
    TotalLength(usize),
    #[error("'@' missing or misplaced")]
    MisplacedAt,
    #[error("user part length {0} > 64")]
    UserTooLong(usize),
    #[error("user part starts/ends with '.' or contains '..'")]
    DotPlacement,
    #[error("user part has invalid chars")]
    Charset,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostFormatIssue {
    #[error("host contains whitespace")]
    Whitespace,
    #[error("host needs a dot followed by a TLD of 2+ chars")]
    MissingTld,
    #[error("host has invalid chars")]
    Charset,
}
