#![forbid(unsafe_code)]
//! mailfix: normalisation, validation et réparation d'adresses e-mail
//!
//! Pipeline: [`normalize_address`] → [`validate_format`] → DNS
//! ([`HostResolver`]) → repair against a [`DomainCorpus`] ([`HostFixer`]),
//! orchestrated by [`MailFixer`].

pub mod cancel;
pub mod corpus;
pub mod fixer;
pub mod normalize;
pub mod pipeline;
pub mod resolver;
pub mod validator;

#[cfg(feature = "with-smtp-verify")]
pub mod smtp_verify;

pub use cancel::{CancelToken, Cancelled};
pub use corpus::{BuildSummary, CorpusError, DomainCorpus, build_corpus, write_atomically};
pub use fixer::{Candidate, FixOutcome, FixPolicy, HostFixer, NoCandidate, levenshtein};
pub use normalize::normalize_address;
pub use pipeline::{
    AddressReport, InvalidReason, MailFixer, MailboxProbe, NoProbe, ProbeOutcome, Verdict,
};
pub use resolver::{
    HostLookup, HostResolver, LookupError, RecordKind, Resolution, ResolverError,
    ResolverOptions, UnresolvableCause,
};
pub use validator::{FormatError, HostFormatIssue, ParsedAddress, UserFormatIssue, validate_format};

#[cfg(feature = "with-dns")]
pub use resolver::DnsLookup;

#[cfg(feature = "with-smtp-verify")]
pub use smtp_verify::{SmtpProbe, SmtpProbeOptions, SmtpVerifyError};
