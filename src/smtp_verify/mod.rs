//! SMTP mailbox probe (`with-smtp-verify` feature).
//!
//! [`SmtpProbe`] implements [`MailboxProbe`](crate::MailboxProbe): it dials
//! the MX hosts of the recipient domain (A/AAAA fallback), upgrades with
//! STARTTLS when offered, and asks `RCPT TO` whether the mailbox is accepted.
//! Nothing is ever sent past the envelope.

mod dns;
mod error;
mod probe;
mod session;

pub use error::SmtpVerifyError;
pub use probe::{SmtpProbe, SmtpProbeOptions};
