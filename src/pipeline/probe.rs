/// Answer of a mailbox-level check run after DNS validation.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Valid,
    Invalid(String),
    TransportError(String),
    /// No opinion; the DNS verdict stands.
    Skipped,
}

/// Mailbox verification hook (`from` is the MAIL FROM identity).
pub trait MailboxProbe {
    fn probe(&self, from: &str, to: &str) -> ProbeOutcome;
}

/// Probe that never runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl MailboxProbe for NoProbe {
    fn probe(&self, _from: &str, _to: &str) -> ProbeOutcome {
        ProbeOutcome::Skipped
    }
}

impl<F> MailboxProbe for F
where
    F: Fn(&str, &str) -> ProbeOutcome,
{
    fn probe(&self, from: &str, to: &str) -> ProbeOutcome {
        self(from, to)
    }
}
