/// Knobs of the host repair policy.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixPolicy {
    /// Largest accepted edit distance.
    pub threshold: usize,
    /// Hosts with fewer characters are never repaired.
    pub min_host_len: usize,
    /// Skip candidates whose length differs from the host by more than `threshold`.
    pub length_prune: bool,
}

impl Default for FixPolicy {
    fn default() -> Self {
        Self {
            threshold: 2,
            min_host_len: 5,
            length_prune: true,
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub host: String,
    pub distance: usize,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    /// Within threshold and confirmed by DNS.
    Repaired(Candidate),
    NoCandidate(NoCandidate),
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoCandidate {
    EmptyHost,
    HostTooShort,
    EmptyCorpus,
    /// The host is itself a corpus entry; nothing to repair.
    AlreadyKnown,
    /// `nearest` is `None` when every candidate was pruned.
    OverThreshold { nearest: Option<Candidate> },
    CandidateUnresolvable { candidate: Candidate },
}

impl NoCandidate {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OverThreshold { .. } => "no-candidate-within-threshold",
            Self::CandidateUnresolvable { .. } => "candidate-unresolvable",
            Self::AlreadyKnown => "already-known",
            Self::EmptyHost | Self::HostTooShort | Self::EmptyCorpus => "not-attempted",
        }
    }
}
