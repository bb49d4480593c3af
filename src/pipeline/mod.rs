//! Per-address orchestration: normalize, validate, resolve, repair, probe.
//!
//! Each call is independent and synchronous. A [`MailFixer`] only holds
//! read-only state (corpus, resolver, probe, policy) and can be shared across
//! threads when its resolver and probe are `Sync`.

mod probe;
mod types;

pub use probe::{MailboxProbe, NoProbe, ProbeOutcome};
pub use types::{AddressReport, InvalidReason, Verdict};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cancel::{CancelToken, Cancelled};
use crate::corpus::DomainCorpus;
use crate::fixer::{Candidate, FixOutcome, FixPolicy, HostFixer, NoCandidate};
use crate::normalize::normalize_address;
use crate::resolver::{HostLookup, HostResolver, ResolverError, is_sentinel};
use crate::validator::{FormatError, ParsedAddress, validate_format};

#[cfg(feature = "with-dns")]
use crate::resolver::{DnsLookup, ResolverOptions};

/// Where the host stage left the address.
enum Route {
    Deliverable,
    Repaired(Candidate),
    Dead(NoCandidate),
}

pub struct MailFixer<L, P = NoProbe> {
    corpus: Arc<DomainCorpus>,
    resolver: HostResolver<L>,
    probe: P,
    policy: FixPolicy,
}

#[cfg(feature = "with-dns")]
impl MailFixer<DnsLookup> {
    /// Fixer over the system DNS resolver, without mailbox probing.
    pub fn system(
        corpus: Arc<DomainCorpus>,
        options: ResolverOptions,
    ) -> Result<Self, ResolverError> {
        Ok(Self::new(corpus, HostResolver::system(options)?))
    }
}

impl<L: HostLookup> MailFixer<L> {
    pub fn new(corpus: Arc<DomainCorpus>, resolver: HostResolver<L>) -> Self {
        Self {
            corpus,
            resolver,
            probe: NoProbe,
            policy: FixPolicy::default(),
        }
    }
}

impl<L: HostLookup, P: MailboxProbe> MailFixer<L, P> {
    pub fn with_policy(mut self, policy: FixPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_probe<Q: MailboxProbe>(self, probe: Q) -> MailFixer<L, Q> {
        MailFixer {
            corpus: self.corpus,
            resolver: self.resolver,
            probe,
            policy: self.policy,
        }
    }

    pub fn corpus(&self) -> &DomainCorpus {
        &self.corpus
    }

    pub fn policy(&self) -> &FixPolicy {
        &self.policy
    }

    /// Verdict for `to`; `from` is handed to the mailbox probe unchanged.
    pub fn fix(&self, from: &str, to: &str) -> Verdict {
        self.check(from, to).verdict
    }

    pub fn check(&self, from: &str, to: &str) -> AddressReport {
        self.check_with_cancel(from, to, &CancelToken::new())
    }

    /// Like [`check`](Self::check); cancelling `cancel` aborts the DNS lookup
    /// in flight (or stops the fixer scan at the next candidate) and turns the
    /// verdict into [`Verdict::TransportError`].
    pub fn check_with_cancel(&self, from: &str, to: &str, cancel: &CancelToken) -> AddressReport {
        let normalized = normalize_address(to);
        let mut report = AddressReport {
            original: to.to_string(),
            normalized,
            user: None,
            host: None,
            repaired_host: None,
            distance: None,
            detail: None,
            no_candidate: None,
            verdict: Verdict::Valid,
        };

        let parsed = match validate_format(&report.normalized) {
            Ok(parsed) => parsed,
            Err(FormatError::BadHostFormat(_))
                if self.resolver.options().sentinels && sentinel_host(&report.normalized) =>
            {
                debug!(address = %report.normalized, "sentinel host");
                report.verdict = Verdict::Invalid(InvalidReason::UnresolvableHost);
                report.detail = Some("sentinel host".to_string());
                return report;
            }
            Err(err) => {
                debug!(address = %report.normalized, error = %err, "format rejected");
                report.verdict = Verdict::Invalid(InvalidReason::from(&err));
                report.detail = Some(err.to_string());
                return report;
            }
        };
        report.user = Some(parsed.user.clone());
        report.host = Some(parsed.host.clone());

        let route = match self.route(&parsed, cancel) {
            Ok(route) => route,
            Err(err) => {
                warn!(address = %parsed.normalized, error = %err, "host stage aborted");
                report.verdict = Verdict::TransportError(err.to_string());
                return report;
            }
        };

        report.verdict = match route {
            Route::Deliverable => {
                self.probe_verdict(from, &parsed.normalized, Verdict::Valid, cancel)
            }
            Route::Repaired(candidate) => {
                let repaired = parsed.with_host(&candidate.host);
                let verdict = Verdict::Repaired(candidate.host.clone());
                report.repaired_host = Some(candidate.host);
                report.distance = Some(candidate.distance);
                self.probe_verdict(from, &repaired, verdict, cancel)
            }
            Route::Dead(reason) => {
                report.detail = Some(format!("no repair: {}", reason.kind()));
                report.no_candidate = Some(reason);
                Verdict::Invalid(InvalidReason::UnresolvableHost)
            }
        };
        if let Verdict::Invalid(InvalidReason::MailboxRejected(detail)) = &report.verdict {
            report.detail = Some(detail.clone());
        }
        report
    }

    fn route(&self, parsed: &ParsedAddress, cancel: &CancelToken) -> Result<Route, ResolverError> {
        let resolution = self.resolver.resolve(&parsed.host, cancel)?;
        if resolution.is_resolvable() {
            debug!(host = %parsed.host, ?resolution, "host resolves");
            return Ok(Route::Deliverable);
        }
        debug!(host = %parsed.host, ?resolution, "host unresolvable, trying repair");

        let fixer = HostFixer::new(&self.corpus, self.policy);
        Ok(match fixer.fix(&parsed.host, &self.resolver, cancel)? {
            FixOutcome::Repaired(candidate) => Route::Repaired(candidate),
            FixOutcome::NoCandidate(reason) => Route::Dead(reason),
        })
    }

    /// The probe overrides `verdict` only when it has an opinion.
    fn probe_verdict(
        &self,
        from: &str,
        to: &str,
        verdict: Verdict,
        cancel: &CancelToken,
    ) -> Verdict {
        if cancel.is_cancelled() {
            return Verdict::TransportError(Cancelled.to_string());
        }
        match self.probe.probe(from, to) {
            ProbeOutcome::Valid | ProbeOutcome::Skipped => verdict,
            ProbeOutcome::Invalid(detail) => {
                Verdict::Invalid(InvalidReason::MailboxRejected(detail))
            }
            ProbeOutcome::TransportError(detail) => {
                warn!(address = to, %detail, "mailbox probe transport error");
                Verdict::TransportError(detail)
            }
        }
    }
}

// "user@localhost" est refusé par le format mais reste un host sentinelle
fn sentinel_host(normalized: &str) -> bool {
    normalized
        .rsplit_once('@')
        .is_some_and(|(_, host)| is_sentinel(host))
}
