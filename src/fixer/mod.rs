//! Repair of unresolvable hosts by nearest corpus entry.
//!
//! The scan visits the corpus in its sorted order and only replaces the
//! running best on a strictly smaller distance, so ties go to the
//! lexicographically smallest candidate.

mod distance;
mod types;

pub use distance::levenshtein;
pub use types::{Candidate, FixOutcome, FixPolicy, NoCandidate};

use tracing::{debug, info};

use crate::cancel::{CancelToken, Cancelled};
use crate::corpus::DomainCorpus;
use crate::resolver::{HostLookup, HostResolver, ResolverError};
use distance::levenshtein_chars;

#[derive(Debug, Clone, Copy)]
pub struct HostFixer<'a> {
    corpus: &'a DomainCorpus,
    policy: FixPolicy,
}

impl<'a> HostFixer<'a> {
    pub fn new(corpus: &'a DomainCorpus, policy: FixPolicy) -> Self {
        Self { corpus, policy }
    }

    pub fn policy(&self) -> &FixPolicy {
        &self.policy
    }

    /// Picks the nearest corpus entry for `host` and confirms it with DNS.
    pub fn fix<L: HostLookup>(
        &self,
        host: &str,
        resolver: &HostResolver<L>,
        cancel: &CancelToken,
    ) -> Result<FixOutcome, ResolverError> {
        let candidate = match self.nearest_within_threshold(host, cancel)? {
            Ok(candidate) => candidate,
            Err(reason) => {
                debug!(host, reason = reason.kind(), "no repair candidate");
                return Ok(FixOutcome::NoCandidate(reason));
            }
        };

        if !resolver.resolve(&candidate.host, cancel)?.is_resolvable() {
            debug!(host, candidate = %candidate.host, "candidate does not resolve");
            return Ok(FixOutcome::NoCandidate(NoCandidate::CandidateUnresolvable {
                candidate,
            }));
        }
        info!(host, repaired = %candidate.host, distance = candidate.distance, "host repaired");
        Ok(FixOutcome::Repaired(candidate))
    }

    /// Corpus-only half of [`fix`](Self::fix): no DNS involved.
    pub fn nearest_within_threshold(
        &self,
        host: &str,
        cancel: &CancelToken,
    ) -> Result<Result<Candidate, NoCandidate>, Cancelled> {
        if host.is_empty() {
            return Ok(Err(NoCandidate::EmptyHost));
        }
        if self.corpus.is_empty() {
            return Ok(Err(NoCandidate::EmptyCorpus));
        }
        let host_chars: Vec<char> = host.chars().collect();
        if host_chars.len() < self.policy.min_host_len {
            return Ok(Err(NoCandidate::HostTooShort));
        }
        if self.corpus.contains(host) {
            return Ok(Err(NoCandidate::AlreadyKnown));
        }

        let nearest = self.scan(&host_chars, cancel)?;
        Ok(match nearest {
            Some(candidate) if candidate.distance <= self.policy.threshold => Ok(candidate),
            nearest => Err(NoCandidate::OverThreshold { nearest }),
        })
    }

    fn scan(&self, host: &[char], cancel: &CancelToken) -> Result<Option<Candidate>, Cancelled> {
        let threshold = self.policy.threshold;
        let mut best: Option<(&str, usize)> = None;
        let mut candidate_chars = Vec::new();

        for entry in self.corpus.iter() {
            cancel.check()?;
            // entrées ASCII: octets == caractères
            let length_gap = host.len().abs_diff(entry.len());
            if self.policy.length_prune && length_gap > threshold {
                continue;
            }
            if best.is_some_and(|(_, d)| length_gap >= d) {
                continue;
            }

            candidate_chars.clear();
            candidate_chars.extend(entry.chars());
            let d = levenshtein_chars(host, &candidate_chars);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((entry, d));
                if d <= 1 {
                    // rien de strictement plus proche (0 exclu en amont)
                    break;
                }
            }
        }

        Ok(best.map(|(host, distance)| Candidate {
            host: host.to_string(),
            distance,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::{Answer, StubLookup, stub_resolver};

    fn corpus() -> DomainCorpus {
        DomainCorpus::from_domains(["gmail.com", "hotmail.com", "yahoo.com", "ymail.com"])
    }

    fn nearest(
        corpus: &DomainCorpus,
        policy: FixPolicy,
        host: &str,
    ) -> Result<Candidate, NoCandidate> {
        HostFixer::new(corpus, policy)
            .nearest_within_threshold(host, &CancelToken::new())
            .expect("not cancelled")
    }

    #[test]
    fn picks_single_edit_typos() {
        let corpus = corpus();
        let policy = FixPolicy::default();
        for (typo, fixed) in [
            ("gmai.com", "gmail.com"),
            ("gmail.cm", "gmail.com"),
            ("hotmail.con", "hotmail.com"),
            ("yaho.com", "yahoo.com"),
        ] {
            let c = nearest(&corpus, policy, typo).expect(typo);
            assert_eq!(c.host, fixed);
            assert_eq!(c.distance, 1);
        }
    }

    #[test]
    fn ties_go_to_lexicographic_first() {
        // "gmail.com" et "ymail.com" sont tous deux à 1 de "xmail.com"
        let c = nearest(&corpus(), FixPolicy::default(), "xmail.com").unwrap();
        assert_eq!(
            c,
            Candidate {
                host: "gmail.com".into(),
                distance: 1
            }
        );
    }

    #[test]
    fn ties_at_distance_two_also_lexicographic() {
        let corpus = DomainCorpus::from_domains(["xxcd.io", "abxx.io"]);
        let c = nearest(&corpus, FixPolicy::default(), "abcd.io").unwrap();
        assert_eq!(
            c,
            Candidate {
                host: "abxx.io".into(),
                distance: 2
            }
        );
    }

    #[test]
    fn over_threshold_reports_nearest() {
        let policy = FixPolicy {
            length_prune: false,
            ..FixPolicy::default()
        };
        let err = nearest(&corpus(), policy, "asdfghjk.qqqq").unwrap_err();
        match err {
            NoCandidate::OverThreshold { nearest: Some(c) } => assert!(c.distance > 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn length_prune_can_leave_no_nearest() {
        let err = nearest(&corpus(), FixPolicy::default(), "asdfghjkl.qqqqq").unwrap_err();
        assert_eq!(err, NoCandidate::OverThreshold { nearest: None });
    }

    #[test]
    fn guards() {
        let corpus = corpus();
        let policy = FixPolicy::default();
        assert_eq!(nearest(&corpus, policy, ""), Err(NoCandidate::EmptyHost));
        assert_eq!(nearest(&corpus, policy, "g.co"), Err(NoCandidate::HostTooShort));
        assert_eq!(nearest(&corpus, policy, "gmail.com"), Err(NoCandidate::AlreadyKnown));
        assert_eq!(
            nearest(&DomainCorpus::default(), policy, "gmai.com"),
            Err(NoCandidate::EmptyCorpus)
        );
    }

    #[test]
    fn prune_does_not_change_accepted_result() {
        let corpus = corpus();
        for host in ["gmai.com", "hotmial.com", "yahooo.com", "gmall.co"] {
            let pruned = nearest(&corpus, FixPolicy::default(), host);
            let full = nearest(
                &corpus,
                FixPolicy {
                    length_prune: false,
                    ..FixPolicy::default()
                },
                host,
            );
            assert_eq!(pruned.ok(), full.ok(), "{host}");
        }
    }

    #[test]
    fn confirms_candidate_with_dns() {
        let corpus = corpus();
        let fixer = HostFixer::new(&corpus, FixPolicy::default());

        let resolver = stub_resolver(StubLookup::new().with("gmail.com", Answer::MX));
        let outcome = fixer.fix("gmai.com", &resolver, &CancelToken::new()).unwrap();
        assert_eq!(
            outcome,
            FixOutcome::Repaired(Candidate {
                host: "gmail.com".into(),
                distance: 1
            })
        );

        let dark = stub_resolver(StubLookup::new());
        let outcome = fixer.fix("gmai.com", &dark, &CancelToken::new()).unwrap();
        assert!(matches!(
            outcome,
            FixOutcome::NoCandidate(NoCandidate::CandidateUnresolvable { .. })
        ));
    }

    #[test]
    fn scan_honours_cancellation() {
        let corpus = corpus();
        let token = CancelToken::new();
        token.cancel();
        let result = HostFixer::new(&corpus, FixPolicy::default())
            .nearest_within_threshold("gmai.com", &token);
        assert_eq!(result, Err(Cancelled));
    }
}
