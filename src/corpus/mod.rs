//! Curated set of known-good mail domains, the candidate space for repairs.
//!
//! Entries are canonical: lowercase ASCII, no whitespace, at least one dot.
//! They are kept sorted and unique, so membership is a binary search and a
//! full scan visits candidates in lexicographic order.

mod builder;
mod error;

pub use builder::{BuildSummary, build_corpus, write_atomically};
pub use error::CorpusError;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::normalize::normalize_address;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainCorpus {
    domains: Vec<String>,
}

impl DomainCorpus {
    /// Reads a corpus file, one domain per line. Blank lines are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| CorpusError::open(path, err))?;
        let corpus = Self::from_reader(BufReader::new(file), path)?;
        info!(path = %path.display(), domains = corpus.len(), "corpus loaded");
        Ok(corpus)
    }

    /// `origin` only labels errors.
    pub fn from_reader<R: BufRead>(reader: R, origin: &Path) -> Result<Self, CorpusError> {
        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line.map_err(|err| CorpusError::read(origin, err))?);
        }
        Ok(Self::from_domains(lines))
    }

    /// Canonicalizes each entry; entries that cannot be a mail domain are dropped.
    pub fn from_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut skipped = 0usize;
        let mut entries = Vec::new();
        for raw in domains {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }
            match canonical_entry(raw) {
                Some(entry) => entries.push(entry),
                None => skipped += 1,
            }
        }
        entries.sort_unstable();
        entries.dedup();
        if skipped > 0 {
            debug!(skipped, kept = entries.len(), "non-canonical corpus entries skipped");
        }
        Self { domains: entries }
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains
            .binary_search_by(|probe| probe.as_str().cmp(domain))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }
}

/// Canonical form of a corpus line, or `None` when it is not a usable domain.
pub(crate) fn canonical_entry(raw: &str) -> Option<String> {
    let entry = normalize_address(raw);
    let usable = !entry.is_empty()
        && entry.is_ascii()
        && entry.contains('.')
        && !entry.contains('@')
        && !entry.chars().any(|c| c.is_ascii_whitespace());
    usable.then_some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn load_skips_blank_lines_and_dedups() {
        let input = "gmail.com\n\nHotmail.com\n  yahoo.com  \ngmail.com\n";
        let corpus = DomainCorpus::from_reader(input.as_bytes(), Path::new("mem")).unwrap();
        assert_eq!(
            corpus.iter().collect::<Vec<_>>(),
            ["gmail.com", "hotmail.com", "yahoo.com"]
        );
        assert!(corpus.contains("hotmail.com"));
        assert!(!corpus.contains("hotmail.con"));
    }

    #[test]
    fn rejects_unusable_entries() {
        let corpus = DomainCorpus::from_domains(["localhost", "user@gmail.com", "my host.com", "日本.jp", "ok.io"]);
        assert_eq!(corpus.iter().collect::<Vec<_>>(), ["ok.io"]);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = DomainCorpus::load("/nonexistent/mailfix/domains.txt").unwrap_err();
        assert!(matches!(err, CorpusError::Open { .. }));
    }

    proptest! {
        #[test]
        fn entries_are_normalization_fixed_points(lines in proptest::collection::vec("[ .a-zA-Z0-9Éé-]{0,16}", 0..20)) {
            let corpus = DomainCorpus::from_domains(&lines);
            for entry in corpus.iter() {
                prop_assert_eq!(normalize_address(entry), entry);
            }
        }
    }
}
