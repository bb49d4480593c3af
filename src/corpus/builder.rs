use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{CorpusError, canonical_entry};

/// Counters reported by [`build_corpus`].
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub files: usize,
    pub lines: usize,
    pub skipped: usize,
    pub unique: usize,
}

/// Merges every `*.txt` under `input_dir` (recursively) into one canonical
/// corpus file at `output`: sorted, unique, LF-terminated, no blank lines.
///
/// The output is written to a sibling temp file then renamed into place.
pub fn build_corpus(input_dir: &Path, output: &Path) -> Result<BuildSummary, CorpusError> {
    let mut files = Vec::new();
    collect_txt_files(input_dir, &mut files)?;
    files.sort();
    files.retain(|path| path != output);

    let mut summary = BuildSummary {
        files: files.len(),
        ..BuildSummary::default()
    };
    let mut domains = BTreeSet::new();
    for path in &files {
        debug!(file = %path.display(), "reading domain list");
        let file = File::open(path).map_err(|err| CorpusError::open(path, err))?;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|err| CorpusError::read(path, err))?;
            if line.trim().is_empty() {
                continue;
            }
            summary.lines += 1;
            match canonical_entry(&line) {
                Some(entry) => {
                    domains.insert(entry);
                }
                None => summary.skipped += 1,
            }
        }
    }
    summary.unique = domains.len();

    let mut buf = Vec::new();
    for domain in &domains {
        buf.extend_from_slice(domain.as_bytes());
        buf.push(b'\n');
    }
    write_atomically(output, &buf).map_err(|err| CorpusError::write(output, err))?;

    info!(
        files = summary.files,
        lines = summary.lines,
        unique = summary.unique,
        output = %output.display(),
        "corpus built"
    );
    Ok(summary)
}

fn collect_txt_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CorpusError> {
    let entries = fs::read_dir(dir).map_err(|err| CorpusError::scan(dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| CorpusError::scan(dir, err))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|err| CorpusError::scan(&path, err))?;
        if file_type.is_dir() {
            collect_txt_files(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "txt") {
            out.push(path);
        }
    }
    Ok(())
}

/// Writes `bytes` to a sibling `<path>.tmp`, syncs it, then renames it over
/// `path`. The temp file is removed if any step fails.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let written = File::create(&tmp).and_then(|mut f| {
        f.write_all(bytes)?;
        f.sync_all()
    });
    let result = written.and_then(|()| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::DomainCorpus;
    use tempfile::TempDir;

    #[test]
    fn merges_nested_lists() {
        let dir = TempDir::new().unwrap();
        let lists = dir.path().join("lists");
        fs::create_dir_all(lists.join("free")).unwrap();
        fs::write(lists.join("a.txt"), "gmail.com\nyahoo.com\n\n").unwrap();
        fs::write(lists.join("free/b.txt"), "Gmail.com\nhotmail.com\n").unwrap();
        fs::write(lists.join("notes.md"), "ignored.com\n").unwrap();
        let out = dir.path().join("domains.txt");

        let summary = build_corpus(&lists, &out).unwrap();
        assert_eq!(
            summary,
            BuildSummary {
                files: 2,
                lines: 4,
                skipped: 0,
                unique: 3
            }
        );
        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written, "gmail.com\nhotmail.com\nyahoo.com\n");

        let corpus = DomainCorpus::load(&out).unwrap();
        assert_eq!(corpus.len(), 3);
    }

    #[test]
    fn missing_input_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = build_corpus(&dir.path().join("nope"), &dir.path().join("out.txt")).unwrap_err();
        assert!(matches!(err, CorpusError::Scan { .. }));
    }

    #[test]
    fn unwritable_output_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "gmail.com\n").unwrap();
        let err = build_corpus(dir.path(), &dir.path().join("no/such/dir/out.txt")).unwrap_err();
        assert!(matches!(err, CorpusError::Write { .. }));
    }

    #[test]
    fn atomic_write_replaces_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("report.json");
        fs::write(&target, "old").unwrap();

        write_atomically(&target, b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(!dir.path().join("report.json.tmp").exists());

        let missing = dir.path().join("absent/report.json");
        assert!(write_atomically(&missing, b"x").is_err());
        assert!(!dir.path().join("absent/report.json.tmp").exists());
    }
}
