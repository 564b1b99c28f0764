//! Word-similarity judgment datasets
//!
//! One judgment per line: `word1 word2 score`. Blank lines are skipped;
//! reading stops at the first line that does not parse, or after
//! `max_lines` judgments.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::vocab::{normalize, Vocabulary};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Cannot read datasets directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A human similarity judgment for a word pair (words lower-cased)
#[derive(Debug, Clone, PartialEq)]
pub struct Judgment {
    pub word1: String,
    pub word2: String,
    pub score: f32,
}

impl Judgment {
    /// Parse one line; `None` if it does not hold two words and a number
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let word1 = tokens.next()?;
        let word2 = tokens.next()?;
        let score = tokens.next()?.parse().ok()?;
        Some(Self {
            word1: normalize(word1),
            word2: normalize(word2),
            score,
        })
    }
}

/// A named judgment set
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub judgments: Vec<Judgment>,
}

impl Dataset {
    /// Read a dataset file; the name is the file name
    pub fn open<P: AsRef<Path>>(path: P, max_lines: usize) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = File::open(path)?;
        let judgments = read_judgments(BufReader::new(file), max_lines)?;
        Ok(Self { name, judgments })
    }

    /// Insert every word of every judgment into `vocab`
    pub fn extend_vocabulary(&self, vocab: &mut Vocabulary) {
        for j in &self.judgments {
            vocab.insert_if_absent(&j.word1);
            vocab.insert_if_absent(&j.word2);
        }
    }
}

/// Read judgments until EOF, a malformed line, or `max_lines` judgments
pub fn read_judgments<R: BufRead>(reader: R, max_lines: usize) -> io::Result<Vec<Judgment>> {
    let mut judgments = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        if judgments.len() >= max_lines {
            tracing::debug!("Line cap of {} reached", max_lines);
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match Judgment::parse(&line) {
            Some(j) => judgments.push(j),
            None => {
                tracing::debug!("Stopping at malformed line {}: {:?}", n + 1, line);
                break;
            }
        }
    }
    Ok(judgments)
}

/// Regular files in `dir`, sorted by file name
pub fn list_datasets<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, DatasetError> {
    let dir = dir.as_ref();
    let wrap = |source: io::Error| DatasetError::Directory {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(wrap)? {
        let entry = entry.map_err(wrap)?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        } else {
            tracing::debug!("Ignoring non-file entry {:?}", path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Open every dataset in `dir`, skipping files that cannot be read
pub fn load_datasets<P: AsRef<Path>>(dir: P, max_lines: usize) -> Result<Vec<Dataset>, DatasetError> {
    let mut datasets = Vec::new();
    for path in list_datasets(dir)? {
        match Dataset::open(&path, max_lines) {
            Ok(dataset) => {
                tracing::debug!("Read {} judgments from {:?}", dataset.judgments.len(), path);
                datasets.push(dataset);
            }
            Err(e) => tracing::warn!("Skipping dataset {:?}: {}", path, e),
        }
    }
    Ok(datasets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_parse_lowercases() {
        let j = Judgment::parse("Tiger  CAT\t7.35").unwrap();
        assert_eq!(j.word1, "tiger");
        assert_eq!(j.word2, "cat");
        assert!((j.score - 7.35).abs() < 1e-6);
    }

    #[test]
    fn test_stops_at_malformed_line() {
        let data = "a b 1.0\n\nc d 2.5\ne f notanumber\ng h 3.0\n";
        let judgments = read_judgments(Cursor::new(data), 100).unwrap();
        assert_eq!(judgments.len(), 2);
        assert_eq!(judgments[1].word1, "c");
    }

    #[test]
    fn test_line_cap() {
        let data = "a b 1\nc d 2\ne f 3\n";
        let judgments = read_judgments(Cursor::new(data), 2).unwrap();
        assert_eq!(judgments.len(), 2);
    }

    #[test]
    fn test_extend_vocabulary() {
        let dataset = Dataset {
            name: "toy".into(),
            judgments: read_judgments(Cursor::new("cat dog 0.9\ncat car 0.1\n"), 10).unwrap(),
        };
        let mut vocab = Vocabulary::new();
        dataset.extend_vocabulary(&mut vocab);

        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.lookup("cat"), Some(0));
        assert_eq!(vocab.lookup("car"), Some(2));
    }

    #[test]
    fn test_list_and_load_sorted() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("ws353.txt"), "a b 1\n").unwrap();
        std::fs::write(dir.path().join("men.txt"), "c d 2\ne f 3\n").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let datasets = load_datasets(dir.path(), 3500).unwrap();
        let names: Vec<_> = datasets.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["men.txt", "ws353.txt"]);
        assert_eq!(datasets[0].judgments.len(), 2);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let result = list_datasets(dir.path().join("absent"));
        assert!(matches!(result, Err(DatasetError::Directory { .. })));
    }
}
