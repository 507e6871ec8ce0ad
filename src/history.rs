// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Draw history.
//!
//! Every accepted draw is appended to a JSON Lines file, one run per line:
//!
//! ```text
//! {"drawn_at":"2025-12-01T19:04:11Z","pairs":[{"giver":"Alice","receiver":"Carol"}, ...]}
//! ```
//!
//! Reading the file back yields the union of all recorded pairs, which the
//! engine then refuses to draw again. The log has a single writer; two
//! sessions appending to the same file at once are not supported.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{Assignment, ForbiddenPairs, Pair};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("history file {path}, line {line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode history record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One accepted draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    pub drawn_at: DateTime<Utc>,
    pub pairs: Vec<Pair>,
}

/// Append-only log of accepted draws.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Point at `path`. Nothing is read or created yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> HistoryError {
        HistoryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// All recorded runs, oldest first. A missing file has no runs.
    pub fn records(&self) -> Result<Vec<DrawRecord>, HistoryError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let mut records = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| HistoryError::Malformed {
                path: self.path.clone(),
                line: i + 1,
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Union of every pair ever drawn.
    pub fn load_forbidden(&self) -> Result<ForbiddenPairs, HistoryError> {
        let records = self.records()?;
        let forbidden: ForbiddenPairs = records
            .iter()
            .flat_map(|record| &record.pairs)
            .map(|pair| (pair.giver.as_str(), pair.receiver.as_str()))
            .collect();
        debug!(
            runs = records.len(),
            pairs = forbidden.len(),
            path = %self.path.display(),
            "loaded history"
        );
        Ok(forbidden)
    }

    /// Append an accepted draw as a new line, creating the file if needed.
    pub fn append(&self, assignment: &Assignment) -> Result<DrawRecord, HistoryError> {
        let record = DrawRecord {
            drawn_at: Utc::now(),
            pairs: assignment.pairs().to_vec(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| self.io_error(e))?;

        info!(pairs = record.pairs.len(), path = %self.path.display(), "draw recorded");
        Ok(record)
    }

    /// Forget every recorded draw.
    pub fn clear(&self) -> Result<(), HistoryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "history cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_way() -> Assignment {
        Assignment::from_pairs(vec![
            Pair { giver: "Alice".into(), receiver: "Bob".into() },
            Pair { giver: "Bob".into(), receiver: "Alice".into() },
        ])
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("none.jsonl"));
        assert!(store.records().unwrap().is_empty());
        assert!(store.load_forbidden().unwrap().is_empty());
        store.clear().unwrap();
    }

    #[test]
    fn test_append_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("nested").join("log.jsonl"));
        let record = store.append(&two_way()).unwrap();
        assert_eq!(store.records().unwrap(), vec![record]);
    }

    #[test]
    fn test_blank_lines_skipped_malformed_line_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        fs::write(
            &path,
            "{\"drawn_at\":\"2024-12-01T10:00:00Z\",\"pairs\":[{\"giver\":\"A\",\"receiver\":\"B\"}]}\n\n",
        )
        .unwrap();
        let store = HistoryStore::open(&path);
        assert!(store.load_forbidden().unwrap().contains("A", "B"));

        fs::write(&path, "\nnot json\n").unwrap();
        let err = store.records().unwrap_err();
        assert!(matches!(err, HistoryError::Malformed { line: 2, .. }));
    }
}
