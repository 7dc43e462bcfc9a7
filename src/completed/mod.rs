//! Durable record of meetings that have already been archived.
//!
//! The log is plain text with one meeting UUID per line. It is only ever
//! appended to, and each append is flushed to disk before `mark_complete`
//! returns, so a crash can lose at most the meeting that was in flight.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct CompletedSetStore {
    path: PathBuf,
    completed: HashSet<String>,
    first_run: bool,
}

impl CompletedSetStore {
    /// Read the log at `path`. A missing file is a first run, not an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut completed = HashSet::new();

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Completed log not found, a new one will be created at {}",
                    path.display()
                );
                return Ok(Self {
                    path,
                    completed,
                    first_run: true,
                });
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to open completed log {}", path.display()))
            }
        };

        for line in BufReader::new(file).lines() {
            let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
            let uuid = line.trim();
            if !uuid.is_empty() {
                completed.insert(uuid.to_string());
            }
        }

        info!(
            "Loaded {} completed meetings from {}",
            completed.len(),
            path.display()
        );

        Ok(Self {
            path,
            completed,
            first_run: false,
        })
    }

    pub fn contains(&self, uuid: &str) -> bool {
        self.completed.contains(uuid)
    }

    /// Record `uuid` in memory and on disk. Returns once the line is synced.
    pub fn mark_complete(&mut self, uuid: &str) -> Result<()> {
        if self.completed.contains(uuid) {
            debug!("Meeting {} already recorded as complete", uuid);
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory {}", parent.display())
                })?;
            }
        }

        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open completed log {}", self.path.display()))?;
        log.write_all(uuid.as_bytes())?;
        log.write_all(b"\n")?;
        log.flush()?;
        log.sync_data()
            .with_context(|| format!("Failed to sync completed log {}", self.path.display()))?;

        self.completed.insert(uuid.to_string());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_log_is_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = CompletedSetStore::load(dir.path().join("completed.log")).unwrap();

        assert!(store.is_first_run());
        assert!(store.is_empty());
        assert!(!store.contains("abc"));
    }

    #[test]
    fn test_marked_meetings_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("completed.log");

        let mut store = CompletedSetStore::load(&path).unwrap();
        store.mark_complete("uuid/with+chars==").unwrap();
        store.mark_complete("second").unwrap();
        drop(store);

        let reloaded = CompletedSetStore::load(&path).unwrap();
        assert!(!reloaded.is_first_run());
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("uuid/with+chars=="));
        assert!(reloaded.contains("second"));
    }

    #[test]
    fn test_log_is_one_uuid_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("completed.log");
        std::fs::write(&path, "existing\n").unwrap();

        let mut store = CompletedSetStore::load(&path).unwrap();
        store.mark_complete("new").unwrap();
        store.mark_complete("new").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "existing\nnew\n");
    }

    #[test]
    fn test_blank_lines_and_whitespace_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("completed.log");
        std::fs::write(&path, "  one  \n\n two\r\n").unwrap();

        let store = CompletedSetStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.contains("one"));
        assert!(store.contains("two"));
    }
}
