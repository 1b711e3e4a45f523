//! Append-only NDJSON event log.
//!
//! One record per line. Each append serializes the whole line first, writes
//! it with a single `write_all` and flushes before returning, so a reader
//! always sees a prefix of complete records (at worst followed by one torn
//! line if the process is killed mid-write).

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::record::GameEvent;

/// Event log write errors.
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("event log io error: {0}")]
    Io(#[from] io::Error),
    #[error("event serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append-only record writer.
#[derive(Debug)]
pub struct EventLog<W: Write> {
    writer: W,
    path: Option<PathBuf>,
    records: u64,
}

impl<W: Write> EventLog<W> {
    /// Wrap an arbitrary writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            path: None,
            records: 0,
        }
    }

    /// Append one record and flush it.
    pub fn append(&mut self, event: &GameEvent) -> Result<(), EventLogError> {
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        self.records += 1;
        debug!(kind = event.kind(), records = self.records, "event appended");
        Ok(())
    }

    /// Records appended through this handle.
    #[must_use]
    pub fn records(&self) -> u64 {
        self.records
    }

    /// The backing file, when created with `create`.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Borrow the underlying writer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl EventLog<BufWriter<File>> {
    /// Create `{dir}/{game_id}.json`.
    ///
    /// Fails if the file already exists: a log is never truncated or
    /// appended to by a second game.
    pub fn create(dir: &Path, game_id: &str) -> Result<Self, EventLogError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{game_id}.json"));
        let file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        info!(path = %path.display(), "event log created");
        Ok(Self {
            writer: BufWriter::new(file),
            path: Some(path),
            records: 0,
        })
    }
}
