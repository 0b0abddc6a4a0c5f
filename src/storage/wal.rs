//! Line-oriented append-only WAL.
//!
//! Each line is one logged state transition, written by the caller in
//! whatever comma-separated shape its side of the protocol uses (§6: WAL FILE
//! FORMAT). This module only knows how to append lines, flush them durably,
//! read them back in order, and remove the file once replay is complete — it
//! has no opinion on what a line means.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// An append-only, line-oriented log file.
///
/// Not `Sync`/shareable by itself — callers are expected to guard it with the
/// single mutual-exclusion primitive required by §5 (each side wraps a
/// `LineWal` inside its own `Mutex`-guarded store).
pub struct LineWal {
    path: PathBuf,
    file: Option<File>,
}

impl LineWal {
    /// Opens (creating if absent) the WAL file at `path` for appending.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Appends one record and flushes it to disk before returning.
    ///
    /// Per §4.1, this must complete before any observable action that
    /// depends on the new state is taken (sending an RPC, returning a vote).
    pub fn append(&mut self, line: &str) -> Result<()> {
        let file = self
            .file
            .as_mut()
            .expect("WAL file handle present after open/reopen");
        writeln!(file, "{line}")?;
        file.flush()?;
        file.sync_data()?;
        Ok(())
    }

    /// Reads every record currently in the WAL, in append order.
    ///
    /// Returns an empty vector if the file does not exist (nothing to
    /// replay); a missing file is not an error.
    pub fn read_all(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.is_empty() {
                lines.push(line);
            }
        }
        Ok(lines)
    }

    /// Removes the WAL file after its contents have been fully materialized
    /// into the in-memory table. Re-opens a fresh, empty file for further
    /// appends so the `LineWal` remains usable.
    pub fn truncate(&mut self) -> Result<()> {
        self.file = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        self.file = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        Ok(())
    }
}
