// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resumable per-repository CSV tables.
//!
//! The set of contributor ids already in the file is loaded once when the table
//! is opened. Each new row is appended and flushed on its own, so a crash loses
//! at most the row in flight and a restart only computes what is missing.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use ltcscope_core::LtcError;
use tracing::debug;

use crate::rows::TableRow;

const USER_ID: &str = "user_id";

/// An append-only table keyed by `user_id`.
#[derive(Debug)]
pub struct IncrementalTable {
    path: PathBuf,
    existing: HashSet<i64>,
    needs_header: bool,
}

impl IncrementalTable {
    /// Open (or prepare to create) the table at `path`.
    pub fn open(path: &Path) -> Result<Self, LtcError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LtcError::io(parent, e))?;
        }
        let existing_len = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(LtcError::io(path, e)),
        };
        if existing_len == 0 {
            return Ok(Self {
                path: path.to_path_buf(),
                existing: HashSet::new(),
                needs_header: true,
            });
        }

        let existing = read_user_ids(path)?;
        debug!(path = %path.display(), rows = existing.len(), "resuming table");
        Ok(Self {
            path: path.to_path_buf(),
            existing,
            needs_header: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when a row for `user_id` was already written.
    pub fn contains(&self, user_id: i64) -> bool {
        self.existing.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }

    /// Append `row` unless its contributor is already present.
    ///
    /// Returns whether a row was written. The header goes out with the first
    /// row of a new file.
    pub fn append<R: TableRow>(&mut self, row: &R) -> Result<bool, LtcError> {
        let user_id = row.user_id();
        if self.contains(user_id) {
            return Ok(false);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LtcError::io(&self.path, e))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if self.needs_header {
            writer
                .write_record(R::COLUMNS)
                .map_err(|e| csv_error(&self.path, e))?;
        }
        writer.serialize(row).map_err(|e| csv_error(&self.path, e))?;
        writer.flush().map_err(|e| LtcError::io(&self.path, e))?;

        self.needs_header = false;
        self.existing.insert(user_id);
        Ok(true)
    }
}

fn read_user_ids(path: &Path) -> Result<HashSet<i64>, LtcError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;
    let headers = reader.headers().map_err(|e| csv_error(path, e))?;
    let column = headers.iter().position(|h| h.trim() == USER_ID).ok_or_else(|| {
        LtcError::parse(path.display().to_string(), "table has no user_id column")
    })?;

    let mut ids = HashSet::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        if let Some(id) = record.get(column).and_then(|v| v.trim().parse::<i64>().ok()) {
            ids.insert(id);
        }
    }
    Ok(ids)
}

fn csv_error(path: &Path, e: csv::Error) -> LtcError {
    LtcError::parse(path.display().to_string(), e)
}
