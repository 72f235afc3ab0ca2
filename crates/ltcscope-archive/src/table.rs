// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A loaded export table with integer-key indices.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use ltcscope_core::{LtcError, Window};
use tracing::{debug, info};

use crate::timestamp::parse_timestamp;

/// Name of the timestamp column every export table carries.
pub const CREATED_AT: &str = "created_at";

/// One export row with its parsed timestamp.
#[derive(Debug, Clone)]
pub struct ArchiveRow {
    pub created_at: DateTime<Utc>,
    values: Vec<String>,
}

impl ArchiveRow {
    fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

/// An export table held in memory.
///
/// Rows whose `created_at` does not parse are dropped at load time. Each key
/// column named at load time gets a `key -> row indices` map.
#[derive(Debug, Clone)]
pub struct ArchiveTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<ArchiveRow>,
    indices: HashMap<String, HashMap<i64, Vec<usize>>>,
}

impl ArchiveTable {
    /// Load a CSV file. A missing file is reported as [`LtcError::MissingInput`].
    pub fn load(path: &Path, key_columns: &[&str]) -> Result<Self, LtcError> {
        if !path.exists() {
            return Err(LtcError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(path).map_err(|e| LtcError::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = Self::from_reader(&name, file, key_columns)?;
        info!(
            table = %name,
            rows = table.len(),
            "archive table loaded"
        );
        Ok(table)
    }

    /// Read CSV data with a header row from any reader.
    pub fn from_reader<R: Read>(
        name: &str,
        reader: R,
        key_columns: &[&str],
    ) -> Result<Self, LtcError> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(|e| LtcError::parse(name, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let created_idx = position(&headers, CREATED_AT)
            .ok_or_else(|| LtcError::parse(name, format!("missing `{CREATED_AT}` column")))?;
        let key_positions = key_columns
            .iter()
            .map(|col| {
                position(&headers, col)
                    .map(|idx| (col.to_string(), idx))
                    .ok_or_else(|| LtcError::parse(name, format!("missing `{col}` column")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::new();
        let mut dropped = 0usize;
        for record in csv_reader.records() {
            let record = record.map_err(|e| LtcError::parse(name, e))?;
            let Some(created_at) = record.get(created_idx).and_then(parse_timestamp) else {
                dropped += 1;
                continue;
            };
            rows.push(ArchiveRow {
                created_at,
                values: record.iter().map(str::to_string).collect(),
            });
        }
        if dropped > 0 {
            debug!(table = name, dropped, "skipped rows with unparseable timestamps");
        }

        let mut indices = HashMap::new();
        for (col, idx) in key_positions {
            let mut index: HashMap<i64, Vec<usize>> = HashMap::new();
            for (row_idx, row) in rows.iter().enumerate() {
                if let Some(key) = row.get(idx).and_then(parse_key) {
                    index.entry(key).or_default().push(row_idx);
                }
            }
            indices.insert(col, index);
        }

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
            indices,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Result<usize, LtcError> {
        position(&self.headers, column).ok_or_else(|| {
            LtcError::parse(&self.name, format!("no column named `{column}`"))
        })
    }

    /// Rows whose indexed `column` is one of `keys` and whose timestamp lies in `window`.
    pub fn select<I>(
        &self,
        column: &str,
        keys: I,
        window: &Window,
    ) -> Result<Selection<'_>, LtcError>
    where
        I: IntoIterator<Item = i64>,
    {
        let index = self.indices.get(column).ok_or_else(|| {
            LtcError::Internal(format!(
                "column `{column}` of {} was not indexed at load time",
                self.name
            ))
        })?;
        let wanted: BTreeSet<i64> = keys.into_iter().collect();
        let mut rows: Vec<usize> = wanted
            .iter()
            .filter_map(|key| index.get(key))
            .flatten()
            .copied()
            .filter(|&row| window.contains(self.rows[row].created_at))
            .collect();
        rows.sort_unstable();
        Ok(Selection { table: self, rows })
    }

    /// Shorthand for a single key.
    pub fn select_key(
        &self,
        column: &str,
        key: i64,
        window: &Window,
    ) -> Result<Selection<'_>, LtcError> {
        self.select(column, [key], window)
    }
}

/// A filtered view over an [`ArchiveTable`].
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    table: &'a ArchiveTable,
    rows: Vec<usize>,
}

impl Selection<'_> {
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose `column` equals `value` exactly.
    pub fn count_where(&self, column: &str, value: &str) -> Result<usize, LtcError> {
        let idx = self.table.column_index(column)?;
        Ok(self
            .iter()
            .filter(|row| row.get(idx).is_some_and(|v| v.trim() == value))
            .count())
    }

    /// Rows whose integer `column` equals `value`.
    pub fn count_where_int(&self, column: &str, value: i64) -> Result<usize, LtcError> {
        let idx = self.table.column_index(column)?;
        Ok(self
            .iter()
            .filter(|row| row.get(idx).and_then(parse_key) == Some(value))
            .count())
    }

    /// Number of distinct non-empty values in `column`.
    pub fn distinct(&self, column: &str) -> Result<usize, LtcError> {
        let idx = self.table.column_index(column)?;
        let values: BTreeSet<&str> = self
            .iter()
            .filter_map(|row| row.get(idx))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        Ok(values.len())
    }

    /// The raw `column` value of every selected row (empty when absent).
    pub fn values(&self, column: &str) -> Result<Vec<&str>, LtcError> {
        let idx = self.table.column_index(column)?;
        Ok(self
            .iter()
            .map(|row| row.get(idx).map(str::trim).unwrap_or(""))
            .collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArchiveRow> + '_ {
        self.rows.iter().map(|&i| &self.table.rows[i])
    }
}

fn position(headers: &[String], column: &str) -> Option<usize> {
    headers.iter().position(|h| h == column)
}

/// Integer keys; exports sometimes write them as `42.0`.
fn parse_key(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        let f = raw.parse::<f64>().ok()?;
        (f.fract() == 0.0 && f.is_finite()).then_some(f as i64)
    })
}
