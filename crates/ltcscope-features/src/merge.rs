// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concatenate per-repository tables into one corpus-wide table per family.

use std::fs::File;
use std::path::{Path, PathBuf};

use ltcscope_core::LtcError;
use tracing::{info, warn};

use crate::layout::{Layout, TableFamily};

/// What one merge produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeReport {
    pub output: PathBuf,
    pub files_merged: usize,
    pub rows: usize,
    /// Inputs left out because their header differs from the first file's.
    pub mismatched: Vec<PathBuf>,
}

/// Merge every `*.csv` under the family directory into `<Family>.csv`.
///
/// Inputs are read in file-name order; the header of the first one is written
/// once. An empty or absent directory yields an empty report and no file.
pub fn merge_family(layout: &Layout, family: TableFamily) -> Result<MergeReport, LtcError> {
    let dir = layout.family_dir(family);
    let output = dir.join(family.merged_file_name());
    let inputs = table_files(&dir, &output)?;
    let mut report = MergeReport {
        output: output.clone(),
        ..MergeReport::default()
    };
    if inputs.is_empty() {
        info!(%family, "no tables to merge");
        return Ok(report);
    }

    let file = File::create(&output).map_err(|e| LtcError::io(&output, e))?;
    let mut writer = csv::Writer::from_writer(file);
    let mut header: Option<csv::StringRecord> = None;

    for input in inputs {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&input)
            .map_err(|e| csv_error(&input, e))?;
        let this_header = reader.headers().map_err(|e| csv_error(&input, e))?.clone();
        if this_header.is_empty() {
            continue;
        }
        match &header {
            None => {
                writer
                    .write_record(&this_header)
                    .map_err(|e| csv_error(&output, e))?;
                header = Some(this_header);
            }
            Some(expected) if *expected != this_header => {
                warn!(
                    %family,
                    file = %input.display(),
                    "header differs from the first table, skipping"
                );
                report.mismatched.push(input);
                continue;
            }
            Some(_) => {}
        }
        for record in reader.records() {
            let record = record.map_err(|e| csv_error(&input, e))?;
            writer.write_record(&record).map_err(|e| csv_error(&output, e))?;
            report.rows += 1;
        }
        report.files_merged += 1;
    }
    writer.flush().map_err(|e| LtcError::io(&output, e))?;

    info!(
        %family,
        files = report.files_merged,
        rows = report.rows,
        skipped = report.mismatched.len(),
        output = %output.display(),
        "tables merged"
    );
    Ok(report)
}

/// Sorted `*.csv` files in `dir`, excluding `exclude`.
fn table_files(dir: &Path, exclude: &Path) -> Result<Vec<PathBuf>, LtcError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(LtcError::io(dir, e)),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| LtcError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") && path != exclude {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn csv_error(path: &Path, e: csv::Error) -> LtcError {
    LtcError::parse(path.display().to_string(), e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn write(path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    #[test]
    fn concatenates_in_name_order_with_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::under(dir.path());
        let family = TableFamily::DeveloperProfiles;
        write(&layout.table_path(family, "b"), "user_id,x\n2,b\n");
        write(&layout.table_path(family, "a"), "user_id,x\n1,a\n3,a\n");

        let report = merge_family(&layout, family).unwrap();
        assert_eq!(report.files_merged, 2);
        assert_eq!(report.rows, 3);
        let merged = std::fs::read_to_string(&report.output).unwrap();
        assert_eq!(merged, "user_id,x\n1,a\n3,a\n2,b\n");
    }

    #[test]
    fn rerun_excludes_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::under(dir.path());
        let family = TableFamily::RepositoryProfiles;
        write(&layout.table_path(family, "a"), "user_id,x\n1,a\n");

        let first = merge_family(&layout, family).unwrap();
        let second = merge_family(&layout, family).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            std::fs::read_to_string(&second.output).unwrap(),
            "user_id,x\n1,a\n"
        );
    }

    #[test]
    #[traced_test]
    fn mismatched_headers_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::under(dir.path());
        let family = TableFamily::DeveloperMonthlyActivity;
        write(&layout.table_path(family, "a"), "user_id,x\n1,a\n");
        write(&layout.table_path(family, "b"), "user_id,y\n2,b\n");

        let report = merge_family(&layout, family).unwrap();
        assert_eq!(report.files_merged, 1);
        assert_eq!(report.mismatched, vec![layout.table_path(family, "b")]);
        assert!(logs_contain("header differs from the first table"));
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::under(dir.path());
        let report = merge_family(&layout, TableFamily::RepositoryMonthlyActivity).unwrap();
        assert_eq!(report.files_merged, 0);
        assert!(!report.output.exists());
    }
}
