// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading export tables from disk.

use chrono::{TimeZone, Utc};
use ltcscope_archive::{ArchiveKind, ArchiveSet, ArchiveTable, columns};
use ltcscope_config::model::ArchiveConfig;
use ltcscope_core::Window;

fn write(dir: &std::path::Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

#[test]
fn loads_present_tables_and_skips_missing_ones() {
    let dir = tempfile::tempdir().unwrap();
    let config = ArchiveConfig::default();
    write(
        dir.path(),
        &config.watchers,
        "repo_id,user_id,created_at\n10,1,2018-05-01 00:00:00\n10,2,2019-05-01 00:00:00\n11,1,2018-06-01 00:00:00\n",
    );

    let set = ArchiveSet::load(
        dir.path(),
        &config,
        &[ArchiveKind::Watchers, ArchiveKind::IssueEvents],
    )
    .unwrap();

    assert!(set.contains(ArchiveKind::Watchers));
    assert_eq!(set.missing(&[ArchiveKind::IssueEvents]), vec![ArchiveKind::IssueEvents]);

    let watchers = set.require(ArchiveKind::Watchers).unwrap();
    let join = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
    let before = Window::before(join);
    assert_eq!(watchers.select_key(columns::REPO_ID, 10, &before).unwrap().count(), 1);
    assert_eq!(watchers.select_key(columns::USER_ID, 1, &before).unwrap().count(), 2);
}

#[test]
fn commits_table_counts_distinct_projects() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("commits.csv");
    std::fs::write(
        &path,
        "author_id,project_id,created_at\n7,100,2018-01-01\n7,100,2018-02-01\n7,200,2018-03-01\n7,300,2020-01-01\n8,100,2018-01-01\n",
    )
    .unwrap();

    let table = ArchiveTable::load(&path, ArchiveKind::Commits.key_columns()).unwrap();
    let join = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
    let sel = table
        .select_key(columns::AUTHOR_ID, 7, &Window::before(join))
        .unwrap();
    assert_eq!(sel.count(), 3);
    assert_eq!(sel.distinct(columns::PROJECT_ID).unwrap(), 2);
}

#[test]
fn issues_table_separates_pulls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("issues.csv");
    std::fs::write(
        &path,
        "reporter_id,pull_request,created_at\n5,0,2018-01-01\n5,1,2018-01-02\n5,1,2018-01-03\n",
    )
    .unwrap();

    let table = ArchiveTable::load(&path, ArchiveKind::Issues.key_columns()).unwrap();
    let sel = table
        .select_key(
            columns::REPORTER_ID,
            5,
            &Window::before(Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap()),
        )
        .unwrap();
    assert_eq!(sel.count_where_int(columns::PULL_REQUEST, 0).unwrap(), 1);
    assert_eq!(sel.count_where_int(columns::PULL_REQUEST, 1).unwrap(), 2);
}

#[test]
fn missing_file_is_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = ArchiveTable::load(&dir.path().join("nope.csv"), &[]).unwrap_err();
    assert!(err.is_missing_input());
}
