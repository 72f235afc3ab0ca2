// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record builders shaped like the hosting API's dump records, plus helpers
//! that lay them out on disk the way the pipeline expects.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

/// API root used by every fixture URL.
pub const API: &str = "https://api.github.com/repos/octo/widgets";

/// Parse an RFC 3339 literal; panics on bad input (tests only).
pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|e| panic!("bad fixture timestamp {s}: {e}"))
}

pub fn user(id: i64) -> Value {
    json!({"id": id, "login": format!("user{id}"), "type": "User"})
}

pub fn commit(sha: &str, author_id: i64, date: &str) -> Value {
    json!({
        "sha": sha,
        "author": user(author_id),
        "commit": {"author": {"name": format!("user{author_id}"), "date": date}}
    })
}

pub fn commit_comment(commit_id: &str, user_id: i64, date: &str, body: &str) -> Value {
    json!({
        "commit_id": commit_id,
        "user": user(user_id),
        "created_at": date,
        "body": body
    })
}

pub fn issue_url(number: i64) -> String {
    format!("{API}/issues/{number}")
}

pub fn pull_url(number: i64) -> String {
    format!("{API}/pulls/{number}")
}

/// An issue whose id and number are both `id`.
pub fn issue(id: i64, user_id: i64, date: &str) -> Value {
    json!({
        "id": id,
        "number": id,
        "url": issue_url(id),
        "events_url": format!("{}/events", issue_url(id)),
        "user": user(user_id),
        "created_at": date
    })
}

pub fn issue_comment(issue_url: &str, user_id: i64, date: &str, body: &str) -> Value {
    json!({
        "issue_url": issue_url,
        "user": user(user_id),
        "created_at": date,
        "body": body
    })
}

/// A pull request whose id and number are both `id`.
pub fn pull_request(id: i64, user_id: i64, date: &str, head_sha: &str) -> Value {
    json!({
        "id": id,
        "number": id,
        "url": pull_url(id),
        "issue_url": issue_url(id),
        "user": user(user_id),
        "created_at": date,
        "head": {"sha": head_sha}
    })
}

pub fn pull_request_comment(
    pull_request_url: &str,
    commit_id: &str,
    user_id: i64,
    date: &str,
    body: &str,
) -> Value {
    json!({
        "pull_request_url": pull_request_url,
        "commit_id": commit_id,
        "user": user(user_id),
        "created_at": date,
        "body": body
    })
}

pub fn live_event(event: &str, date: &str) -> Value {
    json!({"event": event, "created_at": date})
}

/// A contributors-listing entry.
pub fn raw_contributor(id: i64, login: &str) -> Value {
    json!({
        "id": id,
        "login": login,
        "url": format!("https://api.github.com/users/{login}"),
        "repos_url": format!("https://api.github.com/users/{login}/repos"),
        "type": "User",
        "contributions": 1
    })
}

/// A qualified contributor as written by the filter stage.
pub fn qualified_contributor(
    id: i64,
    login: &str,
    registration: &str,
    years: [bool; 3],
) -> Value {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut value = raw_contributor(id, login);
    let extra = json!({
        "created_date": "2010-01-01T00:00:00Z",
        "registration_date": registration,
        "user_age": 3000,
        "one_year": yes_no(years[0]),
        "two_years": yes_no(years[1]),
        "three_years": yes_no(years[2]),
        "LTC": yes_no(years.iter().all(|y| *y)),
    });
    if let (Some(obj), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
        obj.extend(extra.clone());
    }
    value
}

/// A repository-listing entry.
pub fn repository(id: i64, name: &str, language: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("octo/{name}"),
        "language": language,
        "fork": false,
        "archived": false,
        "has_issues": true,
        "owner": {"login": "octo"},
        "contributors_url": format!("{API}/contributors"),
        "commits_url": format!("{API}/commits{{/sha}}"),
        "comments_url": format!("{API}/comments{{/number}}"),
        "issues_url": format!("{API}/issues{{/number}}"),
        "issue_comment_url": format!("{API}/issues/comments{{/number}}"),
        "issue_events_url": format!("{API}/issues/events{{/number}}"),
        "pulls_url": format!("{API}/pulls{{/number}}")
    })
}

/// Write `<datasets_dir>/<repo>/<kind>_<repo>.json`.
pub fn write_dump(datasets_dir: &Path, repo: &str, kind: &str, values: &[Value]) {
    let dir = datasets_dir.join(repo);
    std::fs::create_dir_all(&dir).unwrap_or_else(|e| panic!("create {}: {e}", dir.display()));
    write_json(&dir.join(format!("{kind}_{repo}.json")), &Value::from(values.to_vec()));
}

/// Write every dump kind for `repo`, empty unless given.
pub fn write_dataset(datasets_dir: &Path, repo: &str, dumps: &[(&str, Vec<Value>)]) {
    for kind in [
        "contributors",
        "commits",
        "commit_comments",
        "issues",
        "issue_comments",
        "issue_events",
        "pull_requests",
        "pull_request_comments",
    ] {
        let values = dumps
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        write_dump(datasets_dir, repo, kind, &values);
    }
}

/// Write `<contributors_dir>/contributors_<repo>.json`.
pub fn write_contributors(contributors_dir: &Path, repo: &str, values: &[Value]) {
    std::fs::create_dir_all(contributors_dir)
        .unwrap_or_else(|e| panic!("create {}: {e}", contributors_dir.display()));
    write_json(
        &contributors_dir.join(format!("contributors_{repo}.json")),
        &Value::from(values.to_vec()),
    );
}

pub fn write_json(path: &Path, value: &Value) {
    let body = serde_json::to_string_pretty(value).unwrap_or_else(|e| panic!("serialize: {e}"));
    std::fs::write(path, body).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
}
