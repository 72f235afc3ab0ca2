// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository and contributor domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// A repository from the curated listing file.
///
/// Only `id`, `name` and `language` are used by the feature tables; the rest of
/// the hosting API record is kept so the download stage can read listing URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(flatten)]
    pub api: Map<String, Value>,
}

impl Repository {
    /// Minimal constructor used by tests and fixtures.
    pub fn new(id: i64, name: impl Into<String>, language: Option<&str>) -> Self {
        Self {
            id,
            name: name.into(),
            language: language.map(str::to_string),
            api: Map::new(),
        }
    }

    /// A string field of the raw API record (e.g. `commits_url`).
    pub fn api_str(&self, key: &str) -> Option<&str> {
        self.api.get(key).and_then(Value::as_str)
    }

    /// A boolean field of the raw API record.
    pub fn api_bool(&self, key: &str) -> Option<bool> {
        self.api.get(key).and_then(Value::as_bool)
    }

    /// Login of the owning account, if present.
    pub fn owner_login(&self) -> Option<&str> {
        self.api
            .get("owner")
            .and_then(|o| o.get("login"))
            .and_then(Value::as_str)
    }

    /// Language label for table rows (empty when unknown).
    pub fn language_label(&self) -> &str {
        self.language.as_deref().unwrap_or("")
    }
}

/// A yes/no flag as stored in the contributor JSON.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value { YesNo::Yes } else { YesNo::No }
    }
}

/// Per-year retention after the registration date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenureFlags {
    pub one_year: YesNo,
    pub two_years: YesNo,
    pub three_years: YesNo,
}

impl TenureFlags {
    pub fn new(one_year: bool, two_years: bool, three_years: bool) -> Self {
        Self {
            one_year: one_year.into(),
            two_years: two_years.into(),
            three_years: three_years.into(),
        }
    }

    /// A long-term contributor committed in each of the three years.
    pub fn ltc(&self) -> YesNo {
        (self.one_year.is_yes() && self.two_years.is_yes() && self.three_years.is_yes()).into()
    }
}

/// A contributor record as returned by the hosting API's contributor listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawContributor {
    pub id: i64,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub repos_url: Option<String>,
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawContributor {
    /// Bot accounts are flagged by type or carry "bot" in their login.
    pub fn is_bot(&self) -> bool {
        self.account_type.as_deref() == Some("Bot") || self.login.to_lowercase().contains("bot")
    }
}

/// A qualified contributor, produced by the eligibility filter and immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    pub id: i64,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub repos_url: Option<String>,
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
    /// Account creation instant.
    pub created_date: DateTime<Utc>,
    /// First commit in the repository ("join" instant).
    pub registration_date: DateTime<Utc>,
    /// Whole days between account creation and registration.
    pub user_age: i64,
    pub one_year: YesNo,
    pub two_years: YesNo,
    pub three_years: YesNo,
    #[serde(rename = "LTC")]
    pub ltc: YesNo,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Contributor {
    /// Build a qualified record; the LTC flag is always derived from the yearly flags.
    pub fn qualify(
        raw: RawContributor,
        created_date: DateTime<Utc>,
        registration_date: DateTime<Utc>,
        tenure: TenureFlags,
    ) -> Self {
        Self {
            id: raw.id,
            login: raw.login,
            url: raw.url,
            repos_url: raw.repos_url,
            account_type: raw.account_type,
            created_date,
            registration_date,
            user_age: (registration_date - created_date).num_days(),
            one_year: tenure.one_year,
            two_years: tenure.two_years,
            three_years: tenure.three_years,
            ltc: tenure.ltc(),
            extra: raw.extra,
        }
    }

    pub fn tenure(&self) -> TenureFlags {
        TenureFlags {
            one_year: self.one_year,
            two_years: self.two_years,
            three_years: self.three_years,
        }
    }

    /// True when the stored LTC flag agrees with the yearly flags.
    pub fn is_consistent(&self) -> bool {
        self.ltc == self.tenure().ltc()
    }

    /// The cumulative retention labels carried into every feature row.
    pub fn ltc_flags(&self) -> LtcFlags {
        LtcFlags {
            ltc_1: u8::from(self.one_year.is_yes()),
            ltc_2: u8::from(self.one_year.is_yes() && self.two_years.is_yes()),
            ltc_3: u8::from(self.ltc.is_yes()),
        }
    }
}

/// Cumulative retention labels: retained for 1, 2 and 3 years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LtcFlags {
    pub ltc_1: u8,
    pub ltc_2: u8,
    pub ltc_3: u8,
}
