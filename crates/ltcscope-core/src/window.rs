// SPDX-FileCopyrightText: 2026 LtcScope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observation windows around a contributor's join instant.
//!
//! * **Before**: all history up to and including the join instant.
//! * **First month**: `[join, join + 1 calendar month)`.
//! * **Month after**: `(join, join + 1 calendar month)`, the first month without
//!   the join instant. Repository tables pair it with the before window so a
//!   record stamped at the join instant is attributed once.
//!
//! Calendar arithmetic clamps to the end of the month (Jan 31 + 1 month is
//! Feb 28/29), matching how the retention years are computed.

use chrono::{DateTime, Months, Utc};

/// A half-open or left-unbounded time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: Option<DateTime<Utc>>,
    start_inclusive: bool,
    end: DateTime<Utc>,
    end_inclusive: bool,
}

impl Window {
    /// Everything at or before `join`.
    pub fn before(join: DateTime<Utc>) -> Self {
        Self {
            start: None,
            start_inclusive: true,
            end: join,
            end_inclusive: true,
        }
    }

    /// `[join, join + 1 month)`.
    pub fn first_month(join: DateTime<Utc>) -> Self {
        Self::span(join, add_months(join, 1))
    }

    /// `(join, join + 1 month)`.
    pub fn month_after(join: DateTime<Utc>) -> Self {
        Self {
            start_inclusive: false,
            ..Self::first_month(join)
        }
    }

    /// `[start, end)`.
    pub fn span(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            start_inclusive: true,
            end,
            end_inclusive: false,
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        let after_start = self
            .start
            .is_none_or(|s| if self.start_inclusive { t >= s } else { t > s });
        let before_end = if self.end_inclusive {
            t <= self.end
        } else {
            t < self.end
        };
        after_start && before_end
    }

    /// Like [`contains`](Self::contains), but a missing timestamp never matches.
    pub fn contains_opt(&self, t: Option<DateTime<Utc>>) -> bool {
        t.is_some_and(|t| self.contains(t))
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Add calendar months, saturating at the maximum representable instant.
pub fn add_months(t: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    t.checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Add calendar years (Feb 29 + 1 year is Feb 28).
pub fn add_years(t: DateTime<Utc>, years: u32) -> DateTime<Utc> {
    add_months(t, years.saturating_mul(12))
}
