//! Date ranges used to filter transactions for reporting

use chrono::{Datelike, NaiveDate};
use ledgerdash_config::TimeRange;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

/// Inclusive `[from, to]` interval; a missing side is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// No filter at all
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        match (from, to) {
            (Some(f), Some(t)) if f > t => Self { from: Some(t), to: Some(f) },
            _ => Self { from, to },
        }
    }

    /// Resolve `from`/`to` request parameters; blank or malformed sides are unbounded
    pub fn from_query(from: &str, to: &str) -> Self {
        Self::new(parse_param(from), parse_param(to))
    }

    /// Shortcut ranges relative to `today`
    pub fn preset(range: TimeRange, today: NaiveDate) -> Self {
        match range {
            TimeRange::Month => {
                let start = today.with_day(1).unwrap_or(today);
                Self::new(Some(start), Some(last_day_of_month(today.year(), today.month())))
            }
            TimeRange::Quarter => {
                let first_month = (today.month0() / 3) * 3 + 1;
                let start = NaiveDate::from_ymd_opt(today.year(), first_month, 1).unwrap_or(today);
                Self::new(Some(start), Some(last_day_of_month(today.year(), first_month + 2)))
            }
            TimeRange::Year => Self::new(
                NaiveDate::from_ymd_opt(today.year(), 1, 1),
                NaiveDate::from_ymd_opt(today.year(), 12, 31),
            ),
            TimeRange::All => Self::all(),
        }
    }

    pub fn is_all_time(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Append `AND column >= ? AND column <= ?` with the bounds bound as parameters.
    /// `column` must be a trusted identifier, never request data.
    pub fn push_predicate(&self, qb: &mut QueryBuilder<'_, Sqlite>, column: &'static str) {
        if let Some(from) = self.from {
            qb.push(" AND ").push(column).push(" >= ").push_bind(from);
        }
        if let Some(to) = self.to {
            qb.push(" AND ").push(column).push(" <= ").push_bind(to);
        }
    }

    /// `from` as it goes back into a query string or date input
    pub fn from_param(&self) -> String {
        self.from.map(|d| d.to_string()).unwrap_or_default()
    }

    pub fn to_param(&self) -> String {
        self.to.map(|d| d.to_string()).unwrap_or_default()
    }

    /// Get a human-readable description of the range
    pub fn description(&self) -> String {
        match (self.from, self.to) {
            (None, None) => "All Time".to_string(),
            (Some(s), None) => format!("Since {}", s),
            (None, Some(e)) => format!("Until {}", e),
            (Some(s), Some(e)) => format!("{} to {}", s, e),
        }
    }
}

fn parse_param(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            log::debug!(target: "ledgerdash::time", "ignoring malformed date parameter '{}'", raw);
            None
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
