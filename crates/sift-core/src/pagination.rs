//! Pagination config and time-bucket history intervals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size when the caller specifies none.
pub const DEFAULT_LIMIT: i64 = 4;

/// Default cursor field for pagination and history bucketing.
pub const DEFAULT_CURSOR_KEY: &str = "createdAt";

/// Cursor-based pagination request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Walk the cursor backwards (descending sort, `$lt` cursor predicate).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverse: Option<bool>,
    /// Resume after this timestamp; absent means start of the collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Document field holding the cursor timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor_key: Option<String>,
}

impl Pagination {
    /// The cursor field to sort and page on.
    pub fn cursor_key(&self) -> &str {
        self.cursor_key.as_deref().unwrap_or(DEFAULT_CURSOR_KEY)
    }
}

/// Global per-request configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryFilterInput>,
}

/// Requested time-bucket granularities for result histograms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFilterInput {
    pub interval: Vec<HistoryInterval>,
}

/// Time-bucket granularity for history aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryInterval {
    Year,
    DayOfYear,
    Month,
    DayOfMonth,
    Week,
    DayOfWeek,
    Hour,
    Minutes,
    Seconds,
    Milliseconds,
}

impl HistoryInterval {
    /// The request-language name of this interval.
    pub fn wire_name(&self) -> &'static str {
        match self {
            HistoryInterval::Year => "YEAR",
            HistoryInterval::DayOfYear => "DAY_OF_YEAR",
            HistoryInterval::Month => "MONTH",
            HistoryInterval::DayOfMonth => "DAY_OF_MONTH",
            HistoryInterval::Week => "WEEK",
            HistoryInterval::DayOfWeek => "DAY_OF_WEEK",
            HistoryInterval::Hour => "HOUR",
            HistoryInterval::Minutes => "MINUTES",
            HistoryInterval::Seconds => "SECONDS",
            HistoryInterval::Milliseconds => "MILLISECONDS",
        }
    }

    /// The per-interval extraction operator, synthesized by camel-casing the
    /// interval name (`DAY_OF_YEAR` → `$dayOfYear`).
    pub fn mongo_operator(&self) -> String {
        format!("${}", camel_case(self.wire_name()))
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, word) in name.to_lowercase().split(['-', '_', ' ']).enumerate() {
        if word.is_empty() {
            continue;
        }
        if i == 0 {
            out.push_str(word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}
