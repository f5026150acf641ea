//! Pagination and history aggregation helpers.
//!
//! The database round trip itself belongs to the calling executor; this
//! module provides the pure pieces: aggregation pipeline assembly for the
//! paginated read and the time-bucket histogram, and the page-statistics
//! arithmetic computed from the two query results.

use bson::{doc, Document};
use chrono::{DateTime, Utc};
use serde::Serialize;

use sift_core::HistoryInterval;

use crate::generate::QueryOptions;

/// Build the paginated-read pipeline: match, sort, then a facet producing
/// the limited page under `facet_key` alongside a count/total-pages stage.
pub fn pagination_pipeline(
    filter: &Document,
    options: &QueryOptions,
    facet_key: &str,
) -> Vec<Document> {
    vec![
        doc! { "$match": filter.clone() },
        doc! { "$sort": options.sort.clone() },
        doc! { "$facet": {
            facet_key: [ { "$limit": options.limit } ],
            "stats": [
                { "$count": "count" },
                { "$addFields": {
                    "totalPages": { "$ceil": { "$divide": ["$count", options.limit] } }
                } },
            ],
        } },
    ]
}

/// Build the history pipeline: match, then group counts by one synthesized
/// extraction key per requested interval granularity, applied to the cursor
/// field.
pub fn history_pipeline(
    filter: &Document,
    intervals: &[HistoryInterval],
    cursor_key: &str,
) -> Vec<Document> {
    let mut id = Document::new();
    for interval in intervals {
        id.insert(
            interval.wire_name(),
            doc! { interval.mongo_operator(): format!("${cursor_key}") },
        );
    }

    vec![
        doc! { "$match": filter.clone() },
        doc! { "$group": { "_id": id, "total": { "$count": {} } } },
    ]
}

/// Cursor/page statistics for one paginated read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStats {
    /// Documents matching the filter but not yet paged past.
    pub remaining: u64,
    /// Total documents matching the filter, cursor aside.
    pub total: u64,
    /// 1-based page number implied by the cursor position.
    pub page: u64,
    /// Cursor to resume from (timestamp of the last returned document).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<DateTime<Utc>>,
    /// Cursor the request paged from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_cursor: Option<DateTime<Utc>>,
    pub per_page: i64,
    /// Time-bucketed counts, present when the request asked for history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Document>>,
}

impl PageStats {
    /// Compute statistics from the count query and the paged slice.
    ///
    /// `total` is the filter-wide match count, `before_cursor` the number of
    /// matches already paged past, `page_len` the size of the returned slice.
    pub fn compute(
        total: u64,
        before_cursor: u64,
        page_len: u64,
        per_page: i64,
        cursor: Option<DateTime<Utc>>,
        previous_cursor: Option<DateTime<Utc>>,
    ) -> PageStats {
        let consumed = before_cursor.saturating_add(page_len);
        let page = if per_page > 0 {
            before_cursor / per_page as u64 + 1
        } else {
            1
        };

        PageStats {
            remaining: total.saturating_sub(consumed),
            total,
            page,
            cursor,
            previous_cursor,
            per_page,
            history: None,
        }
    }

    /// Attach history buckets from the history aggregation result.
    pub fn with_history(mut self, history: Vec<Document>) -> Self {
        self.history = Some(history);
        self
    }
}
