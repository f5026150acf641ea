//! # sift-core
//!
//! Core types for the sift request-filter language.
//!
//! This crate provides the typed field-filter variants, server-side field
//! rules, pagination/history configuration, and the error taxonomy that
//! `sift-mongo` translates into MongoDB query documents.

pub mod error;
pub mod field_filter;
pub mod logging;
pub mod pagination;
pub mod rules;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use field_filter::{
    group_combinator, ArrayFilterBy, BooleanFieldFilter, BooleanFilterBy, DateFieldFilter,
    DateFilterBy, FieldFilter, FilterOperator, IntFieldFilter, IntFilterBy, StringArrayFieldFilter,
    StringFieldFilter, StringFilterBy,
};
pub use pagination::{
    FilterConfig, HistoryFilterInput, HistoryInterval, Pagination, DEFAULT_CURSOR_KEY,
    DEFAULT_LIMIT,
};
pub use rules::{FieldRule, RuleAction};
