//! MongoDB query generation from request-shaped field filters.
//!
//! The pipeline runs in four stages: [`locate::locate_field_filters`] walks
//! the request object and records every classifiable field filter with its
//! dotted location, [`rules::apply_field_rule`] reconciles each find with the
//! server's field rules, [`convert::to_filter_query`] turns the effective
//! filter into a native predicate fragment, and [`assemble`] inserts it into
//! the combinator tree and finally rewrites named groups into nested
//! `$elemMatch` clauses. [`generate::generate_query`] orchestrates the whole
//! run; [`paginate`] builds the aggregation pipelines around the result.

pub mod assemble;
pub mod convert;
pub mod generate;
pub mod locate;
pub mod paginate;
pub mod rules;

pub use assemble::{add_filter, transform_groups};
pub use convert::to_filter_query;
pub use generate::{generate_query, GeneratedQuery, QueryOptions};
pub use locate::{locate_field_filters, LocatedFilter};
pub use paginate::{history_pipeline, pagination_pipeline, PageStats};
pub use rules::apply_field_rule;

pub use sift_core::{
    group_combinator, ArrayFilterBy, BooleanFieldFilter, BooleanFilterBy, DateFieldFilter, DateFilterBy, Error,
    FieldFilter, FieldRule, FilterConfig, FilterOperator, HistoryFilterInput, HistoryInterval,
    IntFieldFilter, IntFilterBy, Pagination, Result, RuleAction, StringArrayFieldFilter,
    StringFieldFilter, StringFilterBy, DEFAULT_CURSOR_KEY, DEFAULT_LIMIT,
};
