//! Structured logging field name constants for sift.
//!
//! Both crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | WARN  | Policy errors about to surface to the caller |
//! | DEBUG | Decision points: rule application, variant classification |
//! | TRACE | Per-filter iteration during location and assembly |

/// Dotted location path a filter or rule applies to.
pub const LOCATION: &str = "location";

/// Root key of the request object currently being walked.
pub const ROOT: &str = "root";

/// Field-filter variant name ("int", "string", "bool", "date", "string_array").
pub const VARIANT: &str = "variant";

/// Field-rule action being applied.
pub const RULE_ACTION: &str = "rule_action";

/// Named group id a predicate is being assembled into.
pub const GROUP: &str = "group";

/// Number of filters located beneath one root key.
pub const FILTER_COUNT: &str = "filter_count";

/// Page size in effect for the generated options.
pub const LIMIT: &str = "limit";
