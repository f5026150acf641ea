//! Field-filter request language types.
//!
//! A field filter is the caller-facing unit of the request language: a small
//! typed object describing one comparison against one document field. Filters
//! arrive nested anywhere inside a request-shaped JSON object; the variant is
//! decided by which discriminating value key is present (`int`, `string`,
//! `bool`, `date`), never by ad hoc shape guessing.
//!
//! # Example
//!
//! ```
//! use sift_core::{FieldFilter, StringFilterBy};
//! use serde_json::json;
//!
//! let filter = FieldFilter::classify(&json!({
//!     "string": "Al",
//!     "filterBy": "REGEX"
//! })).unwrap();
//!
//! match filter {
//!     FieldFilter::String(f) => assert_eq!(f.filter_by, StringFilterBy::Regex),
//!     _ => panic!("expected string filter"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};

// =============================================================================
// OPERATORS
// =============================================================================

/// Boolean bucket a predicate joins in the output filter tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterOperator {
    And,
    Or,
}

impl FilterOperator {
    /// Single defaulting point for the per-predicate operator: absent means OR.
    pub fn effective(explicit: Option<FilterOperator>) -> FilterOperator {
        explicit.unwrap_or(FilterOperator::Or)
    }

    /// The MongoDB operator key for this bucket.
    pub fn as_mongo(&self) -> &'static str {
        match self {
            FilterOperator::And => "$and",
            FilterOperator::Or => "$or",
        }
    }
}

/// Resolve the boolean combinator a named group encodes.
///
/// Group identifiers are free text but must carry a `.and` or `.or` marker;
/// a group id without one is a policy error, never a silent default.
pub fn group_combinator(group: &str) -> Result<FilterOperator> {
    if group.contains(".or") {
        Ok(FilterOperator::Or)
    } else if group.contains(".and") {
        Ok(FilterOperator::And)
    } else {
        Err(Error::Policy(format!(
            "group name \"{group}\" must contain `.and` or `.or` to categorize the filter"
        )))
    }
}

// =============================================================================
// FILTER-BY ENUMS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntFilterBy {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StringFilterBy {
    Match,
    Regex,
    ObjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BooleanFilterBy {
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DateFilterBy {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
}

/// Array membership semantics for array-valued string filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArrayFilterBy {
    In,
    Nin,
}

impl ArrayFilterBy {
    /// The MongoDB membership operator for this option.
    pub fn as_mongo(&self) -> &'static str {
        match self {
            ArrayFilterBy::In => "$in",
            ArrayFilterBy::Nin => "$nin",
        }
    }
}

// =============================================================================
// FILTER VARIANTS
// =============================================================================

/// Filter for documents which have a property that is an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntFieldFilter {
    pub int: i64,
    pub filter_by: IntFilterBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<FilterOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

/// Filter for documents which have a property that is a string.
/// Filter by REGEX, OBJECTID, or MATCH.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFieldFilter {
    pub string: String,
    pub filter_by: StringFilterBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<FilterOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

/// Filter for documents which have a property that is a boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanFieldFilter {
    pub bool: bool,
    pub filter_by: BooleanFilterBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<FilterOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

/// Filter for documents which have a property that is a date.
///
/// The date text is kept verbatim here; parsing happens at conversion time so
/// an unparseable value surfaces as a validation error instead of a silently
/// invalid predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFieldFilter {
    pub date: String,
    pub filter_by: DateFilterBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<FilterOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

/// Filter for documents which have a property that is an array of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringArrayFieldFilter {
    pub string: Vec<String>,
    pub filter_by: StringFilterBy,
    pub array_options: ArrayFilterBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<FilterOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
}

// =============================================================================
// TAGGED UNION
// =============================================================================

/// A classified field filter: exactly one variant per request-language shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldFilter {
    StringArray(StringArrayFieldFilter),
    String(StringFieldFilter),
    Boolean(BooleanFieldFilter),
    Int(IntFieldFilter),
    Date(DateFieldFilter),
}

impl FieldFilter {
    /// Decide which field-filter variant a JSON node is, if any.
    ///
    /// Classification keys on the presence of the discriminating value key;
    /// the string variant further splits into scalar and array forms based on
    /// the value type or an `arrayOptions` key. Non-filter objects and
    /// scalars yield `None`; this never panics or errors.
    pub fn classify(value: &Value) -> Option<FieldFilter> {
        let obj = value.as_object()?;

        let found = if obj.contains_key("bool") {
            from_value(value).map(FieldFilter::Boolean)
        } else if obj.contains_key("int") {
            from_value(value).map(FieldFilter::Int)
        } else if obj.contains_key("date") {
            from_value(value).map(FieldFilter::Date)
        } else if obj.contains_key("string") {
            let is_array = obj.contains_key("arrayOptions")
                || obj.get("string").is_some_and(Value::is_array);
            if is_array {
                from_value(value).map(FieldFilter::StringArray)
            } else {
                from_value(value).map(FieldFilter::String)
            }
        } else {
            None
        };

        if let Some(filter) = &found {
            trace!(variant = filter.variant_name(), "classified field filter");
        }
        found
    }

    /// Short variant name used in structured log fields.
    pub fn variant_name(&self) -> &'static str {
        match self {
            FieldFilter::Int(_) => "int",
            FieldFilter::String(_) => "string",
            FieldFilter::Boolean(_) => "bool",
            FieldFilter::Date(_) => "date",
            FieldFilter::StringArray(_) => "string_array",
        }
    }

    /// The explicit boolean operator carried by this filter, if any.
    pub fn operator(&self) -> Option<FilterOperator> {
        match self {
            FieldFilter::Int(f) => f.operator,
            FieldFilter::String(f) => f.operator,
            FieldFilter::Boolean(f) => f.operator,
            FieldFilter::Date(f) => f.operator,
            FieldFilter::StringArray(f) => f.operator,
        }
    }

    /// The ordered group identifiers this filter belongs to, if any.
    pub fn groups(&self) -> Option<&[String]> {
        match self {
            FieldFilter::Int(f) => f.groups.as_deref(),
            FieldFilter::String(f) => f.groups.as_deref(),
            FieldFilter::Boolean(f) => f.groups.as_deref(),
            FieldFilter::Date(f) => f.groups.as_deref(),
            FieldFilter::StringArray(f) => f.groups.as_deref(),
        }
    }

    /// Array membership option, present only on the array variant.
    pub fn array_options(&self) -> Option<ArrayFilterBy> {
        match self {
            FieldFilter::StringArray(f) => Some(f.array_options),
            _ => None,
        }
    }

    /// Append group memberships additively (COMBINE rule semantics).
    pub fn merge_groups(&mut self, extra: &[String]) {
        let groups = match self {
            FieldFilter::Int(f) => &mut f.groups,
            FieldFilter::String(f) => &mut f.groups,
            FieldFilter::Boolean(f) => &mut f.groups,
            FieldFilter::Date(f) => &mut f.groups,
            FieldFilter::StringArray(f) => &mut f.groups,
        };
        match groups {
            Some(g) => g.extend(extra.iter().cloned()),
            None => *groups = Some(extra.to_vec()),
        }
    }
}

fn from_value<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
    serde_json::from_value(value.clone()).ok()
}

// =============================================================================
// TESTS
// =============================================================================
