//! Query generation orchestrator.
//!
//! Top-level entry for the translation: establishes pagination cursor and
//! sort/limit options, walks every declared root key through
//! locate → rule application → conversion → assembly, injects whatever field
//! rules remain unconsumed, and finishes with the group transform.
//!
//! Each invocation is independent and purely computational; the filter tree
//! and the remaining-rules list live and die inside one call, so concurrent
//! invocations need no locking.

use bson::{doc, Document};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use sift_core::{
    Error, FieldRule, FilterConfig, Result, DEFAULT_CURSOR_KEY, DEFAULT_LIMIT,
};

use crate::assemble::{add_filter, transform_groups};
use crate::convert::to_filter_query;
use crate::locate::{locate_field_filters, LocatedFilter};
use crate::rules::apply_field_rule;

/// Sort and limit options accompanying a generated filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOptions {
    pub sort: Document,
    pub limit: i64,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            sort: doc! { DEFAULT_CURSOR_KEY: 1 },
            limit: DEFAULT_LIMIT,
        }
    }
}

/// A finished filter tree plus its query options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedQuery {
    pub filter: Document,
    pub options: QueryOptions,
}

/// Generate a MongoDB filter document and query options from a
/// request-shaped map of field filters, server-side field rules, and an
/// optional pagination/history config.
///
/// `field_filters` is the caller's request object: a JSON map whose keys are
/// root locations and whose values contain field filters at any nesting
/// depth. A root with no classifiable filter beneath it contributes nothing.
pub fn generate_query(
    field_filters: &Value,
    field_rules: &[FieldRule],
    config: Option<&FilterConfig>,
) -> Result<GeneratedQuery> {
    let mut filter = Document::new();
    let mut options = QueryOptions::default();

    if let Some(pagination) = config.and_then(|c| c.pagination.as_ref()) {
        let cursor_key = pagination.cursor_key();
        let reverse = pagination.reverse.unwrap_or(false);

        if let Some(cursor) = pagination.created_at {
            let comparison = if reverse { "$lt" } else { "$gt" };
            filter.insert(
                cursor_key,
                doc! { comparison: bson::DateTime::from_chrono(cursor) },
            );
        }
        let direction = if reverse { -1 } else { 1 };
        options.sort = doc! { cursor_key: direction };
        if let Some(limit) = pagination.limit {
            options.limit = limit;
        }
        debug!(cursor_key, limit = options.limit, reverse, "pagination applied");
    }

    let roots = match field_filters {
        Value::Object(map) => map,
        Value::Null => {
            return finish(filter, options);
        }
        other => {
            return Err(Error::Config(format!(
                "field filters must be an object of root locations, got {other}"
            )));
        }
    };

    // Working set of rules for this invocation; consumed rules drop out.
    let mut remaining: Vec<FieldRule> = field_rules.to_vec();

    for (root, node) in roots {
        for LocatedFilter { filter: found, location } in locate_field_filters(node, root) {
            let matched = remaining.iter().find(|r| r.location == location).cloned();
            let effective = match &matched {
                Some(rule) => apply_field_rule(rule, Some(found), &mut remaining)?,
                None => Some((found, location)),
            };

            if let Some((field_filter, location)) = effective {
                let predicate = to_filter_query(&field_filter)?;
                add_filter(
                    &mut filter,
                    &location,
                    predicate,
                    field_filter.operator(),
                    field_filter.array_options(),
                    field_filter.groups(),
                )?;
            }
        }
    }

    // Rules the caller never touched inject their own filters here:
    // OVERRIDE replacements, INITIAL defaults, and COMBINE group partners.
    // DISABLE stays inert.
    let leftover = std::mem::take(&mut remaining);
    for rule in &leftover {
        if let Some((field_filter, location)) = apply_field_rule(rule, None, &mut remaining)? {
            let predicate = to_filter_query(&field_filter)?;
            add_filter(
                &mut filter,
                &location,
                predicate,
                field_filter.operator(),
                field_filter.array_options(),
                field_filter.groups(),
            )?;
        }
    }

    finish(filter, options)
}

fn finish(mut filter: Document, options: QueryOptions) -> Result<GeneratedQuery> {
    if !filter.is_empty() {
        transform_groups(&mut filter)?;
    }
    debug!(limit = options.limit, "generated query");
    Ok(GeneratedQuery { filter, options })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sift_core::{Pagination, RuleAction};

    #[test]
    fn test_empty_input_yields_empty_filter_and_defaults() {
        let query = generate_query(&json!({}), &[], None).unwrap();
        assert!(query.filter.is_empty());
        assert_eq!(query.options.sort, doc! { "createdAt": 1 });
        assert_eq!(query.options.limit, 4);
    }

    #[test]
    fn test_non_object_input_is_config_error() {
        let err = generate_query(&json!([1, 2]), &[], None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_pagination_cursor_predicate_and_options() {
        let config = FilterConfig {
            pagination: Some(Pagination {
                limit: Some(2),
                reverse: Some(false),
                created_at: Some("2024-01-15T00:00:00Z".parse().unwrap()),
                cursor_key: None,
            }),
            history: None,
        };

        let query = generate_query(&json!({}), &[], Some(&config)).unwrap();

        assert_eq!(query.options.limit, 2);
        assert_eq!(query.options.sort, doc! { "createdAt": 1 });
        let cursor = query.filter.get_document("createdAt").unwrap();
        assert!(cursor.get("$gt").is_some());
    }

    #[test]
    fn test_pagination_reverse_flips_sort_and_comparison() {
        let config = FilterConfig {
            pagination: Some(Pagination {
                limit: None,
                reverse: Some(true),
                created_at: Some("2024-01-15T00:00:00Z".parse().unwrap()),
                cursor_key: Some("updatedAt".to_string()),
            }),
            history: None,
        };

        let query = generate_query(&json!({}), &[], Some(&config)).unwrap();

        assert_eq!(query.options.sort, doc! { "updatedAt": -1 });
        let cursor = query.filter.get_document("updatedAt").unwrap();
        assert!(cursor.get("$lt").is_some());
    }

    #[test]
    fn test_single_regex_filter_end_to_end() {
        let filters = json!({ "name": { "string": "Al", "filterBy": "REGEX" } });
        let query = generate_query(&filters, &[], None).unwrap();

        let bucket = query.filter.get_array("$or").unwrap();
        assert_eq!(bucket.len(), 1);
        let member = bucket[0].as_document().unwrap();
        match member.get("name").unwrap() {
            bson::Bson::RegularExpression(r) => {
                assert_eq!(r.pattern, "Al");
                assert_eq!(r.options, "i");
            }
            other => panic!("expected regex, got {other:?}"),
        }
    }

    #[test]
    fn test_unconsumed_override_rule_injects_filter() {
        let rule = FieldRule::new("status", RuleAction::Override).with_filter(
            sift_core::FieldFilter::classify(&json!({"bool": true, "filterBy": "EQ"})).unwrap(),
        );

        let query = generate_query(&json!({}), &[rule], None).unwrap();

        assert_eq!(
            query.filter,
            doc! { "$or": [ { "status": { "$eq": true } } ] }
        );
    }

    #[test]
    fn test_disable_rule_without_caller_input_is_inert() {
        let rule = FieldRule::new("role", RuleAction::Disable);
        let query = generate_query(&json!({}), &[rule], None).unwrap();
        assert!(query.filter.is_empty());
    }

    #[test]
    fn test_disable_rule_rejects_caller_filter() {
        let rule = FieldRule::new("role", RuleAction::Disable);
        let filters = json!({ "role": { "int": 9, "filterBy": "EQ" } });

        let err = generate_query(&filters, &[rule], None).unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
    }
}
