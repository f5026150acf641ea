//! End-to-end tests for `generate_query`: request JSON in, finished filter
//! document and query options out.

use bson::{doc, Bson};
use serde_json::json;

use sift_mongo::{
    generate_query, Error, FieldFilter, FieldRule, FilterConfig, Pagination, RuleAction,
};

fn rule_filter(value: serde_json::Value) -> FieldFilter {
    FieldFilter::classify(&value).expect("rule filter must classify")
}

/// Make trace output visible under `RUST_LOG` when a test fails.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_defaults_without_filters_or_config() {
    init_tracing();
    let query = generate_query(&json!({}), &[], None).unwrap();

    assert!(query.filter.is_empty());
    assert_eq!(query.options.sort, doc! { "createdAt": 1 });
    assert_eq!(query.options.limit, 4);
}

#[test]
fn test_mixed_operators_fill_both_buckets() {
    init_tracing();
    let filters = json!({
        "name": { "string": "Al", "filterBy": "MATCH", "operator": "AND" },
        "age": { "int": 21, "filterBy": "GTE" }
    });

    let query = generate_query(&filters, &[], None).unwrap();

    assert_eq!(
        query.filter,
        doc! {
            "$or": [ { "age": { "$gte": 21_i64 } } ],
            "$and": [ { "name": "Al" } ],
        }
    );
}

#[test]
fn test_nested_filters_keep_dotted_locations() {
    init_tracing();
    let filters = json!({
        "user": {
            "address": {
                "city": { "string": "Springfield", "filterBy": "MATCH" }
            }
        }
    });

    let query = generate_query(&filters, &[], None).unwrap();

    assert_eq!(
        query.filter,
        doc! { "$or": [ { "user.address.city": "Springfield" } ] }
    );
}

#[test]
fn test_grouped_nested_filters_fold_into_elem_match() {
    init_tracing();
    let filters = json!({
        "user": {
            "address": {
                "city": { "string": "Springfield", "filterBy": "MATCH", "groups": ["loc.and"] },
                "zip": { "string": "12345", "filterBy": "MATCH", "groups": ["loc.and"] }
            }
        }
    });

    let query = generate_query(&filters, &[], None).unwrap();

    assert_eq!(
        query.filter,
        doc! { "$and": [ {
            "$or": [ {
                "user": { "$elemMatch": { "$and": [ {
                    "address": { "$elemMatch": { "$and": [
                        { "city": "Springfield" },
                        { "zip": "12345" },
                    ] } }
                } ] } }
            } ],
        } ] }
    );
}

#[test]
fn test_singleton_group_is_rejected() {
    init_tracing();
    let filters = json!({
        "name": { "string": "Al", "filterBy": "MATCH", "groups": ["g.and"] }
    });

    let err = generate_query(&filters, &[], None).unwrap_err();
    assert!(matches!(err, Error::Policy(msg) if msg.contains("g.and")));
}

#[test]
fn test_string_array_in_membership() {
    init_tracing();
    let filters = json!({
        "tags": { "string": ["red", "blue"], "filterBy": "MATCH", "arrayOptions": "IN" }
    });

    let query = generate_query(&filters, &[], None).unwrap();

    assert_eq!(
        query.filter,
        doc! { "$or": [ { "tags": { "$in": ["red", "blue"] } } ] }
    );
}

#[test]
fn test_object_id_filter_round_trip_and_rejection() {
    init_tracing();
    let hex = "507f1f77bcf86cd799439011";
    let query = generate_query(
        &json!({ "_id": { "string": hex, "filterBy": "OBJECTID" } }),
        &[],
        None,
    )
    .unwrap();

    let member = query.filter.get_array("$or").unwrap()[0]
        .as_document()
        .unwrap();
    assert!(matches!(member.get("_id"), Some(Bson::ObjectId(_))));

    let err = generate_query(
        &json!({ "_id": { "string": "bogus", "filterBy": "OBJECTID" } }),
        &[],
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(msg) if msg.contains("bogus")));
}

#[test]
fn test_pagination_options_and_cursor_predicate() {
    init_tracing();
    let config = FilterConfig {
        pagination: Some(Pagination {
            limit: Some(2),
            reverse: Some(false),
            created_at: Some("2024-01-15T00:00:00Z".parse().unwrap()),
            cursor_key: None,
        }),
        history: None,
    };
    let filters = json!({ "name": { "string": "Al", "filterBy": "REGEX" } });

    let query = generate_query(&filters, &[], Some(&config)).unwrap();

    assert_eq!(query.options.limit, 2);
    assert_eq!(query.options.sort, doc! { "createdAt": 1 });
    assert!(query
        .filter
        .get_document("createdAt")
        .unwrap()
        .get("$gt")
        .is_some());

    let member = query.filter.get_array("$or").unwrap()[0]
        .as_document()
        .unwrap();
    assert!(matches!(
        member.get("name"),
        Some(Bson::RegularExpression(r)) if r.pattern == "Al" && r.options == "i"
    ));
}

#[test]
fn test_disable_rule_blocks_caller_filter() {
    init_tracing();
    let rules = vec![FieldRule::new("role", RuleAction::Disable)];
    let filters = json!({ "role": { "int": 9, "filterBy": "EQ" } });

    let err = generate_query(&filters, &rules, None).unwrap_err();
    assert!(matches!(err, Error::AccessDenied(msg) if msg.contains("role")));
}

#[test]
fn test_override_rule_replaces_caller_silence_with_server_filter() {
    init_tracing();
    let rules = vec![FieldRule::new("tenant", RuleAction::Override)
        .with_filter(rule_filter(json!({ "string": "acme", "filterBy": "MATCH" })))];

    // The caller filters other fields; the override still injects.
    let filters = json!({ "age": { "int": 30, "filterBy": "LT" } });
    let query = generate_query(&filters, &rules, None).unwrap();

    assert_eq!(
        query.filter,
        doc! { "$or": [
            { "age": { "$lt": 30_i64 } },
            { "tenant": "acme" },
        ] }
    );

    // Touching the overridden location is denied outright.
    let err = generate_query(
        &json!({ "tenant": { "string": "other", "filterBy": "MATCH" } }),
        &rules,
        None,
    )
    .unwrap_err();
    assert!(matches!(err, Error::AccessDenied(_)));
}

#[test]
fn test_combine_rule_joins_caller_filter_into_its_group() {
    init_tracing();
    let rules = vec![FieldRule::new("status", RuleAction::Combine).with_filter(rule_filter(
        json!({ "int": 1, "filterBy": "EQ", "groups": ["sec.and"] }),
    ))];
    let filters = json!({ "status": { "int": 5, "filterBy": "GT" } });

    let query = generate_query(&filters, &rules, None).unwrap();

    // Caller and server filters end up side by side in the named group.
    assert_eq!(
        query.filter,
        doc! { "$and": [ {
            "$or": [
                { "status": { "$gt": 5_i64 } },
                { "status": { "$eq": 1_i64 } },
            ],
        } ] }
    );
}

#[test]
fn test_initial_rule_seeds_default_and_yields_to_caller() {
    init_tracing();
    let rules = vec![FieldRule::new("limit_flag", RuleAction::Initial)
        .with_filter(rule_filter(json!({ "bool": true, "filterBy": "EQ" })))];

    // No caller input: the seed filter applies.
    let seeded = generate_query(&json!({}), &rules, None).unwrap();
    assert_eq!(
        seeded.filter,
        doc! { "$or": [ { "limit_flag": { "$eq": true } } ] }
    );

    // Caller input wins and the seed never fires.
    let overridden = generate_query(
        &json!({ "limit_flag": { "bool": false, "filterBy": "EQ" } }),
        &rules,
        None,
    )
    .unwrap();
    assert_eq!(
        overridden.filter,
        doc! { "$or": [ { "limit_flag": { "$eq": false } } ] }
    );
}

#[test]
fn test_sequence_of_filters_at_one_location() {
    init_tracing();
    let filters = json!({
        "age": [
            { "int": 18, "filterBy": "GTE", "operator": "AND" },
            { "int": 65, "filterBy": "LT", "operator": "AND" }
        ]
    });

    let query = generate_query(&filters, &[], None).unwrap();

    assert_eq!(
        query.filter,
        doc! { "$and": [
            { "age": { "$gte": 18_i64 } },
            { "age": { "$lt": 65_i64 } },
        ] }
    );
}
