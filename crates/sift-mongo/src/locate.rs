//! Field-filter location.
//!
//! Walks an arbitrarily nested request-shaped JSON object and finds every
//! embedded field filter, pairing each with the dotted location path derived
//! from the traversal. The walk is depth-first and order-preserving, takes no
//! ownership of the input, and is restartable: the orchestrator invokes it
//! once per declared root key.
//!
//! Path handling is by-value: each branch of the recursion owns its own path
//! vector, so sibling branches can never corrupt each other's locations.
//!
//! A root with no classifiable filter beneath it yields an empty list; it is
//! the orchestrator's business whether that is an error.

use serde_json::Value;
use tracing::trace;

use sift_core::FieldFilter;

/// One discovered filter and the dotted path it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedFilter {
    pub filter: FieldFilter,
    pub location: String,
}

/// Find every field filter nested beneath `node`, rooted at `root`.
pub fn locate_field_filters(node: &Value, root: &str) -> Vec<LocatedFilter> {
    let mut found = Vec::new();
    walk(node, vec![root.to_string()], &mut found);
    trace!(root, filter_count = found.len(), "located field filters");
    found
}

fn walk(node: &Value, path: Vec<String>, found: &mut Vec<LocatedFilter>) {
    // A classified filter terminates the branch; never descend into one.
    if let Some(filter) = FieldFilter::classify(node) {
        found.push(LocatedFilter {
            filter,
            location: path.join("."),
        });
        return;
    }

    match node {
        // Sequence membership does not extend the path.
        Value::Array(items) => {
            for item in items {
                walk(item, path.clone(), found);
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                if value.is_object() || value.is_array() {
                    let mut child = path.clone();
                    child.push(key.clone());
                    walk(value, child, found);
                }
                // Scalars and nulls terminate with no yield.
            }
        }
        _ => {}
    }
}
