//! Filter assembly.
//!
//! `add_filter` inserts one converted predicate into the accumulating filter
//! tree at the correct boolean bucket, optionally wrapping it for array
//! membership and optionally filing it under named group entries.
//!
//! `transform_groups` runs once after all insertions: grouped members whose
//! dotted location spans multiple segments are right-folded into nested
//! `$elemMatch`/`$and` sub-trees, folds sharing a leading segment are
//! deep-merged, and the transient `group` tags are stripped so the tree is
//! valid to hand to a query executor.
//!
//! Merge eligibility is decided structurally on nodes the fold itself
//! produced (a single-key document wrapping `$elemMatch.$and`); converted
//! predicate fragments are always leaves and are never inspected, so caller
//! values cannot collide with the fold shape.

use bson::{doc, Bson, Document};
use tracing::trace;

use sift_core::{group_combinator, ArrayFilterBy, Error, FilterOperator, Result};

/// Operator buckets a filter tree can carry at any level.
const BUCKETS: [&str; 2] = ["$and", "$or"];

/// Transient key tagging a grouped entry until `transform_groups` strips it.
const GROUP_TAG: &str = "group";

/// Insert a converted predicate into the filter tree.
///
/// The operator defaults to OR. With `array_options` the predicate is wrapped
/// in the matching membership operator. With `groups` the member is filed
/// under one entry per group id, keyed inside the combinator bucket the group
/// name encodes; a group id without a `.and`/`.or` marker is a policy error.
pub fn add_filter(
    tree: &mut Document,
    location: &str,
    predicate: Bson,
    operator: Option<FilterOperator>,
    array_options: Option<ArrayFilterBy>,
    groups: Option<&[String]>,
) -> Result<()> {
    let value = match array_options {
        Some(array_by) => Bson::Document(doc! { array_by.as_mongo(): predicate }),
        None => predicate,
    };
    let member = doc! { location: value };
    let bucket = FilterOperator::effective(operator).as_mongo();

    match groups {
        Some(groups) if !groups.is_empty() => {
            for group in groups {
                let combinator = group_combinator(group)?.as_mongo();
                trace!(location, group, combinator, "adding grouped filter");
                push_group_member(tree, combinator, group, bucket, member.clone());
            }
        }
        _ => {
            trace!(location, bucket, "adding filter");
            push_into(tree, bucket, Bson::Document(member));
        }
    }

    Ok(())
}

fn push_into(doc: &mut Document, key: &str, value: Bson) {
    match doc.get_array_mut(key) {
        Ok(items) => items.push(value),
        Err(_) => {
            doc.insert(key, Bson::Array(vec![value]));
        }
    }
}

/// Append a member to the group's entry inside `tree[combinator]`, creating
/// the entry on first use.
fn push_group_member(
    tree: &mut Document,
    combinator: &str,
    group: &str,
    bucket: &str,
    member: Document,
) {
    if let Ok(entries) = tree.get_array_mut(combinator) {
        for entry in entries.iter_mut() {
            let Some(entry) = entry.as_document_mut() else {
                continue;
            };
            if entry.get_str(GROUP_TAG) == Ok(group) {
                push_into(entry, bucket, Bson::Document(member));
                return;
            }
        }
    }

    let entry = doc! { bucket: [member], GROUP_TAG: group };
    push_into(tree, combinator, Bson::Document(entry));
}

/// Rewrite grouped entries in place: fold multi-segment locations into nested
/// `$elemMatch`/`$and` sub-trees, merge folds sharing a leading segment, and
/// strip the group tags.
///
/// A group with fewer than two accumulated members is a policy error: a group
/// exists to combine filters, so a singleton means the request or the server
/// rules are misconfigured.
pub fn transform_groups(tree: &mut Document) -> Result<()> {
    for combinator in BUCKETS {
        let Ok(entries) = tree.get_array_mut(combinator) else {
            continue;
        };
        for entry in entries.iter_mut() {
            let Some(entry) = entry.as_document_mut() else {
                continue;
            };
            if !entry.contains_key(GROUP_TAG) {
                continue;
            }

            let member_count: usize = BUCKETS
                .iter()
                .filter_map(|bucket| entry.get_array(bucket).ok())
                .map(Vec::len)
                .sum();
            if member_count < 2 {
                let group = entry.get_str(GROUP_TAG).unwrap_or_default();
                return Err(Error::Policy(format!(
                    "group \"{group}\" must contain at least two filters"
                )));
            }

            for bucket in BUCKETS {
                let Ok(members) = entry.get_array_mut(bucket) else {
                    continue;
                };
                for member in std::mem::take(members) {
                    match member {
                        Bson::Document(doc) => push_merged(members, fold_location(doc)),
                        other => members.push(other),
                    }
                }
            }

            entry.remove(GROUP_TAG);
        }
    }

    Ok(())
}

/// Right-fold a `{a.b.c: predicate}` member into
/// `{a: {$elemMatch: {$and: [{b: {$elemMatch: {$and: [{c: predicate}]}}}]}}}`.
/// Single-segment members pass through unchanged.
fn fold_location(member: Document) -> Document {
    if member.len() != 1 {
        return member;
    }
    let Some((location, value)) = member.into_iter().next() else {
        return Document::new();
    };
    if !location.contains('.') {
        return doc! { location: value };
    }

    let segments: Vec<&str> = location.split('.').collect();
    let Some((leaf, init)) = segments.split_last() else {
        return Document::new();
    };

    let mut acc = doc! { *leaf: value };
    for segment in init.iter().skip(1).rev() {
        acc = doc! { *segment: { "$elemMatch": { "$and": [acc] } } };
    }
    doc! { segments[0]: { "$elemMatch": { "$and": [acc] } } }
}

/// Append a folded member into `list`, deep-merging with an existing fold
/// node that carries the same leading segment instead of duplicating it.
/// The merge recurses through every `$elemMatch.$and` level.
fn push_merged(list: &mut Vec<Bson>, member: Document) {
    if let Some(key) = fold_key(&member) {
        let target = list.iter_mut().find_map(|existing| {
            let existing = existing.as_document_mut()?;
            if fold_key(existing).as_deref() == Some(key.as_str()) {
                elem_match_and_mut(existing, &key)
            } else {
                None
            }
        });

        if let Some(existing_and) = target {
            let mut member = member;
            if let Some(new_and) = elem_match_and_mut(&mut member, &key) {
                for item in std::mem::take(new_and) {
                    match item {
                        Bson::Document(doc) => push_merged(existing_and, doc),
                        other => existing_and.push(other),
                    }
                }
            }
            return;
        }
    }

    list.push(Bson::Document(member));
}

/// The leading segment of a fold-produced node, or `None` for anything else.
fn fold_key(doc: &Document) -> Option<String> {
    if doc.len() != 1 {
        return None;
    }
    let (key, value) = doc.iter().next()?;
    let inner = value.as_document()?;
    inner.get_document("$elemMatch").ok()?.get_array("$and").ok()?;
    Some(key.clone())
}

fn elem_match_and_mut<'a>(doc: &'a mut Document, key: &str) -> Option<&'a mut Vec<Bson>> {
    doc.get_document_mut(key)
        .ok()?
        .get_document_mut("$elemMatch")
        .ok()?
        .get_array_mut("$and")
        .ok()
}
