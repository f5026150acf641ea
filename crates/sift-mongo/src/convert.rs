//! Field-filter conversion.
//!
//! Maps one classified field filter into a native MongoDB predicate fragment.
//! No location or boolean combination is applied here; the assembler does
//! that. Type-specific validation lives here: ObjectId text must be a
//! well-formed 24-hex-character identifier and date text must parse, both
//! surfacing as validation errors naming the offending value.

use bson::{doc, oid::ObjectId, Bson, Regex};
use chrono::{DateTime, Utc};
use tracing::debug;

use sift_core::{
    BooleanFieldFilter, BooleanFilterBy, DateFieldFilter, DateFilterBy, Error, FieldFilter,
    IntFieldFilter, IntFilterBy, Result, StringArrayFieldFilter, StringFieldFilter, StringFilterBy,
};

/// Convert a classified field filter into a MongoDB predicate fragment.
pub fn to_filter_query(filter: &FieldFilter) -> Result<Bson> {
    match filter {
        FieldFilter::String(f) => string_query(f),
        FieldFilter::StringArray(f) => string_array_query(f),
        FieldFilter::Boolean(f) => Ok(boolean_query(f)),
        FieldFilter::Int(f) => Ok(int_query(f)),
        FieldFilter::Date(f) => date_query(f),
    }
}

fn string_query(filter: &StringFieldFilter) -> Result<Bson> {
    debug!(variant = "string", filter_by = ?filter.filter_by, "converting field filter");
    match filter.filter_by {
        StringFilterBy::Regex => Ok(case_insensitive_regex(&filter.string)),
        StringFilterBy::Match => Ok(Bson::String(filter.string.clone())),
        StringFilterBy::ObjectId => Ok(Bson::ObjectId(parse_object_id(&filter.string)?)),
    }
}

fn string_array_query(filter: &StringArrayFieldFilter) -> Result<Bson> {
    debug!(
        variant = "string_array",
        filter_by = ?filter.filter_by,
        len = filter.string.len(),
        "converting field filter"
    );
    let values = match filter.filter_by {
        StringFilterBy::Regex => filter
            .string
            .iter()
            .map(|s| case_insensitive_regex(s))
            .collect(),
        StringFilterBy::Match => filter
            .string
            .iter()
            .map(|s| Bson::String(s.clone()))
            .collect(),
        StringFilterBy::ObjectId => filter
            .string
            .iter()
            .map(|s| parse_object_id(s).map(Bson::ObjectId))
            .collect::<Result<Vec<_>>>()?,
    };
    Ok(Bson::Array(values))
}

fn boolean_query(filter: &BooleanFieldFilter) -> Bson {
    debug!(variant = "bool", filter_by = ?filter.filter_by, "converting field filter");
    match filter.filter_by {
        BooleanFilterBy::Eq => Bson::Document(doc! { "$eq": filter.bool }),
        BooleanFilterBy::Ne => Bson::Document(doc! { "$ne": filter.bool }),
    }
}

fn int_query(filter: &IntFieldFilter) -> Bson {
    debug!(variant = "int", filter_by = ?filter.filter_by, "converting field filter");
    let op = match filter.filter_by {
        IntFilterBy::Eq => "$eq",
        IntFilterBy::Gt => "$gt",
        IntFilterBy::Gte => "$gte",
        IntFilterBy::Lt => "$lt",
        IntFilterBy::Lte => "$lte",
        IntFilterBy::Ne => "$ne",
    };
    Bson::Document(doc! { op: filter.int })
}

fn date_query(filter: &DateFieldFilter) -> Result<Bson> {
    debug!(variant = "date", filter_by = ?filter.filter_by, "converting field filter");
    let parsed = parse_date(&filter.date)?;
    let date = bson::DateTime::from_chrono(parsed);
    let op = match filter.filter_by {
        DateFilterBy::Eq => "$eq",
        DateFilterBy::Gt => "$gt",
        DateFilterBy::Gte => "$gte",
        DateFilterBy::Lt => "$lt",
        DateFilterBy::Lte => "$lte",
        DateFilterBy::Ne => "$ne",
    };
    Ok(Bson::Document(doc! { op: date }))
}

fn case_insensitive_regex(pattern: &str) -> Bson {
    Bson::RegularExpression(Regex {
        pattern: pattern.to_string(),
        options: "i".to_string(),
    })
}

fn parse_object_id(text: &str) -> Result<ObjectId> {
    ObjectId::parse_str(text)
        .map_err(|_| Error::Validation(format!("Invalid Mongo Object ID: {text}.")))
}

fn parse_date(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Validation(format!("Invalid date \"{text}\": {e}.")))
}
