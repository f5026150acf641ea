//! Server-side field rules.
//!
//! A field rule is policy declared by server code against one dotted filter
//! location. It can lock a location down, replace whatever the caller sent,
//! merge the caller's filter into named groups, or seed a default when the
//! caller sent nothing.

use serde::{Deserialize, Serialize};

use crate::field_filter::FieldFilter;

/// What a field rule does when its location is (or is not) filtered by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleAction {
    /// Reject any caller filter at this location; inert otherwise.
    Disable,
    /// Reject caller filters and always apply the rule's own filter.
    Override,
    /// Merge the rule's groups into the caller's filter; the rule's own
    /// filter is also applied so the group gains both members.
    Combine,
    /// Apply the rule's filter only when the caller supplied nothing.
    Initial,
}

/// One location-scoped policy declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    /// Dotted path the rule guards, matching locator output.
    pub location: String,
    /// Replacement/seed filter; required for OVERRIDE and COMBINE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_filter: Option<FieldFilter>,
    pub action: RuleAction,
}

impl FieldRule {
    pub fn new(location: impl Into<String>, action: RuleAction) -> Self {
        Self {
            location: location.into(),
            field_filter: None,
            action,
        }
    }

    pub fn with_filter(mut self, filter: FieldFilter) -> Self {
        self.field_filter = Some(filter);
        self
    }
}
