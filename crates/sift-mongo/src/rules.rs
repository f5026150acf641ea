//! Field-rule application.
//!
//! Given a server-declared field rule and whatever the caller supplied at the
//! same location, produce the effective filter to convert. Rules are matched
//! by dotted location against locator output; the remaining-rules list is
//! local to one generation call and rules that fire once (OVERRIDE, INITIAL
//! with caller input) are consumed from it so they cannot apply twice.

use tracing::{debug, warn};

use sift_core::{Error, FieldFilter, FieldRule, Result, RuleAction};

/// Apply one field rule against an optional caller-supplied filter.
///
/// Returns the effective `(filter, location)` to convert and assemble, or
/// `None` when the rule leaves nothing to add (DISABLE with no caller input,
/// or a rule with no filter of its own).
///
/// `remaining` is mutated when the rule is consumed.
pub fn apply_field_rule(
    rule: &FieldRule,
    caller: Option<FieldFilter>,
    remaining: &mut Vec<FieldRule>,
) -> Result<Option<(FieldFilter, String)>> {
    debug!(
        location = %rule.location,
        rule_action = ?rule.action,
        caller_filter = caller.is_some(),
        "applying field rule"
    );

    match rule.action {
        RuleAction::Disable => {
            if caller.is_some() {
                warn!(location = %rule.location, "caller filtered a disabled location");
                return Err(Error::AccessDenied(format!(
                    "access to property \"{}\" denied by server",
                    rule.location
                )));
            }
            // Inert: DISABLE never injects a filter of its own.
            Ok(None)
        }

        RuleAction::Override => {
            if caller.is_some() {
                warn!(location = %rule.location, "caller filtered an overridden location");
                return Err(Error::AccessDenied(format!(
                    "access to property \"{}\" denied; override value has been defined by server",
                    rule.location
                )));
            }
            let Some(filter) = rule.field_filter.clone() else {
                return Err(Error::Policy(format!(
                    "OVERRIDE rule for \"{}\" has no replacement filter",
                    rule.location
                )));
            };
            consume(rule, remaining);
            Ok(Some((filter, rule.location.clone())))
        }

        RuleAction::Combine => {
            let rule_groups = rule
                .field_filter
                .as_ref()
                .and_then(|f| f.groups())
                .filter(|g| !g.is_empty())
                .map(<[String]>::to_vec)
                .ok_or_else(|| {
                    Error::Policy(format!(
                        "COMBINE rule for \"{}\" requires at least one group on its filter",
                        rule.location
                    ))
                })?;

            match caller {
                Some(mut filter) => {
                    // Additive merge; the rule stays live so its own filter
                    // joins the group in the remaining-rules pass.
                    filter.merge_groups(&rule_groups);
                    Ok(Some((filter, rule.location.clone())))
                }
                None => Ok(rule
                    .field_filter
                    .clone()
                    .map(|f| (f, rule.location.clone()))),
            }
        }

        RuleAction::Initial => match caller {
            Some(filter) => {
                // The rule only existed to seed a default; caller wins.
                consume(rule, remaining);
                Ok(Some((filter, rule.location.clone())))
            }
            None => Ok(rule
                .field_filter
                .clone()
                .map(|f| (f, rule.location.clone()))),
        },
    }
}

fn consume(rule: &FieldRule, remaining: &mut Vec<FieldRule>) {
    remaining.retain(|r| r.location != rule.location);
}
