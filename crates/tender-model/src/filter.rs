//! Structured filter wire types.
//!
//! A [`SearchFilter`] is the user-built nested boolean query: an ordered list
//! of AND-groups and a list of OR-groups whose conditions form an exclusion
//! set. The JSON layout (`andGroups`, `matchType`, ...) is the stable wire
//! contract with the querying UI.

use serde::{Deserialize, Serialize};

/// Per-condition comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOperator {
    Contains,
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

/// Relative matches fold case; absolute matches are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Relative,
    Absolute,
}

impl Default for MatchType {
    fn default() -> Self {
        MatchType::Relative
    }
}

impl MatchType {
    pub fn is_case_sensitive(self) -> bool {
        matches!(self, MatchType::Absolute)
    }
}

/// One leaf condition of a structured filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Registry field name; conditions naming unknown fields are dropped.
    pub field: String,
    pub operator: ComparisonOperator,
    #[serde(default)]
    pub match_type: MatchType,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub conditions: Vec<Condition>,
}

/// The full structured query.
///
/// The first AND-group's conditions are strictly conjoined; each later
/// AND-group is an independent alternative match. OR-group conditions are
/// flattened into one negated disjunction applied on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    #[serde(default)]
    pub and_groups: Vec<ConditionGroup>,
    #[serde(default)]
    pub or_groups: Vec<ConditionGroup>,
}

impl SearchFilter {
    /// True when no group carries any condition.
    pub fn is_empty(&self) -> bool {
        self.and_groups.iter().all(|g| g.conditions.is_empty())
            && self.or_groups.iter().all(|g| g.conditions.is_empty())
    }
}
