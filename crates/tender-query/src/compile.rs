//! Structured filter compilation.
//!
//! Turns a [`SearchFilter`] tree into a [`Predicate`] by resolving each
//! condition's field through the catalog's registry and coercing the value
//! to the field's declared type. Conditions that cannot be compiled (empty
//! trimmed value, unknown field, unparsable number or date, operator not
//! legal for the type) are dropped, never surfaced as errors.

use chrono::{Days, NaiveDateTime};
use tender_model::dates::parse_date_text;
use tender_model::fields::{self, FieldKind};
use tender_model::{CatalogKind, ComparisonOperator, Condition, SearchFilter};

use crate::predicate::{Comparison, DateOp, Leaf, NumberOp, Predicate};

/// Compile a query request: the structured filter when present, otherwise
/// the free-text search fallback, otherwise match-all.
pub fn compile_query(
    catalog: CatalogKind,
    filter: Option<&SearchFilter>,
    search: &str,
) -> Predicate {
    match filter {
        Some(filter) => compile(catalog, filter),
        None => compile_search(catalog, search),
    }
}

/// Compile a structured filter tree.
///
/// Group algebra: the first AND-group's conditions are conjoined; each later
/// AND-group's conditions are disjoined internally; the per-group results
/// are disjoined with each other; the flattened OR-group conditions form one
/// negated disjunction conjoined on top. An empty tree compiles to
/// [`Predicate::True`].
pub fn compile(catalog: CatalogKind, filter: &SearchFilter) -> Predicate {
    let mut alternatives: Vec<Predicate> = Vec::new();
    for (index, group) in filter.and_groups.iter().enumerate() {
        let leaves: Vec<Predicate> = group
            .conditions
            .iter()
            .filter_map(|c| compile_condition(catalog, c))
            .collect();
        if leaves.is_empty() {
            continue;
        }
        // Group 0 is conjunctive; every later group is an independent
        // alternative whose own conditions are disjoined.
        alternatives.push(if index == 0 {
            Predicate::and(leaves)
        } else {
            Predicate::or(leaves)
        });
    }

    let exclusions: Vec<Predicate> = filter
        .or_groups
        .iter()
        .flat_map(|g| g.conditions.iter())
        .filter_map(|c| compile_condition(catalog, c))
        .collect();

    let positive = match alternatives.len() {
        0 => None,
        _ => Some(Predicate::or(alternatives)),
    };
    let negated = match exclusions.len() {
        0 => None,
        _ => Some(Predicate::Not(Box::new(Predicate::or(exclusions)))),
    };

    match (positive, negated) {
        (None, None) => Predicate::True,
        (Some(p), None) => p,
        (None, Some(n)) => n,
        (Some(p), Some(n)) => Predicate::and(vec![p, n]),
    }
}

/// Compile the free-text fallback: a case-insensitive `contains` over the
/// catalog's search fields. Used only when no structured filter is present.
pub fn compile_search(catalog: CatalogKind, search: &str) -> Predicate {
    let needle = search.trim();
    if needle.is_empty() {
        return Predicate::True;
    }

    let leaves: Vec<Predicate> = fields::search_fields(catalog)
        .iter()
        .filter_map(|name| fields::field(catalog, name))
        .map(|field| {
            Predicate::Leaf(Leaf {
                field,
                cmp: Comparison::TextContains {
                    needle: needle.to_string(),
                    case_sensitive: false,
                },
            })
        })
        .collect();

    Predicate::or(leaves)
}

fn compile_condition(catalog: CatalogKind, condition: &Condition) -> Option<Predicate> {
    let value = condition.value.trim();
    if value.is_empty() {
        return None;
    }

    let Some(field) = fields::field(catalog, &condition.field) else {
        log::debug!(
            "dropping filter condition on unknown field {:?} for {catalog}",
            condition.field
        );
        return None;
    };

    let case_sensitive = condition.match_type.is_case_sensitive();

    let cmp = match field.kind {
        FieldKind::NumericText => match condition.operator {
            ComparisonOperator::Contains => Comparison::TextContains {
                needle: value.to_string(),
                case_sensitive,
            },
            op => {
                let number = parse_filter_number(value)?;
                Comparison::Number {
                    op: match op {
                        ComparisonOperator::Equals => NumberOp::Equals,
                        ComparisonOperator::NotEquals => NumberOp::NotEquals,
                        ComparisonOperator::GreaterThan => NumberOp::GreaterThan,
                        ComparisonOperator::LessThan => NumberOp::LessThan,
                        ComparisonOperator::GreaterThanOrEqual => NumberOp::GreaterThanOrEqual,
                        ComparisonOperator::LessThanOrEqual => NumberOp::LessThanOrEqual,
                        ComparisonOperator::Contains => unreachable!("handled above"),
                    },
                    value: number,
                }
            }
        },
        FieldKind::Date => {
            let parsed = parse_date_text(value)?;
            match condition.operator {
                ComparisonOperator::Equals => day_interval(parsed)?,
                ComparisonOperator::GreaterThan => Comparison::Date {
                    op: DateOp::GreaterThan,
                    bound: parsed,
                },
                ComparisonOperator::LessThan => Comparison::Date {
                    op: DateOp::LessThan,
                    bound: parsed,
                },
                ComparisonOperator::GreaterThanOrEqual => Comparison::Date {
                    op: DateOp::GreaterThanOrEqual,
                    bound: parsed,
                },
                ComparisonOperator::LessThanOrEqual => Comparison::Date {
                    op: DateOp::LessThanOrEqual,
                    bound: parsed,
                },
                // Substring and inequality matches are not defined for dates.
                ComparisonOperator::Contains | ComparisonOperator::NotEquals => return None,
            }
        }
        FieldKind::Text => match condition.operator {
            ComparisonOperator::Contains => Comparison::TextContains {
                needle: value.to_string(),
                case_sensitive,
            },
            ComparisonOperator::Equals => Comparison::TextEquals {
                needle: value.to_string(),
                case_sensitive,
            },
            ComparisonOperator::NotEquals => Comparison::TextNotEquals {
                needle: value.to_string(),
                case_sensitive,
            },
            // Ordering comparisons are not legal for plain text fields.
            _ => return None,
        },
    };

    Some(Predicate::Leaf(Leaf { field, cmp }))
}

/// `equals` on a date expands to the half-open interval covering the day.
fn day_interval(parsed: NaiveDateTime) -> Option<Comparison> {
    let start = parsed.date().and_hms_opt(0, 0, 0)?;
    let end = start.checked_add_days(Days::new(1))?;
    Some(Comparison::DateOnDay { start, end })
}

/// Parse a filter value as a number, stripping thousands separators.
pub(crate) fn parse_filter_number(value: &str) -> Option<f64> {
    let compact = value.replace(',', "");
    let parsed: f64 = compact.trim().parse().ok()?;
    parsed.is_finite().then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tender_model::{ConditionGroup, MatchType};

    fn cond(field: &str, operator: ComparisonOperator, value: &str) -> Condition {
        Condition {
            field: field.to_string(),
            operator,
            match_type: MatchType::Relative,
            value: value.to_string(),
        }
    }

    fn group(conditions: Vec<Condition>) -> ConditionGroup {
        ConditionGroup { conditions }
    }

    #[test]
    fn empty_tree_compiles_to_true() {
        let filter = SearchFilter::default();
        assert_eq!(compile(CatalogKind::WinningBidB, &filter), Predicate::True);
    }

    #[test]
    fn first_group_conjoins_later_groups_disjoin() {
        let filter = SearchFilter {
            and_groups: vec![
                group(vec![
                    cond("product_name", ComparisonOperator::Contains, "a"),
                    cond("country", ComparisonOperator::Equals, "VN"),
                ]),
                group(vec![cond(
                    "unit_price",
                    ComparisonOperator::GreaterThan,
                    "100",
                )]),
            ],
            or_groups: vec![],
        };

        let Predicate::Or(alternatives) = compile(CatalogKind::WinningBidB, &filter) else {
            panic!("expected top-level OR");
        };
        assert_eq!(alternatives.len(), 2);
        assert!(matches!(alternatives[0], Predicate::And(_)));
        let Predicate::Leaf(leaf) = &alternatives[1] else {
            panic!("expected leaf alternative");
        };
        assert_eq!(leaf.field.name, "unit_price");
        assert_eq!(
            leaf.cmp,
            Comparison::Number {
                op: NumberOp::GreaterThan,
                value: 100.0
            }
        );
    }

    #[test]
    fn or_groups_become_a_negated_disjunction() {
        let filter = SearchFilter {
            and_groups: vec![group(vec![cond(
                "product_name",
                ComparisonOperator::Contains,
                "a",
            )])],
            or_groups: vec![group(vec![cond(
                "country",
                ComparisonOperator::Equals,
                "X",
            )])],
        };

        let Predicate::And(parts) = compile(CatalogKind::WinningBidB, &filter) else {
            panic!("expected conjunction with the exclusion term");
        };
        assert_eq!(parts.len(), 2);
        let Predicate::Not(inner) = &parts[1] else {
            panic!("expected negated exclusion");
        };
        let Predicate::Leaf(leaf) = inner.as_ref() else {
            panic!("expected single exclusion leaf");
        };
        assert_eq!(leaf.field.name, "country");
    }

    #[test]
    fn empty_trimmed_value_is_dropped() {
        let filter = SearchFilter {
            and_groups: vec![group(vec![cond(
                "product_name",
                ComparisonOperator::Contains,
                "   ",
            )])],
            or_groups: vec![],
        };
        assert_eq!(compile(CatalogKind::WinningBidB, &filter), Predicate::True);
    }

    #[test]
    fn unparsable_number_is_dropped_not_an_error() {
        let filter = SearchFilter {
            and_groups: vec![group(vec![
                cond("unit_price", ComparisonOperator::GreaterThan, "abc"),
                cond("product_name", ComparisonOperator::Contains, "para"),
            ])],
            or_groups: vec![],
        };
        let Predicate::Leaf(leaf) = compile(CatalogKind::WinningBidB, &filter) else {
            panic!("bad number should leave only the text leaf");
        };
        assert_eq!(leaf.field.name, "product_name");
    }

    #[test]
    fn thousands_separators_are_stripped() {
        assert_eq!(parse_filter_number("1,234,567"), Some(1_234_567.0));
        assert_eq!(parse_filter_number(" 1,000.5 "), Some(1000.5));
        assert_eq!(parse_filter_number("12x"), None);
    }

    #[test]
    fn contains_on_numeric_field_matches_text() {
        let filter = SearchFilter {
            and_groups: vec![group(vec![cond(
                "unit_price",
                ComparisonOperator::Contains,
                "500",
            )])],
            or_groups: vec![],
        };
        let Predicate::Leaf(leaf) = compile(CatalogKind::WinningBidB, &filter) else {
            panic!("expected leaf");
        };
        assert_eq!(
            leaf.cmp,
            Comparison::TextContains {
                needle: "500".to_string(),
                case_sensitive: false
            }
        );
    }

    #[test]
    fn date_equals_expands_to_a_half_open_day() {
        let filter = SearchFilter {
            and_groups: vec![group(vec![cond(
                "published_date",
                ComparisonOperator::Equals,
                "2024-01-15",
            )])],
            or_groups: vec![],
        };
        let Predicate::Leaf(leaf) = compile(CatalogKind::WinningBidB, &filter) else {
            panic!("expected leaf");
        };
        let Comparison::DateOnDay { start, end } = &leaf.cmp else {
            panic!("expected day interval");
        };
        assert_eq!(start.to_string(), "2024-01-15 00:00:00");
        assert_eq!(end.to_string(), "2024-01-16 00:00:00");
    }

    #[test]
    fn unknown_field_is_dropped() {
        let filter = SearchFilter {
            and_groups: vec![group(vec![cond(
                "no_such_field",
                ComparisonOperator::Equals,
                "x",
            )])],
            or_groups: vec![],
        };
        assert_eq!(compile(CatalogKind::Bioequivalence, &filter), Predicate::True);
    }

    #[test]
    fn absolute_match_is_case_sensitive() {
        let filter = SearchFilter {
            and_groups: vec![group(vec![Condition {
                field: "product_name".to_string(),
                operator: ComparisonOperator::Equals,
                match_type: MatchType::Absolute,
                value: "Paracetamol".to_string(),
            }])],
            or_groups: vec![],
        };
        let Predicate::Leaf(leaf) = compile(CatalogKind::WinningBidB, &filter) else {
            panic!("expected leaf");
        };
        assert_eq!(
            leaf.cmp,
            Comparison::TextEquals {
                needle: "Paracetamol".to_string(),
                case_sensitive: true
            }
        );
    }

    #[test]
    fn search_fallback_only_without_structured_filter() {
        let searched = compile_query(CatalogKind::WinningBidB, None, "para");
        assert!(matches!(searched, Predicate::Or(_)));

        let filter = SearchFilter::default();
        let with_filter = compile_query(CatalogKind::WinningBidB, Some(&filter), "para");
        assert_eq!(with_filter, Predicate::True);
    }
}
