//! Listing and statistics evaluate the same compiled predicate, so the
//! record set behind both must be identical.

use pretty_assertions::assert_eq;
use tender_model::{
    CatalogKind, CatalogRecord, ComparisonOperator, Condition, ConditionGroup, MatchType,
    SearchFilter, WinningBidB,
};
use tender_query::{compile, compile_query, Predicate};
use tender_store::Store;

fn record(name: &str, country: Option<&str>, price: Option<&str>) -> CatalogRecord {
    CatalogRecord::WinningBidB(WinningBidB {
        product_name: name.to_string(),
        country: country.map(str::to_string),
        unit_price: price.map(str::to_string),
        ..WinningBidB::default()
    })
}

fn cond(field: &str, operator: ComparisonOperator, value: &str) -> Condition {
    Condition {
        field: field.to_string(),
        operator,
        match_type: MatchType::Relative,
        value: value.to_string(),
    }
}

fn seeded_store() -> Store {
    let store = Store::open_in_memory().expect("open store");
    for rec in [
        record("Paracetamol 500mg", Some("VN"), Some("1,000")),
        record("Paracetamol 250mg", Some("X"), Some("2,000")),
        record("Amoxicillin", Some("VN"), Some("150")),
        record("Cefixime", Some("FR"), Some("50,000")),
        record("Unpriced drug", Some("VN"), None),
    ] {
        store.insert_record(&rec).expect("insert");
    }
    store
}

#[test]
fn spec_example_group_algebra_against_the_store() {
    let store = seeded_store();

    // name contains "para" OR price > 100, excluding country = "X".
    let filter = SearchFilter {
        and_groups: vec![
            ConditionGroup {
                conditions: vec![cond("product_name", ComparisonOperator::Contains, "para")],
            },
            ConditionGroup {
                conditions: vec![cond("unit_price", ComparisonOperator::GreaterThan, "100")],
            },
        ],
        or_groups: vec![ConditionGroup {
            conditions: vec![cond("country", ComparisonOperator::Equals, "X")],
        }],
    };

    let predicate = compile(CatalogKind::WinningBidB, &filter);
    let page = store
        .list(CatalogKind::WinningBidB, &predicate, 1, 50)
        .expect("list");

    let mut names: Vec<&str> = page.data.iter().map(|r| r.record.product_name()).collect();
    names.sort_unstable();
    // "Paracetamol 250mg" matches both positive terms but is excluded by
    // country = X; "Unpriced drug" matches neither positive term.
    assert_eq!(names, vec!["Amoxicillin", "Cefixime", "Paracetamol 500mg"]);
}

#[test]
fn stats_and_listing_agree_on_the_filtered_set() {
    let store = seeded_store();

    let filter = SearchFilter {
        and_groups: vec![ConditionGroup {
            conditions: vec![cond("country", ComparisonOperator::Equals, "VN")],
        }],
        or_groups: vec![],
    };
    let predicate = compile(CatalogKind::WinningBidB, &filter);

    let page = store
        .list(CatalogKind::WinningBidB, &predicate, 1, 50)
        .expect("list");
    let stats = store
        .stats(CatalogKind::WinningBidB, &predicate)
        .expect("stats");

    // Same predicate, same record set: the stats total counts every listed
    // record, including the one with no parsable price.
    assert_eq!(stats.total, page.pagination.total);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.min_price, 150);
    assert_eq!(stats.max_price, 1000);
    assert_eq!(stats.avg_price, 575);
    assert_eq!(stats.median_price, 575);
}

#[test]
fn case_folding_only_for_relative_matches() {
    let store = seeded_store();

    let relative = compile(
        CatalogKind::WinningBidB,
        &SearchFilter {
            and_groups: vec![ConditionGroup {
                conditions: vec![cond("product_name", ComparisonOperator::Contains, "PARACETAMOL")],
            }],
            or_groups: vec![],
        },
    );
    assert_eq!(
        store
            .list(CatalogKind::WinningBidB, &relative, 1, 50)
            .expect("list")
            .pagination
            .total,
        2
    );

    let absolute = compile(
        CatalogKind::WinningBidB,
        &SearchFilter {
            and_groups: vec![ConditionGroup {
                conditions: vec![Condition {
                    field: "product_name".to_string(),
                    operator: ComparisonOperator::Contains,
                    match_type: MatchType::Absolute,
                    value: "PARACETAMOL".to_string(),
                }],
            }],
            or_groups: vec![],
        },
    );
    assert_eq!(
        store
            .list(CatalogKind::WinningBidB, &absolute, 1, 50)
            .expect("list")
            .pagination
            .total,
        0
    );
}

#[test]
fn numeric_comparison_ignores_thousands_separators_in_stored_text() {
    let store = seeded_store();

    let predicate = compile(
        CatalogKind::WinningBidB,
        &SearchFilter {
            and_groups: vec![ConditionGroup {
                conditions: vec![cond(
                    "unit_price",
                    ComparisonOperator::GreaterThanOrEqual,
                    "2,000",
                )],
            }],
            or_groups: vec![],
        },
    );

    let page = store
        .list(CatalogKind::WinningBidB, &predicate, 1, 50)
        .expect("list");
    let mut names: Vec<&str> = page.data.iter().map(|r| r.record.product_name()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Cefixime", "Paracetamol 250mg"]);
}

#[test]
fn free_text_search_applies_only_without_a_structured_filter() {
    let store = seeded_store();

    let searched = compile_query(CatalogKind::WinningBidB, None, "amoxicillin");
    assert_eq!(
        store
            .list(CatalogKind::WinningBidB, &searched, 1, 50)
            .expect("list")
            .pagination
            .total,
        1
    );

    let ignored = compile_query(
        CatalogKind::WinningBidB,
        Some(&SearchFilter::default()),
        "amoxicillin",
    );
    assert_eq!(ignored, Predicate::True);
}

#[test]
fn pagination_math() {
    let store = Store::open_in_memory().expect("open store");
    for i in 0..7 {
        store
            .insert_record(&record(&format!("Drug {i}"), None, None))
            .expect("insert");
    }

    let page = store
        .list(CatalogKind::WinningBidB, &Predicate::True, 2, 3)
        .expect("list");
    assert_eq!(page.data.len(), 3);
    assert_eq!(page.pagination.page, 2);
    assert_eq!(page.pagination.limit, 3);
    assert_eq!(page.pagination.total, 7);
    assert_eq!(page.pagination.total_pages, 3);

    let last = store
        .list(CatalogKind::WinningBidB, &Predicate::True, 3, 3)
        .expect("list");
    assert_eq!(last.data.len(), 1);
}
