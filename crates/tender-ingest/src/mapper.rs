//! Positional column → field mapping per catalog.
//!
//! Each mapper mirrors its catalog's registry order exactly; the registry
//! tests in `tender-model` pin the column layout, and
//! [`mapping_agrees_with_registry`](tests) pins the mappers against it.

use tender_model::{
    Bioequivalence, CatalogKind, CatalogRecord, OriginalBrand, WinningBidA, WinningBidB,
};

use crate::coerce::{clean_cell_text, coerce_date};
use crate::decode::RawCell;

/// True when the row's first (primary) column carries no value. Such rows
/// are skipped entirely and count toward nothing.
pub fn primary_column_is_empty(row: &[RawCell]) -> bool {
    match row.first() {
        None | Some(RawCell::Empty) => true,
        Some(RawCell::Text(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Map one raw row into a record draft for the catalog.
///
/// Rows shorter than the catalog's column count are padded with absent
/// values; extra trailing cells are ignored.
pub fn map_row(catalog: CatalogKind, row: &[RawCell]) -> CatalogRecord {
    match catalog {
        CatalogKind::WinningBidA => map_winning_bid_a(row),
        CatalogKind::WinningBidB => map_winning_bid_b(row),
        CatalogKind::Bioequivalence => map_bioequivalence(row),
        CatalogKind::OriginalBrand => map_original_brand(row),
    }
}

fn text(row: &[RawCell], column: usize) -> Option<String> {
    row.get(column).and_then(clean_cell_text)
}

fn date(row: &[RawCell], column: usize) -> Option<chrono::NaiveDateTime> {
    row.get(column).and_then(coerce_date)
}

fn map_winning_bid_a(row: &[RawCell]) -> CatalogRecord {
    CatalogRecord::WinningBidA(WinningBidA {
        product_name: text(row, 0).unwrap_or_default(),
        active_ingredient: text(row, 1),
        strength: text(row, 2),
        registration_number: text(row, 3),
        route: text(row, 4),
        dosage_form: text(row, 5),
        shelf_life: text(row, 6),
        manufacturer: text(row, 7),
        country: text(row, 8),
        packaging: text(row, 9),
        unit: text(row, 10),
        quantity: text(row, 11),
        unit_price: text(row, 12),
        drug_group: text(row, 13),
        tender_notice_code: text(row, 14),
        procuring_entity: text(row, 15),
        selection_method: text(row, 16),
        posted_date: date(row, 17),
        decision_number: text(row, 18),
        decision_date: date(row, 19),
        bidder_count: text(row, 20),
        location: text(row, 21),
    })
}

fn map_winning_bid_b(row: &[RawCell]) -> CatalogRecord {
    CatalogRecord::WinningBidB(WinningBidB {
        product_name: text(row, 0).unwrap_or_default(),
        active_ingredient: text(row, 1),
        strength: text(row, 2),
        registration_number: text(row, 3),
        route: text(row, 4),
        dosage_form: text(row, 5),
        manufacturer: text(row, 6),
        country: text(row, 7),
        packaging: text(row, 8),
        unit: text(row, 9),
        quantity: text(row, 10),
        unit_price: text(row, 11),
        drug_group: text(row, 12),
        winning_facility: text(row, 13),
        province: text(row, 14),
        contractor: text(row, 15),
        decision_number: text(row, 16),
        published_date: date(row, 17),
        drug_type: text(row, 18),
        circular_code: text(row, 19),
        route_code: text(row, 20),
    })
}

fn map_bioequivalence(row: &[RawCell]) -> CatalogRecord {
    CatalogRecord::Bioequivalence(Bioequivalence {
        product_name: text(row, 0).unwrap_or_default(),
        strength: text(row, 1),
        dosage_form: text(row, 2),
        packaging: text(row, 3),
        registration_number: text(row, 4),
        manufacturer: text(row, 5),
        manufacturer_address: text(row, 6),
        notes: text(row, 7),
        decision_number: text(row, 8),
    })
}

fn map_original_brand(row: &[RawCell]) -> CatalogRecord {
    CatalogRecord::OriginalBrand(OriginalBrand {
        product_name: text(row, 0).unwrap_or_default(),
        strength: text(row, 1),
        dosage_form_packaging: text(row, 2),
        registration_number: text(row, 3),
        manufacturer: text(row, 4),
        manufacturer_address: text(row, 5),
        notes: text(row, 6),
        decision_number: text(row, 7),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tender_model::fields::{registry, FieldKind};
    use tender_model::FieldValue;

    #[test]
    fn mapping_agrees_with_registry() {
        // Feed every catalog a row of distinct markers and check each value
        // lands on the field the registry declares for that column.
        for kind in CatalogKind::ALL {
            let fields = registry(kind);
            let row: Vec<RawCell> = fields
                .iter()
                .enumerate()
                .map(|(i, f)| match f.kind {
                    FieldKind::Date => RawCell::Text(format!("2024-01-{:02}", (i % 27) + 1)),
                    _ => RawCell::Text(format!("marker-{i}")),
                })
                .collect();

            let record = map_row(kind, &row);
            let values = record.values();
            for (i, (f, v)) in fields.iter().zip(&values).enumerate() {
                match f.kind {
                    FieldKind::Date => {
                        let expected = NaiveDate::from_ymd_opt(2024, 1, (i as u32 % 27) + 1)
                            .and_then(|d| d.and_hms_opt(0, 0, 0));
                        assert_eq!(v, &FieldValue::Date(expected), "{kind}: {}", f.name);
                    }
                    _ => {
                        assert_eq!(
                            v,
                            &FieldValue::Text(Some(format!("marker-{i}"))),
                            "{kind}: {}",
                            f.name
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn short_rows_pad_with_absent_values() {
        let record = map_row(
            CatalogKind::OriginalBrand,
            &[RawCell::Text("Insulatard".to_string())],
        );
        let CatalogRecord::OriginalBrand(r) = record else {
            panic!("wrong catalog");
        };
        assert_eq!(r.product_name, "Insulatard");
        assert_eq!(r.strength, None);
        assert_eq!(r.decision_number, None);
    }

    #[test]
    fn primary_column_rules() {
        assert!(primary_column_is_empty(&[]));
        assert!(primary_column_is_empty(&[RawCell::Empty]));
        assert!(primary_column_is_empty(&[RawCell::Text("  ".to_string())]));
        assert!(!primary_column_is_empty(&[RawCell::Text("x".to_string())]));
        assert!(!primary_column_is_empty(&[RawCell::Number(1.0)]));
    }
}
