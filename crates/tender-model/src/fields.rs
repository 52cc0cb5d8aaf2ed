//! Per-catalog field registries.
//!
//! Each catalog's registry is the single source of truth for its positional
//! column order, the declared type of every field (which decides the legal
//! filter coercions), validation limits, and the backing SQL column names.

use crate::CatalogKind;

/// Declared type of a catalog field.
///
/// `NumericText` fields hold locale-formatted numbers (possibly with
/// thousands separators) but are stored as text; filters compare them
/// numerically while `contains` still matches the stored text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    NumericText,
    Date,
}

/// One entry in a catalog's positional schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name; doubles as the SQL column name.
    pub name: &'static str,
    /// Zero-based data column in the uploaded spreadsheet (header excluded).
    pub column: usize,
    pub kind: FieldKind,
    /// Maximum accepted length, enforced by the validator.
    pub max_len: Option<usize>,
}

const fn text(name: &'static str, column: usize) -> FieldDef {
    FieldDef {
        name,
        column,
        kind: FieldKind::Text,
        max_len: None,
    }
}

const fn numeric(name: &'static str, column: usize) -> FieldDef {
    FieldDef {
        name,
        column,
        kind: FieldKind::NumericText,
        max_len: None,
    }
}

const fn date(name: &'static str, column: usize) -> FieldDef {
    FieldDef {
        name,
        column,
        kind: FieldKind::Date,
        max_len: None,
    }
}

const fn required_name(column: usize) -> FieldDef {
    FieldDef {
        name: "product_name",
        column,
        kind: FieldKind::Text,
        max_len: Some(PRODUCT_NAME_MAX_LEN),
    }
}

/// Maximum accepted length of the mandatory product-name field.
pub const PRODUCT_NAME_MAX_LEN: usize = 500;

/// Winning-bid catalog A: 22 data columns.
pub static WINNING_BID_A: &[FieldDef] = &[
    required_name(0),
    text("active_ingredient", 1),
    text("strength", 2),
    text("registration_number", 3),
    text("route", 4),
    text("dosage_form", 5),
    text("shelf_life", 6),
    text("manufacturer", 7),
    text("country", 8),
    text("packaging", 9),
    text("unit", 10),
    numeric("quantity", 11),
    numeric("unit_price", 12),
    text("drug_group", 13),
    text("tender_notice_code", 14),
    text("procuring_entity", 15),
    text("selection_method", 16),
    date("posted_date", 17),
    text("decision_number", 18),
    date("decision_date", 19),
    text("bidder_count", 20),
    text("location", 21),
];

/// Winning-bid catalog B: 21 data columns.
pub static WINNING_BID_B: &[FieldDef] = &[
    required_name(0),
    text("active_ingredient", 1),
    text("strength", 2),
    text("registration_number", 3),
    text("route", 4),
    text("dosage_form", 5),
    text("manufacturer", 6),
    text("country", 7),
    text("packaging", 8),
    text("unit", 9),
    numeric("quantity", 10),
    numeric("unit_price", 11),
    text("drug_group", 12),
    text("winning_facility", 13),
    text("province", 14),
    text("contractor", 15),
    text("decision_number", 16),
    date("published_date", 17),
    text("drug_type", 18),
    text("circular_code", 19),
    text("route_code", 20),
];

/// Bioequivalence registry: 9 data columns.
pub static BIOEQUIVALENCE: &[FieldDef] = &[
    required_name(0),
    text("strength", 1),
    text("dosage_form", 2),
    text("packaging", 3),
    text("registration_number", 4),
    text("manufacturer", 5),
    text("manufacturer_address", 6),
    text("notes", 7),
    text("decision_number", 8),
];

/// Original-brand registry: 8 data columns.
pub static ORIGINAL_BRAND: &[FieldDef] = &[
    required_name(0),
    text("strength", 1),
    text("dosage_form_packaging", 2),
    text("registration_number", 3),
    text("manufacturer", 4),
    text("manufacturer_address", 5),
    text("notes", 6),
    text("decision_number", 7),
];

/// The positional schema for a catalog, ordered by data column.
pub fn registry(kind: CatalogKind) -> &'static [FieldDef] {
    match kind {
        CatalogKind::WinningBidA => WINNING_BID_A,
        CatalogKind::WinningBidB => WINNING_BID_B,
        CatalogKind::Bioequivalence => BIOEQUIVALENCE,
        CatalogKind::OriginalBrand => ORIGINAL_BRAND,
    }
}

/// Look up a field by name in a catalog's registry.
pub fn field(kind: CatalogKind, name: &str) -> Option<&'static FieldDef> {
    registry(kind).iter().find(|f| f.name == name)
}

/// Fields scanned by the free-text search fallback, in match order.
pub fn search_fields(kind: CatalogKind) -> &'static [&'static str] {
    match kind {
        CatalogKind::WinningBidA | CatalogKind::WinningBidB => {
            &["product_name", "active_ingredient", "manufacturer"]
        }
        CatalogKind::Bioequivalence | CatalogKind::OriginalBrand => &[
            "product_name",
            "registration_number",
            "manufacturer",
            "manufacturer_address",
        ],
    }
}
