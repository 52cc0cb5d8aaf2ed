use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::fields::registry;
use crate::CatalogKind;

/// Winning-bid catalog A record fields, in data-column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinningBidA {
    pub product_name: String,
    pub active_ingredient: Option<String>,
    pub strength: Option<String>,
    pub registration_number: Option<String>,
    pub route: Option<String>,
    pub dosage_form: Option<String>,
    pub shelf_life: Option<String>,
    pub manufacturer: Option<String>,
    pub country: Option<String>,
    pub packaging: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
    pub drug_group: Option<String>,
    pub tender_notice_code: Option<String>,
    pub procuring_entity: Option<String>,
    pub selection_method: Option<String>,
    pub posted_date: Option<NaiveDateTime>,
    pub decision_number: Option<String>,
    pub decision_date: Option<NaiveDateTime>,
    pub bidder_count: Option<String>,
    pub location: Option<String>,
}

/// Winning-bid catalog B record fields, in data-column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinningBidB {
    pub product_name: String,
    pub active_ingredient: Option<String>,
    pub strength: Option<String>,
    pub registration_number: Option<String>,
    pub route: Option<String>,
    pub dosage_form: Option<String>,
    pub manufacturer: Option<String>,
    pub country: Option<String>,
    pub packaging: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
    pub drug_group: Option<String>,
    pub winning_facility: Option<String>,
    pub province: Option<String>,
    pub contractor: Option<String>,
    pub decision_number: Option<String>,
    pub published_date: Option<NaiveDateTime>,
    pub drug_type: Option<String>,
    pub circular_code: Option<String>,
    pub route_code: Option<String>,
}

/// Bioequivalence registry record fields, in data-column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bioequivalence {
    pub product_name: String,
    pub strength: Option<String>,
    pub dosage_form: Option<String>,
    pub packaging: Option<String>,
    pub registration_number: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_address: Option<String>,
    pub notes: Option<String>,
    pub decision_number: Option<String>,
}

/// Original-brand registry record fields, in data-column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginalBrand {
    pub product_name: String,
    pub strength: Option<String>,
    pub dosage_form_packaging: Option<String>,
    pub registration_number: Option<String>,
    pub manufacturer: Option<String>,
    pub manufacturer_address: Option<String>,
    pub notes: Option<String>,
    pub decision_number: Option<String>,
}

/// One catalog record, tagged by catalog.
///
/// This is the in-memory shape used both for drafts produced by ingestion
/// (before the store assigns identity) and for manual entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "catalog", content = "record", rename_all = "snake_case")]
pub enum CatalogRecord {
    WinningBidA(WinningBidA),
    WinningBidB(WinningBidB),
    Bioequivalence(Bioequivalence),
    OriginalBrand(OriginalBrand),
}

/// A record as returned by the store: the catalog fields plus the generated
/// identifier and creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: Uuid,
    pub created_at: NaiveDateTime,
    #[serde(flatten)]
    pub record: CatalogRecord,
}

/// A field value read out of (or fed into) a record positionally, aligned
/// with the catalog's [`registry`] order.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Date(Option<NaiveDateTime>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => v.as_deref(),
            FieldValue::Date(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordShapeError {
    #[error("expected {expected} field values for {catalog}, got {got}")]
    Arity {
        catalog: CatalogKind,
        expected: usize,
        got: usize,
    },
    #[error("field {index} of {catalog} has the wrong type")]
    Type { catalog: CatalogKind, index: usize },
}

impl CatalogRecord {
    pub fn catalog(&self) -> CatalogKind {
        match self {
            CatalogRecord::WinningBidA(_) => CatalogKind::WinningBidA,
            CatalogRecord::WinningBidB(_) => CatalogKind::WinningBidB,
            CatalogRecord::Bioequivalence(_) => CatalogKind::Bioequivalence,
            CatalogRecord::OriginalBrand(_) => CatalogKind::OriginalBrand,
        }
    }

    pub fn product_name(&self) -> &str {
        match self {
            CatalogRecord::WinningBidA(r) => &r.product_name,
            CatalogRecord::WinningBidB(r) => &r.product_name,
            CatalogRecord::Bioequivalence(r) => &r.product_name,
            CatalogRecord::OriginalBrand(r) => &r.product_name,
        }
    }

    /// Field values in registry order. The result always has exactly
    /// `registry(self.catalog()).len()` entries.
    pub fn values(&self) -> Vec<FieldValue> {
        fn t(v: &Option<String>) -> FieldValue {
            FieldValue::Text(v.clone())
        }
        fn d(v: &Option<NaiveDateTime>) -> FieldValue {
            FieldValue::Date(*v)
        }

        match self {
            CatalogRecord::WinningBidA(r) => vec![
                FieldValue::Text(Some(r.product_name.clone())),
                t(&r.active_ingredient),
                t(&r.strength),
                t(&r.registration_number),
                t(&r.route),
                t(&r.dosage_form),
                t(&r.shelf_life),
                t(&r.manufacturer),
                t(&r.country),
                t(&r.packaging),
                t(&r.unit),
                t(&r.quantity),
                t(&r.unit_price),
                t(&r.drug_group),
                t(&r.tender_notice_code),
                t(&r.procuring_entity),
                t(&r.selection_method),
                d(&r.posted_date),
                t(&r.decision_number),
                d(&r.decision_date),
                t(&r.bidder_count),
                t(&r.location),
            ],
            CatalogRecord::WinningBidB(r) => vec![
                FieldValue::Text(Some(r.product_name.clone())),
                t(&r.active_ingredient),
                t(&r.strength),
                t(&r.registration_number),
                t(&r.route),
                t(&r.dosage_form),
                t(&r.manufacturer),
                t(&r.country),
                t(&r.packaging),
                t(&r.unit),
                t(&r.quantity),
                t(&r.unit_price),
                t(&r.drug_group),
                t(&r.winning_facility),
                t(&r.province),
                t(&r.contractor),
                t(&r.decision_number),
                d(&r.published_date),
                t(&r.drug_type),
                t(&r.circular_code),
                t(&r.route_code),
            ],
            CatalogRecord::Bioequivalence(r) => vec![
                FieldValue::Text(Some(r.product_name.clone())),
                t(&r.strength),
                t(&r.dosage_form),
                t(&r.packaging),
                t(&r.registration_number),
                t(&r.manufacturer),
                t(&r.manufacturer_address),
                t(&r.notes),
                t(&r.decision_number),
            ],
            CatalogRecord::OriginalBrand(r) => vec![
                FieldValue::Text(Some(r.product_name.clone())),
                t(&r.strength),
                t(&r.dosage_form_packaging),
                t(&r.registration_number),
                t(&r.manufacturer),
                t(&r.manufacturer_address),
                t(&r.notes),
                t(&r.decision_number),
            ],
        }
    }

    /// Rebuild a record from positional field values in registry order.
    ///
    /// This is the inverse of [`CatalogRecord::values`]; the store uses it
    /// when mapping SQL rows back into typed records.
    pub fn from_values(
        catalog: CatalogKind,
        values: Vec<FieldValue>,
    ) -> Result<Self, RecordShapeError> {
        let expected = registry(catalog).len();
        if values.len() != expected {
            return Err(RecordShapeError::Arity {
                catalog,
                expected,
                got: values.len(),
            });
        }

        let mut taker = Taker {
            catalog,
            index: 0,
            values: values.into_iter(),
        };

        let record = match catalog {
            CatalogKind::WinningBidA => CatalogRecord::WinningBidA(WinningBidA {
                product_name: taker.text()?.unwrap_or_default(),
                active_ingredient: taker.text()?,
                strength: taker.text()?,
                registration_number: taker.text()?,
                route: taker.text()?,
                dosage_form: taker.text()?,
                shelf_life: taker.text()?,
                manufacturer: taker.text()?,
                country: taker.text()?,
                packaging: taker.text()?,
                unit: taker.text()?,
                quantity: taker.text()?,
                unit_price: taker.text()?,
                drug_group: taker.text()?,
                tender_notice_code: taker.text()?,
                procuring_entity: taker.text()?,
                selection_method: taker.text()?,
                posted_date: taker.date()?,
                decision_number: taker.text()?,
                decision_date: taker.date()?,
                bidder_count: taker.text()?,
                location: taker.text()?,
            }),
            CatalogKind::WinningBidB => CatalogRecord::WinningBidB(WinningBidB {
                product_name: taker.text()?.unwrap_or_default(),
                active_ingredient: taker.text()?,
                strength: taker.text()?,
                registration_number: taker.text()?,
                route: taker.text()?,
                dosage_form: taker.text()?,
                manufacturer: taker.text()?,
                country: taker.text()?,
                packaging: taker.text()?,
                unit: taker.text()?,
                quantity: taker.text()?,
                unit_price: taker.text()?,
                drug_group: taker.text()?,
                winning_facility: taker.text()?,
                province: taker.text()?,
                contractor: taker.text()?,
                decision_number: taker.text()?,
                published_date: taker.date()?,
                drug_type: taker.text()?,
                circular_code: taker.text()?,
                route_code: taker.text()?,
            }),
            CatalogKind::Bioequivalence => CatalogRecord::Bioequivalence(Bioequivalence {
                product_name: taker.text()?.unwrap_or_default(),
                strength: taker.text()?,
                dosage_form: taker.text()?,
                packaging: taker.text()?,
                registration_number: taker.text()?,
                manufacturer: taker.text()?,
                manufacturer_address: taker.text()?,
                notes: taker.text()?,
                decision_number: taker.text()?,
            }),
            CatalogKind::OriginalBrand => CatalogRecord::OriginalBrand(OriginalBrand {
                product_name: taker.text()?.unwrap_or_default(),
                strength: taker.text()?,
                dosage_form_packaging: taker.text()?,
                registration_number: taker.text()?,
                manufacturer: taker.text()?,
                manufacturer_address: taker.text()?,
                notes: taker.text()?,
                decision_number: taker.text()?,
            }),
        };

        Ok(record)
    }
}

struct Taker {
    catalog: CatalogKind,
    index: usize,
    values: std::vec::IntoIter<FieldValue>,
}

impl Taker {
    fn next(&mut self) -> (usize, Option<FieldValue>) {
        let index = self.index;
        self.index += 1;
        (index, self.values.next())
    }

    fn text(&mut self) -> Result<Option<String>, RecordShapeError> {
        match self.next() {
            (_, Some(FieldValue::Text(v))) => Ok(v),
            (index, _) => Err(RecordShapeError::Type {
                catalog: self.catalog,
                index,
            }),
        }
    }

    fn date(&mut self) -> Result<Option<NaiveDateTime>, RecordShapeError> {
        match self.next() {
            (_, Some(FieldValue::Date(v))) => Ok(v),
            (index, _) => Err(RecordShapeError::Type {
                catalog: self.catalog,
                index,
            }),
        }
    }
}

impl From<WinningBidA> for CatalogRecord {
    fn from(value: WinningBidA) -> Self {
        CatalogRecord::WinningBidA(value)
    }
}

impl From<WinningBidB> for CatalogRecord {
    fn from(value: WinningBidB) -> Self {
        CatalogRecord::WinningBidB(value)
    }
}

impl From<Bioequivalence> for CatalogRecord {
    fn from(value: Bioequivalence) -> Self {
        CatalogRecord::Bioequivalence(value)
    }
}

impl From<OriginalBrand> for CatalogRecord {
    fn from(value: OriginalBrand) -> Self {
        CatalogRecord::OriginalBrand(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{registry, FieldKind};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sample(kind: CatalogKind) -> CatalogRecord {
        let values = registry(kind)
            .iter()
            .enumerate()
            .map(|(i, f)| match f.kind {
                FieldKind::Date => FieldValue::Date(
                    NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32 % 28)
                        .and_then(|d| d.and_hms_opt(0, 0, 0)),
                ),
                _ => FieldValue::Text(Some(format!("v{i}"))),
            })
            .collect();
        CatalogRecord::from_values(kind, values).expect("sample record")
    }

    #[test]
    fn values_round_trip_matches_registry() {
        for kind in CatalogKind::ALL {
            let record = sample(kind);
            let values = record.values();
            assert_eq!(values.len(), registry(kind).len(), "{kind}");
            for (f, v) in registry(kind).iter().zip(&values) {
                match (f.kind, v) {
                    (FieldKind::Date, FieldValue::Date(_)) => {}
                    (FieldKind::Text | FieldKind::NumericText, FieldValue::Text(_)) => {}
                    _ => panic!("{kind}: field {} has mismatched value type", f.name),
                }
            }
            let rebuilt = CatalogRecord::from_values(kind, values).expect("round trip");
            assert_eq!(rebuilt, record, "{kind}");
        }
    }

    #[test]
    fn from_values_rejects_wrong_arity() {
        let err = CatalogRecord::from_values(CatalogKind::OriginalBrand, Vec::new()).unwrap_err();
        assert!(matches!(err, RecordShapeError::Arity { expected: 8, .. }));
    }
}
