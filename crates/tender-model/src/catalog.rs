use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One of the four independent record collections.
///
/// Two winning-bid-price catalogs, a bioequivalence registry, and an
/// original-brand registry. Every catalog has its own fixed field list and
/// positional column order (see [`crate::fields`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    WinningBidA,
    WinningBidB,
    Bioequivalence,
    OriginalBrand,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::WinningBidA,
        CatalogKind::WinningBidB,
        CatalogKind::Bioequivalence,
        CatalogKind::OriginalBrand,
    ];

    /// Stable short code stored in audit rows and used in wire payloads.
    pub const fn code(self) -> &'static str {
        match self {
            CatalogKind::WinningBidA => "WBA",
            CatalogKind::WinningBidB => "WBB",
            CatalogKind::Bioequivalence => "BIO",
            CatalogKind::OriginalBrand => "ORB",
        }
    }

    /// SQL table name backing this catalog.
    pub const fn table(self) -> &'static str {
        match self {
            CatalogKind::WinningBidA => "winning_bid_a",
            CatalogKind::WinningBidB => "winning_bid_b",
            CatalogKind::Bioequivalence => "bioequivalence",
            CatalogKind::OriginalBrand => "original_brand",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, UnknownCatalog> {
        match code {
            "WBA" => Ok(CatalogKind::WinningBidA),
            "WBB" => Ok(CatalogKind::WinningBidB),
            "BIO" => Ok(CatalogKind::Bioequivalence),
            "ORB" => Ok(CatalogKind::OriginalBrand),
            other => Err(UnknownCatalog(other.to_string())),
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown catalog code: {0}")]
pub struct UnknownCatalog(pub String);
