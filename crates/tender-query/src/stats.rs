//! Price statistics over a filtered numeric column.

use serde::{Deserialize, Serialize};

use crate::compile::parse_filter_number;

/// Mode buckets round to the nearest multiple of this.
const MODE_BUCKET: f64 = 1_000.0;

/// Summary numbers for a filtered unit-price column.
///
/// Every output is rounded to the nearest integer; the mode is the
/// round-to-nearest-1,000 bucket value itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStats {
    /// Number of filtered records, including those whose price failed to
    /// parse.
    pub total: u64,
    pub avg_price: i64,
    pub mode_price: i64,
    pub median_price: i64,
    pub min_price: i64,
    pub max_price: i64,
}

/// Compute statistics over the raw text values of a numeric column.
///
/// Values are parsed as locale-formatted numbers (thousands separators
/// stripped); unparsable entries are discarded from the calculations but
/// still count toward `total`.
pub fn price_stats(texts: &[Option<String>]) -> PriceStats {
    let mut prices: Vec<f64> = texts
        .iter()
        .filter_map(|t| t.as_deref())
        .filter_map(parse_filter_number)
        .collect();

    let mut stats = PriceStats {
        total: texts.len() as u64,
        ..PriceStats::default()
    };
    if prices.is_empty() {
        return stats;
    }

    let sum: f64 = prices.iter().sum();
    stats.avg_price = (sum / prices.len() as f64).round() as i64;
    stats.mode_price = mode_bucket(&prices) as i64;

    prices.sort_by(|a, b| a.partial_cmp(b).expect("finite prices"));
    stats.min_price = prices[0].round() as i64;
    stats.max_price = prices[prices.len() - 1].round() as i64;
    stats.median_price = median(&prices).round() as i64;

    stats
}

/// Median of a sorted, non-empty slice: the middle value, or the mean of the
/// two middle values for an even count.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent round-to-nearest-1,000 bucket, ties broken by the bucket
/// encountered first.
fn mode_bucket(prices: &[f64]) -> f64 {
    let mut counts: Vec<(i64, u64)> = Vec::new();
    for &price in prices {
        let bucket = ((price / MODE_BUCKET).round() * MODE_BUCKET) as i64;
        match counts.iter_mut().find(|(b, _)| *b == bucket) {
            Some((_, count)) => *count += 1,
            None => counts.push((bucket, 1)),
        }
    }

    let mut best = counts[0];
    for &entry in &counts[1..] {
        if entry.1 > best.1 {
            best = entry;
        }
    }
    best.0 as f64
}
