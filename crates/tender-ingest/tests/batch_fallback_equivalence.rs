//! The multi-row insert path and the row-by-row fallback path must produce
//! identical final record sets for the same valid input.

use proptest::prelude::*;
use std::cell::RefCell;
use tender_ingest::{write_batches, PendingRow, RecordSink, SinkError};
use tender_model::{CatalogRecord, WinningBidB};

/// Records product names in arrival order. When `fail_batches` is set the
/// multi-row path always reports failure without applying anything, which
/// forces every chunk down the fallback path.
#[derive(Default)]
struct MemorySink {
    fail_batches: bool,
    stored: RefCell<Vec<String>>,
}

impl RecordSink for MemorySink {
    fn insert_many(&self, records: &[&CatalogRecord]) -> Result<(), SinkError> {
        if self.fail_batches {
            return Err(SinkError::new("simulated chunk failure"));
        }
        let mut stored = self.stored.borrow_mut();
        for record in records {
            stored.push(record.product_name().to_string());
        }
        Ok(())
    }

    fn insert_one(&self, record: &CatalogRecord) -> Result<(), SinkError> {
        self.stored.borrow_mut().push(record.product_name().to_string());
        Ok(())
    }
}

fn rows_from(names: &[String]) -> Vec<PendingRow> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| PendingRow {
            line: i + 2,
            record: CatalogRecord::WinningBidB(WinningBidB {
                product_name: name.clone(),
                ..WinningBidB::default()
            }),
        })
        .collect()
}

proptest! {
    #[test]
    fn forced_chunk_failure_is_equivalent_to_the_batch_path(
        names in prop::collection::vec("[a-zA-Z0-9 ]{1,40}", 0..300)
    ) {
        let rows = rows_from(&names);

        let batch = MemorySink::default();
        let batch_report = write_batches(&batch, &rows);

        let fallback = MemorySink { fail_batches: true, ..MemorySink::default() };
        let fallback_report = write_batches(&fallback, &rows);

        prop_assert_eq!(batch_report.success, fallback_report.success);
        prop_assert!(batch_report.failures.is_empty());
        prop_assert!(fallback_report.failures.is_empty());
        prop_assert_eq!(&*batch.stored.borrow(), &*fallback.stored.borrow());
    }
}
