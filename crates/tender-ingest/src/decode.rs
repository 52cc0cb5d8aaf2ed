//! Tabular payload decoding.
//!
//! Uploaded payloads are sniffed by magic bytes: ZIP container → `.xlsx`,
//! OLE compound file → legacy `.xls`, anything else → CSV. Only the first
//! worksheet of a workbook is read. Decoding is deliberately lossless at
//! this stage; cleaning and coercion happen in [`crate::coerce`].

use std::io::Cursor;

use calamine::{Data, Reader, Xls, Xlsx};
use chrono::NaiveDateTime;
use encoding_rs::WINDOWS_1252;
use tender_model::dates::parse_date_text;
use thiserror::Error;

/// One cell as decoded from the payload, before any cleaning.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("file has no rows")]
    Empty,
    #[error("failed to read workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("failed to read legacy workbook: {0}")]
    Xls(#[from] calamine::XlsError),
    #[error("csv parse error at record {record}: {reason}")]
    Csv { record: u64, reason: String },
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Decode a payload into rows of raw cells, header row included.
pub fn decode_rows(payload: &[u8]) -> Result<Vec<Vec<RawCell>>, DecodeError> {
    let rows = if payload.starts_with(ZIP_MAGIC) {
        decode_xlsx(payload)?
    } else if payload.starts_with(OLE_MAGIC) {
        decode_xls(payload)?
    } else {
        decode_csv(payload)?
    };

    if rows.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(rows)
}

fn decode_xlsx(payload: &[u8]) -> Result<Vec<Vec<RawCell>>, DecodeError> {
    let mut workbook = Xlsx::new(Cursor::new(payload))?;
    let sheet_names = workbook.sheet_names().to_owned();
    let Some(first) = sheet_names.first() else {
        return Ok(Vec::new());
    };
    let range = workbook.worksheet_range(first)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect())
}

fn decode_xls(payload: &[u8]) -> Result<Vec<Vec<RawCell>>, DecodeError> {
    let mut workbook = Xls::new(Cursor::new(payload))?;
    let sheet_names = workbook.sheet_names().to_owned();
    let Some(first) = sheet_names.first() else {
        return Ok(Vec::new());
    };
    let range = workbook.worksheet_range(first)?;
    Ok(range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect())
}

fn convert_cell(value: &Data) -> RawCell {
    match value {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::Bool(b) => RawCell::Bool(*b),
        // Error cells carry no usable value for a record field.
        Data::Error(_) => RawCell::Empty,
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => RawCell::DateTime(naive),
            None => RawCell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => match parse_date_text(s) {
            Some(naive) => RawCell::DateTime(naive),
            None => RawCell::Text(s.clone()),
        },
        Data::DurationIso(s) => RawCell::Text(s.clone()),
    }
}

fn decode_csv(payload: &[u8]) -> Result<Vec<Vec<RawCell>>, DecodeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(payload);

    let mut rows: Vec<Vec<RawCell>> = Vec::new();
    let mut record = csv::ByteRecord::new();
    let mut record_index: u64 = 0;
    loop {
        record.clear();
        match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(err) => {
                return Err(DecodeError::Csv {
                    record: record_index + 1,
                    reason: err.to_string(),
                })
            }
        }
        record_index += 1;
        rows.push(record.iter().map(decode_csv_field).collect());
    }

    Ok(rows)
}

/// Decode a CSV field as UTF-8, falling back to Windows-1252 for invalid
/// sequences (matches common spreadsheet-exported CSV on Windows).
fn decode_csv_field(bytes: &[u8]) -> RawCell {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    };
    if text.is_empty() {
        RawCell::Empty
    } else {
        RawCell::Text(text)
    }
}
