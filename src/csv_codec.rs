//! CSV side of the conversion: one header row containing an `id` column,
//! followed by one data row per record.
//!
//! Parsing resolves duplicate identifiers through
//! [`RecordSet::add_or_replace`] and applies type inference per cell when
//! enabled. Serialization always writes `id` first, followed by the union of
//! all field names in first-appearance order; a record lacking one of those
//! fields gets an empty cell.

use std::collections::HashSet;

use itertools::Itertools;
use log::{debug, warn};

use crate::{
    codec::RecordCodec,
    data::FieldValue,
    error::{ConvertError, Result},
    infer::infer,
    io_utils,
    record::{Fields, RecordSet},
};

pub const ID_COLUMN: &str = "id";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvCodec {
    pub infer_types: bool,
}

impl CsvCodec {
    pub fn new(infer_types: bool) -> Self {
        Self { infer_types }
    }

    /// Header written for `records`: `id` followed by every other field name
    /// in order of first appearance.
    pub fn header_for(records: &RecordSet) -> Vec<String> {
        std::iter::once(ID_COLUMN)
            .chain(
                records
                    .iter()
                    .flat_map(|record| record.fields.names())
                    .filter(|name| *name != ID_COLUMN)
                    .unique(),
            )
            .map(str::to_string)
            .collect()
    }

    fn convert_cell(&self, raw: &str) -> FieldValue {
        if self.infer_types {
            infer(raw)
        } else {
            FieldValue::from(raw)
        }
    }
}

impl RecordCodec for CsvCodec {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn parse(&self, text: &str) -> Result<RecordSet> {
        let mut reader = io_utils::open_csv_reader(text.as_bytes(), true);
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(ConvertError::EmptyInput(
                "CSV has no header row".to_string(),
            ));
        }
        let id_index = locate_id_column(&headers)?;
        debug!(
            "CSV header has {} column(s), id at position {}",
            headers.len(),
            id_index + 1
        );

        let mut records = RecordSet::new();
        for (row_idx, row) in reader.records().enumerate() {
            let row_number = row_idx + 2;
            let row = row?;
            let id = row.get(id_index).unwrap_or_default();
            if id.is_empty() {
                return Err(ConvertError::Format(format!(
                    "row {row_number} has an empty '{ID_COLUMN}' value"
                )));
            }
            let mut fields = Fields::with_capacity(headers.len().saturating_sub(1));
            for (col_idx, name) in headers.iter().enumerate() {
                if col_idx == id_index {
                    continue;
                }
                let raw = row.get(col_idx).unwrap_or_default();
                fields.insert(name, self.convert_cell(raw));
            }
            if records.add_or_replace(id, fields).is_some() {
                warn!("Duplicate id {id:?} on row {row_number}; keeping its first position with the newer values");
            }
        }

        if records.is_empty() {
            return Err(ConvertError::EmptyInput(
                "CSV has a header row but no data rows".to_string(),
            ));
        }
        debug!(
            "Parsed {} record(s) from CSV (type inference {})",
            records.len(),
            if self.infer_types { "on" } else { "off" }
        );
        Ok(records)
    }

    fn serialize(&self, records: &RecordSet) -> Result<String> {
        let header = Self::header_for(records);
        let mut writer = io_utils::open_csv_writer(Vec::new());
        writer.write_record(&header)?;

        for record in records {
            if record.fields.contains(ID_COLUMN) {
                warn!(
                    "Record {:?} has its own '{ID_COLUMN}' field; it cannot be represented in CSV and is dropped",
                    record.id
                );
            }
            let row = std::iter::once(record.id.clone()).chain(header.iter().skip(1).map(|name| {
                record
                    .fields
                    .get(name)
                    .map(FieldValue::as_display)
                    .unwrap_or_default()
            }));
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| ConvertError::Csv(csv::Error::from(err.into_error())))?;
        String::from_utf8(bytes).map_err(|err| ConvertError::Format(err.to_string()))
    }
}

fn locate_id_column(headers: &csv::StringRecord) -> Result<usize> {
    let mut seen = HashSet::new();
    for name in headers.iter() {
        if !seen.insert(name) {
            return Err(ConvertError::Schema(format!(
                "CSV header repeats column '{name}'"
            )));
        }
    }
    headers
        .iter()
        .position(|name| name == ID_COLUMN)
        .ok_or_else(|| {
            ConvertError::Schema(format!(
                "CSV header must contain an '{ID_COLUMN}' column; found [{}]",
                headers.iter().join(", ")
            ))
        })
}
