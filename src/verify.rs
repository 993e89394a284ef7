//! Round-trip verification: JSON -> CSV -> JSON entirely in memory.
//!
//! The pipeline reuses the same codecs as `to-csv` and `to-json`, then
//! compares the re-read record set against the original one record by record
//! and field by field. A mismatch is a normal outcome described by
//! [`VerifyResult`], not an error.

use std::{collections::HashSet, fmt};

use anyhow::{Context, Result as AnyResult};
use itertools::Itertools;
use log::{debug, info, warn};

use crate::{
    ExitStatus,
    cli::VerifyArgs,
    codec::RecordCodec,
    csv_codec::CsvCodec,
    data::{FieldValue, ValueKind},
    error::Result,
    io_utils,
    json_codec::JsonCodec,
    record::{Fields, RecordSet},
    table,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    MissingRecord {
        id: String,
    },
    ExtraRecord {
        id: String,
    },
    PositionMismatch {
        id: String,
        original: usize,
        got: usize,
    },
    MissingField {
        id: String,
        field: String,
    },
    ExtraField {
        id: String,
        field: String,
    },
    TypeMismatch {
        id: String,
        field: String,
        original: ValueKind,
        got: ValueKind,
    },
    ValueMismatch {
        id: String,
        field: String,
        original: FieldValue,
        got: FieldValue,
    },
}

impl Diagnostic {
    pub fn label(&self) -> &'static str {
        match self {
            Diagnostic::MissingRecord { .. } => "MissingRecord",
            Diagnostic::ExtraRecord { .. } => "ExtraRecord",
            Diagnostic::PositionMismatch { .. } => "PositionMismatch",
            Diagnostic::MissingField { .. } => "MissingField",
            Diagnostic::ExtraField { .. } => "ExtraField",
            Diagnostic::TypeMismatch { .. } => "TypeMismatch",
            Diagnostic::ValueMismatch { .. } => "ValueMismatch",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Diagnostic::MissingRecord { id }
            | Diagnostic::ExtraRecord { id }
            | Diagnostic::PositionMismatch { id, .. }
            | Diagnostic::MissingField { id, .. }
            | Diagnostic::ExtraField { id, .. }
            | Diagnostic::TypeMismatch { id, .. }
            | Diagnostic::ValueMismatch { id, .. } => id,
        }
    }

    /// Cells for the verbose table: kind, id, field, original, got.
    pub fn table_row(&self) -> Vec<String> {
        let (field, original, got): (String, String, String) = match self {
            Diagnostic::MissingRecord { .. } => {
                (String::new(), "present".into(), "absent".into())
            }
            Diagnostic::ExtraRecord { .. } => (String::new(), "absent".into(), "present".into()),
            Diagnostic::PositionMismatch { original, got, .. } => (
                String::new(),
                format!("#{}", original + 1),
                format!("#{}", got + 1),
            ),
            Diagnostic::MissingField { field, .. } => {
                (field.clone(), "present".into(), "absent".into())
            }
            Diagnostic::ExtraField { field, .. } => {
                (field.clone(), "absent".into(), "present".into())
            }
            Diagnostic::TypeMismatch {
                field,
                original,
                got,
                ..
            } => (field.clone(), original.to_string(), got.to_string()),
            Diagnostic::ValueMismatch {
                field,
                original,
                got,
                ..
            } => (field.clone(), format!("{original:?}"), format!("{got:?}")),
        };
        vec![
            self.label().to_string(),
            self.id().to_string(),
            field,
            original,
            got,
        ]
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingRecord { id } => {
                write!(f, "record {id:?} is missing after the round trip")
            }
            Diagnostic::ExtraRecord { id } => {
                write!(f, "record {id:?} appeared during the round trip")
            }
            Diagnostic::PositionMismatch { id, original, got } => write!(
                f,
                "record {id:?} moved from position {} to {}",
                original + 1,
                got + 1
            ),
            Diagnostic::MissingField { id, field } => {
                write!(f, "record {id:?} lost field {field:?}")
            }
            Diagnostic::ExtraField { id, field } => {
                write!(f, "record {id:?} gained field {field:?}")
            }
            Diagnostic::TypeMismatch {
                id,
                field,
                original,
                got,
            } => write!(f, "record {id:?} field {field:?}: {original} became {got}"),
            Diagnostic::ValueMismatch {
                id,
                field,
                original,
                got,
            } => write!(
                f,
                "record {id:?} field {field:?}: {original:?} became {got:?}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyResult {
    pub passed: bool,
    pub mismatches: Vec<Diagnostic>,
    /// CSV header produced by the intermediate conversion.
    pub fields: Vec<String>,
    pub records: usize,
}

pub fn verify(original_text: &str, infer_types: bool) -> Result<VerifyResult> {
    let json = JsonCodec::default();
    let csv = CsvCodec::new(infer_types);

    let original = json.parse(original_text)?;
    let csv_text = csv.serialize(&original)?;
    let roundtripped = csv.parse(&csv_text)?;

    let reserialized = json.serialize(&roundtripped)?;
    let reparsed = json.parse(&reserialized)?;
    if reparsed != roundtripped {
        warn!("Re-encoded JSON does not parse back to the converted records");
    }
    debug!(
        "Round trip produced {} byte(s) of CSV and {} byte(s) of JSON",
        csv_text.len(),
        reserialized.len()
    );

    let mismatches = compare(&original, &roundtripped);
    Ok(VerifyResult {
        passed: mismatches.is_empty(),
        mismatches,
        fields: CsvCodec::header_for(&original),
        records: original.len(),
    })
}

/// Lists every difference between `original` and `roundtripped`.
pub fn compare(original: &RecordSet, roundtripped: &RecordSet) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for record in original {
        match roundtripped.get(&record.id) {
            Some(other) => {
                compare_fields(&record.id, &record.fields, &other.fields, &mut diagnostics)
            }
            None => diagnostics.push(Diagnostic::MissingRecord {
                id: record.id.clone(),
            }),
        }
    }
    for record in roundtripped {
        if original.get(&record.id).is_none() {
            diagnostics.push(Diagnostic::ExtraRecord {
                id: record.id.clone(),
            });
        }
    }
    diagnostics.extend(order_changes(original, roundtripped));
    diagnostics
}

fn compare_fields(id: &str, original: &Fields, got: &Fields, diagnostics: &mut Vec<Diagnostic>) {
    for (name, value) in original.iter() {
        let Some(other) = got.get(name) else {
            diagnostics.push(Diagnostic::MissingField {
                id: id.to_string(),
                field: name.to_string(),
            });
            continue;
        };
        if value.kind() != other.kind() {
            diagnostics.push(Diagnostic::TypeMismatch {
                id: id.to_string(),
                field: name.to_string(),
                original: value.kind(),
                got: other.kind(),
            });
        } else if value != other {
            diagnostics.push(Diagnostic::ValueMismatch {
                id: id.to_string(),
                field: name.to_string(),
                original: value.clone(),
                got: other.clone(),
            });
        }
    }
    for name in got.names().filter(|name| !original.contains(name)) {
        diagnostics.push(Diagnostic::ExtraField {
            id: id.to_string(),
            field: name.to_string(),
        });
    }
}

// Relative order of the identifiers present on both sides, so a missing
// record does not shift every later one into a false positive.
fn order_changes(original: &RecordSet, roundtripped: &RecordSet) -> Vec<Diagnostic> {
    let shared: HashSet<&str> = original
        .ids()
        .filter(|id| roundtripped.get(id).is_some())
        .collect();
    let before = original.ids().filter(|id| shared.contains(id));
    let after = roundtripped.ids().filter(|id| shared.contains(id));
    before
        .zip(after)
        .filter(|(expected, actual)| expected != actual)
        .filter_map(|(expected, _)| {
            Some(Diagnostic::PositionMismatch {
                id: expected.to_string(),
                original: original.position(expected)?,
                got: roundtripped.position(expected)?,
            })
        })
        .collect()
}

pub fn execute(args: &VerifyArgs) -> AnyResult<ExitStatus> {
    info!(
        "Verifying round trip of {:?} (type inference {})",
        args.input,
        if args.infer_types { "on" } else { "off" }
    );
    let text = io_utils::read_input(&args.input)
        .with_context(|| format!("Reading input JSON {:?}", args.input))?;
    let result = verify(&text, args.infer_types)
        .with_context(|| format!("Verify failed during conversion of {:?}", args.input))?;

    if result.passed {
        println!("VERIFY: PASS (JSON -> CSV -> JSON is lossless for current schema)");
    } else {
        println!(
            "VERIFY: FAIL (round-trip mismatch: {} difference(s) across {} record(s))",
            result.mismatches.len(),
            result.records
        );
    }
    for mismatch in &result.mismatches {
        debug!("{mismatch}");
    }
    if args.verbose {
        println!("[verbose] fields=[{}]", result.fields.iter().join(", "));
        if !result.passed {
            let headers = ["kind", "id", "field", "original", "got"]
                .map(str::to_string)
                .to_vec();
            let rows = result
                .mismatches
                .iter()
                .map(Diagnostic::table_row)
                .collect::<Vec<_>>();
            table::print_table(&headers, &rows);
        }
    }

    Ok(if result.passed {
        ExitStatus::Success
    } else {
        ExitStatus::VerificationFailed
    })
}
