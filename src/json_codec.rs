//! JSON side of the conversion: a top-level object whose values are flat
//! record objects.
//!
//! Key order is preserved in both directions. Record identifiers stay strings
//! even when they look numeric.

use log::debug;
use serde::Serialize;
use serde_json::{Map, Number, Value, ser::PrettyFormatter};

use crate::{
    codec::RecordCodec,
    data::FieldValue,
    error::{ConvertError, Result},
    record::{Fields, RecordSet},
};

pub const DEFAULT_INDENT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    /// Spaces per nesting level in the pretty-printed output.
    pub indent: usize,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

impl RecordCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, text: &str) -> Result<RecordSet> {
        let root: Value = serde_json::from_str(text)?;
        let entries = match root {
            Value::Object(entries) => entries,
            other => {
                return Err(ConvertError::Format(format!(
                    "expected the JSON root to be an object, found {}",
                    json_type_name(&other)
                )));
            }
        };
        if entries.is_empty() {
            return Err(ConvertError::EmptyInput(
                "JSON object contains no records".to_string(),
            ));
        }

        let mut records = RecordSet::new();
        for (id, value) in entries {
            if id.is_empty() {
                return Err(ConvertError::Format(
                    "record identifiers must not be empty".to_string(),
                ));
            }
            let object = match value {
                Value::Object(object) => object,
                other => {
                    return Err(ConvertError::Format(format!(
                        "record under key {id:?} is not an object (found {})",
                        json_type_name(&other)
                    )));
                }
            };
            let fields = parse_fields(&id, object)?;
            records.add_or_replace(id, fields);
        }
        debug!("Parsed {} record(s) from JSON", records.len());
        Ok(records)
    }

    fn serialize(&self, records: &RecordSet) -> Result<String> {
        let mut buffer = Vec::new();
        let indent = " ".repeat(self.indent);
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        records.serialize(&mut serializer)?;
        buffer.push(b'\n');
        String::from_utf8(buffer).map_err(|err| ConvertError::Format(err.to_string()))
    }
}

fn parse_fields(id: &str, object: Map<String, Value>) -> Result<Fields> {
    let mut fields = Fields::with_capacity(object.len());
    for (name, value) in object {
        let value = match value {
            Value::Null => FieldValue::empty(),
            Value::Bool(flag) => FieldValue::from(flag),
            Value::Number(number) => number_to_value(id, &name, &number)?,
            Value::String(text) => FieldValue::from(text),
            other => {
                return Err(ConvertError::Format(format!(
                    "field {name:?} of record {id:?} is {}; only scalar fields are supported",
                    json_type_name(&other)
                )));
            }
        };
        fields.insert(name, value);
    }
    Ok(fields)
}

// Numbers keep their source text, so integers are told apart from floats by
// the literal itself rather than by magnitude.
fn number_to_value(id: &str, name: &str, number: &Number) -> Result<FieldValue> {
    let literal = number.to_string();
    if !literal.contains(['.', 'e', 'E']) {
        return literal.parse::<i64>().map(FieldValue::from).map_err(|_| {
            ConvertError::Format(format!(
                "field {name:?} of record {id:?} holds {literal}, which is outside the 64-bit integer range"
            ))
        });
    }
    number
        .as_f64()
        .filter(|value| value.is_finite())
        .map(FieldValue::from)
        .ok_or_else(|| {
            ConvertError::Format(format!(
                "field {name:?} of record {id:?} holds {literal}, which is not a finite float"
            ))
        })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_native_json_types() {
        let records = JsonCodec::default()
            .parse(r#"{"10": {"stars": 5, "score": 4.5, "exp": 1e3, "win": true, "name": "x", "notes": null}}"#)
            .unwrap();
        let fields = &records.get("10").unwrap().fields;
        assert_eq!(fields.get("stars"), Some(&FieldValue::Integer(5)));
        assert_eq!(fields.get("score"), Some(&FieldValue::Float(4.5)));
        assert_eq!(fields.get("exp"), Some(&FieldValue::Float(1000.0)));
        assert_eq!(fields.get("win"), Some(&FieldValue::Boolean(true)));
        assert_eq!(fields.get("name"), Some(&FieldValue::from("x")));
        assert_eq!(fields.get("notes"), Some(&FieldValue::from("")));
    }

    #[test]
    fn preserves_record_and_field_order() {
        let records = JsonCodec::default()
            .parse(r#"{"b": {"z": 1, "a": 2}, "a": {"m": 3}}"#)
            .unwrap();
        assert_eq!(records.ids().collect::<Vec<_>>(), vec!["b", "a"]);
        let names: Vec<_> = records.get("b").unwrap().fields.names().collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn rejects_non_object_root_and_records() {
        let err = JsonCodec::default().parse("[1, 2]").unwrap_err();
        assert_eq!(err.kind(), "FormatError");
        assert!(err.to_string().contains("an array"));

        let err = JsonCodec::default().parse(r#"{"1": 5}"#).unwrap_err();
        assert!(err.to_string().contains("\"1\""));
    }

    #[test]
    fn rejects_nested_values() {
        let err = JsonCodec::default()
            .parse(r#"{"1": {"tags": ["a"]}}"#)
            .unwrap_err();
        assert_eq!(err.kind(), "FormatError");
        assert!(err.to_string().contains("tags"));
    }

    #[test]
    fn rejects_malformed_and_empty_documents() {
        let err = JsonCodec::default().parse(r#"{"1": {"a": 1},}"#).unwrap_err();
        assert!(matches!(err, ConvertError::Json(_)));

        let err = JsonCodec::default().parse("{}").unwrap_err();
        assert_eq!(err.kind(), "EmptyInputError");
    }

    #[test]
    fn serializes_with_four_space_indent() {
        let records = JsonCodec::default()
            .parse(r#"{"1": {"name": "Café", "n": 2}}"#)
            .unwrap();
        let text = JsonCodec::default().serialize(&records).unwrap();
        assert_eq!(
            text,
            "{\n    \"1\": {\n        \"name\": \"Café\",\n        \"n\": 2\n    }\n}\n"
        );
        let narrow = JsonCodec { indent: 2 }.serialize(&records).unwrap();
        assert_eq!(
            narrow,
            "{\n  \"1\": {\n    \"name\": \"Café\",\n    \"n\": 2\n  }\n}\n"
        );
    }

    fn parse_number(literal: &str) -> Result<FieldValue> {
        let text = format!(r#"{{"1": {{"n": {literal}}}}}"#);
        let records = JsonCodec::default().parse(&text)?;
        Ok(records.get("1").unwrap().fields.get("n").unwrap().clone())
    }

    #[test]
    fn integers_up_to_i64_max_are_accepted() {
        assert_eq!(
            parse_number("9223372036854775807").unwrap(),
            FieldValue::Integer(i64::MAX)
        );
        assert_eq!(
            parse_number("-9223372036854775808").unwrap(),
            FieldValue::Integer(i64::MIN)
        );
    }

    #[test]
    fn integers_beyond_i64_are_rejected_at_any_magnitude() {
        for literal in [
            "9223372036854775808",
            "18446744073709551615",
            "18446744073709551616",
            "-9223372036854775809",
            "123456789012345678901234567890",
        ] {
            let err = parse_number(literal).unwrap_err();
            assert_eq!(err.kind(), "FormatError", "{literal}");
            assert!(err.to_string().contains("64-bit integer range"), "{literal}");
        }
    }

    #[test]
    fn negative_zero_integer_stays_an_integer() {
        assert_eq!(parse_number("-0").unwrap(), FieldValue::Integer(0));
        assert_eq!(parse_number("-0.0").unwrap(), FieldValue::Float(-0.0));
    }

    #[test]
    fn exponent_literals_are_floats() {
        assert_eq!(parse_number("2E2").unwrap(), FieldValue::Float(200.0));
        assert_eq!(parse_number("1.25").unwrap(), FieldValue::Float(1.25));
    }
}
