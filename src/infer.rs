//! Opt-in scalar type inference for CSV cells.
//!
//! Rules are tried in order (boolean, integer, float); the first one that
//! accepts the raw text decides the value. Text no rule accepts stays a
//! string, as does the empty cell.

use std::sync::LazyLock;

use regex::Regex;

use crate::data::FieldValue;

// Leading zeros are rejected so identifiers such as "00123" survive; "-0" is
// rejected too.
static INTEGER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0|-?[1-9][0-9]*)$").expect("integer pattern compiles"));

static FLOAT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]+(\.[0-9]+([eE][-+]?[0-9]+)?|[eE][-+]?[0-9]+)$")
        .expect("float pattern compiles")
});

pub struct InferenceRule {
    pub name: &'static str,
    pub apply: fn(&str) -> Option<FieldValue>,
}

pub const RULES: &[InferenceRule] = &[
    InferenceRule {
        name: "boolean",
        apply: infer_boolean,
    },
    InferenceRule {
        name: "integer",
        apply: infer_integer,
    },
    InferenceRule {
        name: "float",
        apply: infer_float,
    },
];

pub fn infer(raw: &str) -> FieldValue {
    RULES
        .iter()
        .find_map(|rule| (rule.apply)(raw))
        .unwrap_or_else(|| FieldValue::from(raw))
}

pub fn infer_boolean(raw: &str) -> Option<FieldValue> {
    if raw.eq_ignore_ascii_case("true") {
        Some(FieldValue::from(true))
    } else if raw.eq_ignore_ascii_case("false") {
        Some(FieldValue::from(false))
    } else {
        None
    }
}

/// Values that overflow `i64` are left for the later rules, which never
/// accept them, so they end up as strings.
pub fn infer_integer(raw: &str) -> Option<FieldValue> {
    if !INTEGER_PATTERN.is_match(raw) {
        return None;
    }
    raw.parse::<i64>().ok().map(FieldValue::from)
}

pub fn infer_float(raw: &str) -> Option<FieldValue> {
    if !FLOAT_PATTERN.is_match(raw) {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(FieldValue::from)
}
