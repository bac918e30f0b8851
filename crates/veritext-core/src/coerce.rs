//! Coercion from raw proposer JSON into typed field values.
//!
//! Pure and deterministic: given the same raw value and declared type, the
//! outcome never changes. Coercion failure is not fatal; the extractor
//! converts it into a per-field defect and moves on.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::schema::{FieldType, FieldValue};

lazy_static! {
    /// Characters stripped before numeric parsing: currency symbols,
    /// thousands separators, surrounding junk. Keeps digits, sign, dot.
    static ref NON_NUMERIC: Regex = Regex::new(r"[^0-9.\-]").unwrap();
}

/// A raw value that could not be coerced into its declared type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot coerce {raw} into {expected}")]
pub struct CoerceError {
    /// The declared schema type
    pub expected: FieldType,

    /// Compact rendering of the raw value, for the defect message
    pub raw: String,
}

impl CoerceError {
    fn new(expected: FieldType, raw: &JsonValue) -> Self {
        let mut raw = raw.to_string();
        // Defect messages end up in reports; keep them short.
        if raw.chars().count() > 64 {
            raw = raw.chars().take(61).collect();
            raw.push_str("...");
        }
        Self { expected, raw }
    }
}

impl FieldType {
    /// Coerce a raw JSON value into this declared type.
    pub fn coerce(&self, raw: &JsonValue) -> Result<FieldValue, CoerceError> {
        let err = || CoerceError::new(*self, raw);

        match self {
            FieldType::Integer => coerce_number(raw)
                .and_then(|n| {
                    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                        Some(FieldValue::Integer(n as i64))
                    } else {
                        None
                    }
                })
                .ok_or_else(err),
            FieldType::Float => coerce_number(raw).map(FieldValue::Float).ok_or_else(err),
            FieldType::Boolean => coerce_bool(raw).map(FieldValue::Boolean).ok_or_else(err),
            FieldType::Text => raw
                .as_str()
                .map(|s| FieldValue::Text(s.to_string()))
                .ok_or_else(err),
            FieldType::Categorical => raw
                .as_str()
                .map(|s| FieldValue::Categorical(s.trim().to_lowercase()))
                .ok_or_else(err),
            FieldType::Date => raw
                .as_str()
                .and_then(coerce_date)
                .map(FieldValue::Date)
                .ok_or_else(err),
        }
    }
}

fn coerce_number(raw: &JsonValue) -> Option<f64> {
    match raw {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => {
            let cleaned = NON_NUMERIC.replace_all(s, "");
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
            }
        }
        _ => None,
    }
}

fn coerce_bool(raw: &JsonValue) -> Option<bool> {
    match raw {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
}
