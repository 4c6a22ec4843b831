//! FILENAME: core/engine/src/value.rs
//! PURPOSE: Field values and flat records - the raw data a sheet is built from.
//! CONTEXT: Records arrive as JSON objects (`{"city": "Hangzhou", "cost": 12}`),
//! so a `FieldValue` deserializes untagged from null / bool / number / string.
//! Values are compared here for every sort in the layout engines.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key used for a missing or null value in node ids and index keys.
pub const UNDEFINED_KEY: &str = "undefined";

static EMPTY: FieldValue = FieldValue::Empty;

/// A single value of a record field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    Text(String),
}

/// One flat source record: field name -> value.
pub type Record = BTreeMap<String, FieldValue>;

/// Looks up a field in a record. Missing fields read as `FieldValue::Empty`.
pub fn record_value<'a>(record: &'a Record, field: &str) -> &'a FieldValue {
    record.get(field).unwrap_or(&EMPTY)
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Numeric view of the value. Numeric text ("0.35") parses as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used for marker fields such as `isProgress`.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Empty => false,
            FieldValue::Boolean(b) => *b,
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
        }
    }

    /// Stable string key for ids and index lookups.
    /// Numbers print without a trailing ".0" so `1` and `"1"` share a key.
    pub fn key(&self) -> String {
        match self {
            FieldValue::Empty => UNDEFINED_KEY.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Number(n) => format_plain_number(*n),
            FieldValue::Text(s) => s.clone(),
        }
    }

    /// Returns the value as display text (no number format applied).
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            FieldValue::Number(n) => format_plain_number(*n),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

fn format_plain_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// Total order over field values used by every ascending sort.
/// Empty < Number < Text < Boolean. NaN compares equal to other numbers
/// so sorting stays stable instead of panicking.
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Empty, FieldValue::Empty) => Ordering::Equal,
        (FieldValue::Empty, _) => Ordering::Less,
        (_, FieldValue::Empty) => Ordering::Greater,

        (FieldValue::Number(na), FieldValue::Number(nb)) => {
            na.partial_cmp(nb).unwrap_or(Ordering::Equal)
        }
        (FieldValue::Number(_), _) => Ordering::Less,
        (_, FieldValue::Number(_)) => Ordering::Greater,

        (FieldValue::Text(ta), FieldValue::Text(tb)) => ta.cmp(tb),
        (FieldValue::Text(_), _) => Ordering::Less,
        (_, FieldValue::Text(_)) => Ordering::Greater,

        (FieldValue::Boolean(ba), FieldValue::Boolean(bb)) => ba.cmp(bb),
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Empty)
    }
}
