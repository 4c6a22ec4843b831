//! FILENAME: core/engine/src/number_format.rs
//! PURPOSE: Number formats a field meta can attach to its values.
//! CONTEXT: Loaded from the data config (`{"type": "percent", "decimalPlaces": 1}`).
//! Data cells call `format_value` to turn the raw value into the text they draw;
//! text, booleans and empty values are never formatted.

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// Largest magnitude General prints in positional notation.
const GENERAL_MAX: f64 = 1e15;
/// Decimals General keeps before trimming trailing zeros.
const GENERAL_DECIMALS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NumberFormat {
    /// Integers without a decimal point, fractions trimmed of trailing zeros.
    #[default]
    General,
    #[serde(rename_all = "camelCase")]
    Fixed {
        decimal_places: u8,
        #[serde(default)]
        thousands: bool,
    },
    /// Ratio printed as a percentage (`0.256` -> `25.6%`).
    #[serde(rename_all = "camelCase")]
    Percent { decimal_places: u8 },
    /// Grouped amount with a symbol. Negative amounts print as `-¥1,200.00`.
    #[serde(rename_all = "camelCase")]
    Currency {
        symbol: String,
        decimal_places: u8,
        /// Put the symbol after the amount (`1,200.00 kr`).
        #[serde(default)]
        suffix: bool,
    },
}

/// Text of `value` under `format` (General when absent).
pub fn format_value(value: &FieldValue, format: Option<&NumberFormat>) -> String {
    match value {
        FieldValue::Number(n) => format_number(*n, format.unwrap_or(&NumberFormat::General)),
        other => other.display_value(),
    }
}

pub fn format_number(value: f64, format: &NumberFormat) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    match format {
        NumberFormat::General => general(value),
        NumberFormat::Fixed {
            decimal_places,
            thousands,
        } => {
            let text = fixed(value, *decimal_places);
            if *thousands {
                group_thousands(&text)
            } else {
                text
            }
        }
        NumberFormat::Percent { decimal_places } => {
            format!("{}%", fixed(value * 100.0, *decimal_places))
        }
        NumberFormat::Currency {
            symbol,
            decimal_places,
            suffix,
        } => {
            let amount = group_thousands(&fixed(value.abs(), *decimal_places));
            let sign = if value < 0.0 { "-" } else { "" };
            if *suffix {
                format!("{}{}{}", sign, amount, symbol)
            } else {
                format!("{}{}{}", sign, symbol, amount)
            }
        }
    }
}

fn general(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < GENERAL_MAX {
        return format!("{:.0}", value);
    }
    let text = format!("{:.*}", GENERAL_DECIMALS, value);
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        t => t.to_string(),
    }
}

fn fixed(value: f64, decimal_places: u8) -> String {
    format!("{:.*}", decimal_places as usize, value)
}

/// Inserts `,` every three digits of the integer part of a plain decimal.
fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let head = int_part.len() % 3;
    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3);
    grouped.push_str(sign);
    for (i, digit) in int_part.char_indices() {
        if i > 0 && (i + 3 - head) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
