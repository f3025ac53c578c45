//! Number grammar shared by the coercers.
//!
//! Untyped input arrives as text far more often than as a number, so the
//! integer and boolean coercers both need to answer the same two questions:
//! "what number does this text start with?" and "is this whole text a number?".
//! Both follow the conventions of web form input: optional sign, decimal digits
//! with an optional fraction and exponent, and the literal `Infinity`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Largest integer that survives a round trip through an IEEE-754 double.
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

/// Smallest integer that survives a round trip through an IEEE-754 double.
pub const MIN_SAFE_INTEGER: i64 = -MAX_SAFE_INTEGER;

static NUMBER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|[0-9]+(?:\.[0-9]*)?(?:[eE][+-]?[0-9]+)?|\.[0-9]+(?:[eE][+-]?[0-9]+)?)")
        .expect("number prefix pattern is valid")
});

static DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("decimal pattern is valid")
});

static RADIX_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^0(?:[xX][0-9a-fA-F]+|[bB][01]+|[oO][0-7]+)$").expect("radix pattern is valid")
});

/// Parses the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// Returns `NaN` when the text does not start with a number. `"12px"` parses
/// as `12.0`, `"-Infinity"` as negative infinity and `"abc"` as `NaN`.
pub fn parse_number_prefix(text: &str) -> f64 {
    let text = text.trim_start();
    let Some(found) = NUMBER_PREFIX.find(text) else {
        return f64::NAN;
    };
    let literal = found.as_str();
    match literal.trim_start_matches(['+', '-']) {
        "Infinity" if literal.starts_with('-') => f64::NEG_INFINITY,
        "Infinity" => f64::INFINITY,
        _ => literal.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Returns `true` if the whole of `text` is a plain decimal number.
///
/// Used by strict integer parsing: no surrounding whitespace, no trailing
/// garbage and no `Infinity`.
pub fn is_decimal(text: &str) -> bool {
    DECIMAL.is_match(text)
}

/// Returns `true` if `text` as a whole converts to a number.
///
/// Blank text counts as numeric (it converts to zero), as do signed
/// `Infinity` and `0x`/`0b`/`0o` literals. This is the inverse of the
/// "not a number" test the boolean coercer applies to unmatched strings.
pub fn is_numeric_text(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || DECIMAL.is_match(text) || RADIX_LITERAL.is_match(text) {
        return true;
    }
    matches!(text.trim_start_matches(['+', '-']), "Infinity") && text.len() <= "+Infinity".len()
}

/// Returns `true` if structured JSON text converts to a number.
///
/// An array converts through its comma-joined elements, so `[]` and `[5]`
/// are numeric while `[1,2]` and `["a"]` are not. Objects never are.
pub fn is_numeric_structure(text: &str) -> bool {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Array(_)) => is_numeric_text(&form_text(&value)),
        _ => false,
    }
}

/// Renders a JSON value the way a form field would show it.
fn form_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(form_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Rounds half away from zero and clamps into the safe integer range.
///
/// The caller must have handled `NaN` and the infinities already.
pub fn to_safe_integer(value: f64) -> i64 {
    let rounded = value.round();
    if rounded >= MAX_SAFE_INTEGER as f64 {
        MAX_SAFE_INTEGER
    } else if rounded <= MIN_SAFE_INTEGER as f64 {
        MIN_SAFE_INTEGER
    } else {
        rounded as i64
    }
}

/// Formats a number the way form input echoes it back: integral values
/// without a fraction, `NaN` and `Infinity` spelled out.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value == 0.0 {
        // -0 prints as 0
        "0".to_string()
    } else {
        value.to_string()
    }
}
