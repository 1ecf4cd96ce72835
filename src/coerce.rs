//! Conversion of raw literal text into typed primitives.
//!
//! Literals are kept as text in the AST and only converted once the kind of
//! the value they are compared against is known. Each conversion reports
//! whether the text was malformed for the target kind ([`CoerceError::Syntax`])
//! or well-formed but out of range ([`CoerceError::Range`]).

use std::num::IntErrorKind;

use thiserror::Error;

use crate::value::{Kind, Value};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoerceError {
    #[error("cannot convert {raw:?} to {kind}: invalid syntax")]
    Syntax { raw: String, kind: Kind },

    #[error("cannot convert {raw:?} to {kind}: value out of range")]
    Range { raw: String, kind: Kind },
}

impl CoerceError {
    pub fn is_range(&self) -> bool {
        matches!(self, CoerceError::Range { .. })
    }

    pub fn kind(&self) -> Kind {
        match self {
            CoerceError::Syntax { kind, .. } | CoerceError::Range { kind, .. } => *kind,
        }
    }

    fn syntax(raw: &str, kind: Kind) -> Self {
        CoerceError::Syntax {
            raw: raw.to_string(),
            kind,
        }
    }

    fn range(raw: &str, kind: Kind) -> Self {
        CoerceError::Range {
            raw: raw.to_string(),
            kind,
        }
    }
}

/// Converts `raw` into a value of the given primitive kind.
pub fn coerce(raw: &str, kind: Kind) -> Result<Value, CoerceError> {
    match kind {
        Kind::Bool => coerce_bool(raw).map(Value::Bool),
        Kind::Int => coerce_int(raw).map(Value::Int),
        Kind::Uint => coerce_uint(raw).map(Value::Uint),
        Kind::Float32 => coerce_f32(raw).map(Value::Float32),
        Kind::Float64 => coerce_f64(raw).map(Value::Float64),
        Kind::String => Ok(Value::String(raw.to_string())),
        other => Err(CoerceError::syntax(raw, other)),
    }
}

pub fn coerce_bool(raw: &str) -> Result<bool, CoerceError> {
    match raw {
        "1" => return Ok(true),
        "0" => return Ok(false),
        _ => {}
    }
    if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("t") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") || raw.eq_ignore_ascii_case("f") {
        Ok(false)
    } else {
        Err(CoerceError::syntax(raw, Kind::Bool))
    }
}

/// Splits an integer literal into sign, radix and digits.
fn split_radix(raw: &str) -> Option<(bool, u32, &str)> {
    let (negative, rest) = match raw.as_bytes().first()? {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };

    let lower = rest.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits) = match lower.as_deref() {
        Some("0x") => (16, &rest[2..]),
        Some("0o") => (8, &rest[2..]),
        Some("0b") => (2, &rest[2..]),
        _ if rest.len() > 1 && rest.starts_with('0') => (8, &rest[1..]),
        _ => (10, rest),
    };

    // from_str_radix would accept a second sign here
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    Some((negative, radix, digits))
}

fn int_error(raw: &str, kind: Kind, err: std::num::ParseIntError) -> CoerceError {
    match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => CoerceError::range(raw, kind),
        _ => CoerceError::syntax(raw, kind),
    }
}

pub fn coerce_int(raw: &str) -> Result<i64, CoerceError> {
    let (negative, radix, digits) =
        split_radix(raw).ok_or_else(|| CoerceError::syntax(raw, Kind::Int))?;
    let signed = if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };
    i64::from_str_radix(&signed, radix).map_err(|e| int_error(raw, Kind::Int, e))
}

pub fn coerce_uint(raw: &str) -> Result<u64, CoerceError> {
    let (negative, radix, digits) =
        split_radix(raw).ok_or_else(|| CoerceError::syntax(raw, Kind::Uint))?;
    if negative {
        return Err(CoerceError::syntax(raw, Kind::Uint));
    }
    u64::from_str_radix(digits, radix).map_err(|e| int_error(raw, Kind::Uint, e))
}

fn names_infinity(raw: &str) -> bool {
    let unsigned = raw.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

pub fn coerce_f64(raw: &str) -> Result<f64, CoerceError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| CoerceError::syntax(raw, Kind::Float64))?;
    if value.is_infinite() && !names_infinity(raw) {
        return Err(CoerceError::range(raw, Kind::Float64));
    }
    Ok(value)
}

pub fn coerce_f32(raw: &str) -> Result<f32, CoerceError> {
    let value: f32 = raw
        .parse()
        .map_err(|_| CoerceError::syntax(raw, Kind::Float32))?;
    if value.is_infinite() && !names_infinity(raw) {
        return Err(CoerceError::range(raw, Kind::Float32));
    }
    Ok(value)
}
