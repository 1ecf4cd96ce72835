//! JSON rendering of [`Value`]s.
//!
//! Used by the command-line front end to print filtered containers. The
//! conversion never fails: values without a JSON counterpart are mapped to
//! the closest thing JSON has.
//!
//! - Bytes become arrays of numbers
//! - Records become objects keyed by field name
//! - Non-finite floats become `null`
//! - Opaque values become their type name
//!
//! # Examples
//!
//! ```
//! use bexpr::Value;
//! use bexpr::output::{to_json_pretty, to_json_string};
//!
//! let value = Value::from(serde_json::json!({"a": [1, 2]}));
//!
//! assert_eq!(to_json_string(&value), r#"{"a":[1,2]}"#);
//! assert_eq!(to_json_pretty(&value), "{\n  \"a\": [\n    1,\n    2\n  ]\n}");
//! ```

use serde_json::{Map, Number};

use crate::value::Value;

/// Converts a value into a `serde_json::Value`.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Uint(u) => serde_json::Value::Number((*u).into()),
        Value::Float32(f) => float(f64::from(*f)),
        Value::Float64(f) => float(*f),
        Value::Number(n) => serde_json::Value::Number(n.clone()),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Bytes(bytes) => {
            serde_json::Value::Array(bytes.iter().map(|b| serde_json::Value::from(*b)).collect())
        }
        Value::Sequence(seq) => serde_json::Value::Array(seq.iter().map(to_json).collect()),
        Value::Mapping(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Record(record) => serde_json::Value::Object(
            record
                .fields()
                .iter()
                .map(|field| (field.name().to_string(), to_json(field.value())))
                .collect::<Map<_, _>>(),
        ),
        Value::Opaque(type_name) => serde_json::Value::String(type_name.clone()),
    }
}

fn float(f: f64) -> serde_json::Value {
    Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Compact JSON text.
pub fn to_json_string(value: &Value) -> String {
    to_json(value).to_string()
}

/// JSON text with 2-space indentation.
pub fn to_json_pretty(value: &Value) -> String {
    format!("{:#}", to_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;

    #[test]
    fn test_non_finite_floats_are_null() {
        assert_eq!(to_json(&Value::Float64(f64::NAN)), serde_json::Value::Null);
        assert_eq!(to_json(&Value::Float32(f32::INFINITY)), serde_json::Value::Null);
    }

    #[test]
    fn test_bytes_and_records() {
        assert_eq!(to_json_string(&Value::Bytes(vec![1, 2])), "[1,2]");

        let record = Record::new("User")
            .field("Name", Value::from("ann"))
            .field("Raw", Value::Opaque("chan int".to_string()));
        assert_eq!(
            to_json_string(&Value::Record(record)),
            r#"{"Name":"ann","Raw":"chan int"}"#
        );
    }

    #[test]
    fn test_mapping_order_preserved() {
        let value = Value::from(serde_json::json!({"b": 1, "a": 2}));
        assert_eq!(to_json_string(&value), r#"{"b":1,"a":2}"#);
    }
}
