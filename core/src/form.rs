//! Typed form fields and `application/x-www-form-urlencoded` encoding.
//!
//! # Design
//! The adapted interface accepts a mapping for bodies and query strings.
//! Rather than sniffing value types at encoding time, the mapping is a sum
//! type: a field is a scalar (integer, text, or raw bytes) or a flat
//! sequence of scalars, and anything else is unrepresentable. Sequences
//! encode with the repeated-key convention (`k=v1&k=v2`). `from_json` is
//! the construction seam for untyped callers (the FFI layer hands payloads
//! over as JSON objects) and is where unsupported value kinds are
//! rejected.

use serde_json::Value;

use crate::error::RequestError;

/// Media type forced onto form-encoded bodies when the caller sets none.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A single encodable value: the only kinds the host interface accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Scalar {
    /// Byte view used by the encoder. Integers go through their decimal
    /// rendering, text through UTF-8, bytes as-is.
    fn to_bytes(&self) -> Vec<u8> {
        match self {
            Scalar::Int(n) => n.to_string().into_bytes(),
            Scalar::Text(s) => s.clone().into_bytes(),
            Scalar::Bytes(b) => b.clone(),
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<Vec<u8>> for Scalar {
    fn from(b: Vec<u8>) -> Self {
        Scalar::Bytes(b)
    }
}

/// One field value: a scalar, or a flat sequence encoded element-wise
/// under the same key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Scalar(Scalar),
    Sequence(Vec<Scalar>),
}

impl From<Scalar> for FormValue {
    fn from(s: Scalar) -> Self {
        FormValue::Scalar(s)
    }
}

impl From<i64> for FormValue {
    fn from(n: i64) -> Self {
        FormValue::Scalar(Scalar::Int(n))
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        FormValue::Scalar(Scalar::Text(s.to_string()))
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        FormValue::Scalar(Scalar::Text(s))
    }
}

impl From<Vec<Scalar>> for FormValue {
    fn from(seq: Vec<Scalar>) -> Self {
        FormValue::Sequence(seq)
    }
}

impl From<Vec<&str>> for FormValue {
    fn from(seq: Vec<&str>) -> Self {
        FormValue::Sequence(seq.into_iter().map(Scalar::from).collect())
    }
}

impl From<Vec<i64>> for FormValue {
    fn from(seq: Vec<i64>) -> Self {
        FormValue::Sequence(seq.into_iter().map(Scalar::from).collect())
    }
}

/// Ordered name/value pairs for form bodies and query strings.
///
/// Pairs encode in insertion order. Construction is the validation point:
/// once a `FormParams` exists, encoding cannot fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormParams {
    pairs: Vec<(String, FormValue)>,
}

impl FormParams {
    pub fn new() -> Self {
        FormParams::default()
    }

    /// Append one field, builder style.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[(String, FormValue)] {
        &self.pairs
    }

    /// Encode as an `application/x-www-form-urlencoded` string. Names and
    /// values are percent-escaped byte-wise (space becomes `+`), sequences
    /// repeat their key per element, and no pairs encodes to `""`.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.pairs {
            match value {
                FormValue::Scalar(scalar) => {
                    append_pair(&mut out, name.as_bytes(), &scalar.to_bytes());
                }
                FormValue::Sequence(seq) => {
                    for scalar in seq {
                        append_pair(&mut out, name.as_bytes(), &scalar.to_bytes());
                    }
                }
            }
        }
        out
    }

    /// Build from a JSON object.
    ///
    /// Strings and integer numbers become scalars, arrays of those become
    /// sequences. Floats, booleans, nulls, nested arrays, and nested
    /// objects have no form representation and are rejected with the
    /// offending key. Fields iterate in the JSON map's order, which with
    /// serde_json's default map type means sorted by key.
    pub fn from_json(value: &Value) -> Result<Self, RequestError> {
        let map = value.as_object().ok_or_else(|| RequestError::UnsupportedValue {
            key: String::new(),
            detail: format!("expected a JSON object, got {}", json_kind(value)),
        })?;
        let mut params = FormParams::new();
        for (key, field) in map {
            let value = match field {
                Value::Array(items) => {
                    let mut seq = Vec::with_capacity(items.len());
                    for item in items {
                        seq.push(scalar_from_json(key, item)?);
                    }
                    FormValue::Sequence(seq)
                }
                other => FormValue::Scalar(scalar_from_json(key, other)?),
            };
            params.pairs.push((key.clone(), value));
        }
        Ok(params)
    }
}

fn scalar_from_json(key: &str, value: &Value) -> Result<Scalar, RequestError> {
    match value {
        Value::String(s) => Ok(Scalar::Text(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Scalar::Int(i))
            } else if let Some(u) = n.as_u64() {
                // Integers past i64::MAX keep their decimal rendering.
                Ok(Scalar::Text(u.to_string()))
            } else {
                Err(RequestError::UnsupportedValue {
                    key: key.to_string(),
                    detail: format!("number {n} is not an integer"),
                })
            }
        }
        other => Err(RequestError::UnsupportedValue {
            key: key.to_string(),
            detail: format!(
                "{} is not encodable; values must be integers, strings, or flat arrays of those",
                json_kind(other)
            ),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn append_pair(out: &mut String, name: &[u8], value: &[u8]) {
    if !out.is_empty() {
        out.push('&');
    }
    out.extend(form_urlencoded::byte_serialize(name));
    out.push('=');
    out.extend(form_urlencoded::byte_serialize(value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encodes_scalar_pairs_in_insertion_order() {
        let params = FormParams::new().param("b", "two").param("a", 1i64);
        assert_eq!(params.encode(), "b=two&a=1");
    }

    #[test]
    fn encodes_sequences_with_repeated_keys() {
        let params = FormParams::new()
            .param("a", 1i64)
            .param("b", vec!["2", "3"]);
        assert_eq!(params.encode(), "a=1&b=2&b=3");
    }

    #[test]
    fn escapes_reserved_characters_and_spaces() {
        let params = FormParams::new().param("q", "a b&c=d");
        assert_eq!(params.encode(), "q=a+b%26c%3Dd");
    }

    #[test]
    fn escapes_names_too() {
        let params = FormParams::new().param("key name", "v");
        assert_eq!(params.encode(), "key+name=v");
    }

    #[test]
    fn escapes_utf8_text_per_byte() {
        let params = FormParams::new().param("name", "naïve");
        assert_eq!(params.encode(), "name=na%C3%AFve");
    }

    #[test]
    fn escapes_raw_bytes_that_are_not_utf8() {
        let params = FormParams::new().param("blob", Scalar::Bytes(vec![0xFF, 0x00, b'x']));
        assert_eq!(params.encode(), "blob=%FF%00x");
    }

    #[test]
    fn renders_integers_in_decimal() {
        let params = FormParams::new().param("n", -42i64);
        assert_eq!(params.encode(), "n=-42");
    }

    #[test]
    fn empty_params_encode_to_empty_string() {
        assert_eq!(FormParams::new().encode(), "");
        assert!(FormParams::new().is_empty());
    }

    #[test]
    fn from_json_accepts_integers_strings_and_flat_arrays() {
        let params = FormParams::from_json(&json!({
            "a": 1,
            "b": "two",
            "c": ["3", 4],
        }))
        .unwrap();
        assert_eq!(params.encode(), "a=1&b=two&c=3&c=4");
    }

    #[test]
    fn from_json_iterates_keys_in_sorted_order() {
        let params = FormParams::from_json(&json!({ "z": 1, "a": 2 })).unwrap();
        assert_eq!(params.encode(), "a=2&z=1");
    }

    #[test]
    fn from_json_accepts_integers_beyond_i64() {
        let params = FormParams::from_json(&json!({ "n": 18446744073709551615u64 })).unwrap();
        assert_eq!(params.encode(), "n=18446744073709551615");
    }

    #[test]
    fn from_json_rejects_floats() {
        let err = FormParams::from_json(&json!({ "x": 1.5 })).unwrap_err();
        assert!(matches!(err, RequestError::UnsupportedValue { key, .. } if key == "x"));
    }

    #[test]
    fn from_json_rejects_booleans_and_nulls() {
        assert!(FormParams::from_json(&json!({ "x": true })).is_err());
        assert!(FormParams::from_json(&json!({ "x": null })).is_err());
    }

    #[test]
    fn from_json_rejects_nested_structures() {
        assert!(FormParams::from_json(&json!({ "x": [[1]] })).is_err());
        assert!(FormParams::from_json(&json!({ "x": { "y": 1 } })).is_err());
    }

    #[test]
    fn from_json_rejects_non_objects() {
        let err = FormParams::from_json(&json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"));
    }

    #[test]
    fn from_json_accepts_empty_objects() {
        let params = FormParams::from_json(&json!({})).unwrap();
        assert!(params.is_empty());
        assert_eq!(params.encode(), "");
    }
}
