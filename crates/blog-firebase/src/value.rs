//! Conversion between Firestore's typed `Value` JSON and plain JSON.
//!
//! Firestore wraps every field in a single-key object naming its type, e.g.
//! `{"stringValue": "hi"}` or `{"integerValue": "42"}` (64-bit integers travel
//! as strings). Plain JSON is what serde models deserialize from.

use serde_json::{json, Map, Number, Value};

use crate::error::{decode_error, FirebaseError};

pub fn decode_fields(fields: &Map<String, Value>) -> Result<Value, FirebaseError> {
    let mut out = Map::with_capacity(fields.len());
    for (name, value) in fields {
        let decoded = decode_value(value)
            .map_err(|e| decode_error(format!("field {name:?}: {e}")))?;
        out.insert(name.clone(), decoded);
    }
    Ok(Value::Object(out))
}

pub fn decode_value(value: &Value) -> Result<Value, FirebaseError> {
    let object = value
        .as_object()
        .ok_or_else(|| decode_error(format!("expected typed value object, got {value}")))?;
    let (kind, inner) = match (object.len(), object.iter().next()) {
        (1, Some(entry)) => entry,
        _ => return Err(decode_error(format!("expected exactly one value type in {value}"))),
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| decode_error(format!("bad booleanValue {inner}"))),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(|n| Value::Number(n.into()))
                .ok_or_else(|| decode_error(format!("bad integerValue {inner}")))
        }
        "doubleValue" => {
            // NaN and the infinities arrive as strings and have no JSON form.
            let number = inner.as_f64().and_then(Number::from_f64);
            Ok(number.map(Value::Number).unwrap_or(Value::Null))
        }
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| decode_error(format!("bad {kind} {inner}"))),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()?,
                Some(other) => return Err(decode_error(format!("bad arrayValue {other}"))),
                None => Vec::new(),
            };
            Ok(Value::Array(values))
        }
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => decode_fields(fields),
            Some(other) => Err(decode_error(format!("bad mapValue {other}"))),
            None => Ok(Value::Object(Map::new())),
        },
        other => Err(decode_error(format!("unsupported value type {other}"))),
    }
}

pub fn encode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

/// Encodes plain JSON. Strings always become `stringValue`; use
/// [`timestamp_value`] for timestamps.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => {
            let values: Vec<Value> = values.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

pub fn timestamp_value(rfc3339: &str) -> Value {
    json!({ "timestampValue": rfc3339 })
}
