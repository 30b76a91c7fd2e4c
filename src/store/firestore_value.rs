//! Conversion between plain JSON and Firestore's typed value encoding.
//!
//! Firestore documents carry every value wrapped in a single-member object
//! naming its type, e.g. `{"stringValue": "Dune"}` or
//! `{"mapValue": {"fields": {...}}}`. Integers travel as decimal strings.

use serde_json::{Map, Value, json};

/// Wrap a JSON value in Firestore's typed encoding.
pub fn to_firestore_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) if n.is_f64() => json!({ "doubleValue": n.as_f64() }),
        // Integers keep every digit, including those past i64::MAX.
        Value::Number(n) => json!({ "integerValue": n.to_string() }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(to_firestore_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": to_firestore_fields(map) } }),
    }
}

/// Encode every member of a JSON object, as used for a document's `fields`.
pub fn to_firestore_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (k.clone(), to_firestore_value(v)))
        .collect()
}

/// Unwrap a Firestore typed value back into plain JSON.
pub fn from_firestore_value(value: &Value) -> Result<Value, String> {
    let Some((kind, inner)) = value.as_object().and_then(|m| m.iter().next()) else {
        return Err(format!("Not a typed value: {}", value));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| format!("Invalid booleanValue: {}", inner)),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s
                    .parse::<i64>()
                    .map(Value::from)
                    .or_else(|_| s.parse::<u64>().map(Value::from))
                    .ok(),
                Value::Number(n) if !n.is_f64() => Some(inner.clone()),
                _ => None,
            };
            parsed.ok_or_else(|| format!("Invalid integerValue: {}", inner))
        }
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            // "NaN" and "Infinity" have no JSON representation.
            Value::String(_) => Ok(Value::Null),
            other => Err(format!("Invalid doubleValue: {}", other)),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => Ok(inner.clone()),
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values,
                // An empty array is sent as `{"arrayValue": {}}`.
                _ => return Ok(Value::Array(Vec::new())),
            };
            values
                .iter()
                .map(from_firestore_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => from_firestore_fields(fields).map(Value::Object),
            _ => Ok(Value::Object(Map::new())),
        },
        other => Err(format!("Unsupported value type '{}'", other)),
    }
}

/// Decode a document's `fields` object.
pub fn from_firestore_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, String> {
    fields
        .iter()
        .map(|(k, v)| from_firestore_value(v).map(|decoded| (k.clone(), decoded)))
        .collect()
}

/// Quote a single map key as a field path segment for `updateMask`.
///
/// Book ids may start with digits or contain `-`, which plain field paths
/// reject, so every key is back-quoted.
pub fn quote_field_path(key: &str) -> String {
    let escaped = key.replace('\\', "\\\\").replace('`', "\\`");
    format!("`{}`", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_encoding() {
        assert_eq!(to_firestore_value(&json!("Dune")), json!({"stringValue": "Dune"}));
        assert_eq!(to_firestore_value(&json!(412)), json!({"integerValue": "412"}));
        assert_eq!(to_firestore_value(&json!(4.5)), json!({"doubleValue": 4.5}));
        assert_eq!(to_firestore_value(&json!(false)), json!({"booleanValue": false}));
        assert_eq!(to_firestore_value(&Value::Null), json!({"nullValue": null}));
    }

    #[test]
    fn test_nested_tree_survives() {
        let original = json!({
            "id": "abc-1",
            "volumeInfo": {
                "title": "Dune",
                "authors": ["Frank Herbert"],
                "pageCount": 412,
                "averageRating": 4.5,
                "industryIdentifiers": [],
                "imageLinks": { "thumbnail": "http://books.example/t.jpg" }
            },
            "saleInfo": { "isEbook": false, "buyLink": null }
        });
        let encoded = to_firestore_value(&original);
        assert_eq!(
            encoded["mapValue"]["fields"]["volumeInfo"]["mapValue"]["fields"]["authors"],
            json!({"arrayValue": {"values": [{"stringValue": "Frank Herbert"}]}})
        );
        assert_eq!(from_firestore_value(&encoded).unwrap(), original);
    }

    #[test]
    fn test_large_unsigned_keeps_precision() {
        let big = json!(u64::MAX);
        let encoded = to_firestore_value(&big);
        assert_eq!(encoded, json!({"integerValue": "18446744073709551615"}));
        assert_eq!(from_firestore_value(&encoded).unwrap(), big);
        assert_eq!(
            from_firestore_value(&to_firestore_value(&json!(-7))).unwrap(),
            json!(-7)
        );
    }

    #[test]
    fn test_decodes_server_shapes() {
        assert_eq!(from_firestore_value(&json!({"arrayValue": {}})).unwrap(), json!([]));
        assert_eq!(from_firestore_value(&json!({"mapValue": {}})).unwrap(), json!({}));
        assert_eq!(from_firestore_value(&json!({"integerValue": 7})).unwrap(), json!(7));
        assert_eq!(from_firestore_value(&json!({"doubleValue": "NaN"})).unwrap(), Value::Null);
        assert_eq!(
            from_firestore_value(&json!({"timestampValue": "2024-01-01T00:00:00Z"})).unwrap(),
            json!("2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_rejects_untyped_values() {
        assert!(from_firestore_value(&json!("bare")).is_err());
        assert!(from_firestore_value(&json!({"mysteryValue": 1})).is_err());
        assert!(from_firestore_value(&json!({"integerValue": "twelve"})).is_err());
    }

    #[test]
    fn test_quote_field_path() {
        assert_eq!(quote_field_path("zyTCAlFPjgYC"), "`zyTCAlFPjgYC`");
        assert_eq!(quote_field_path("9-a"), "`9-a`");
        assert_eq!(quote_field_path("we`ird\\"), "`we\\`ird\\\\`");
    }
}
