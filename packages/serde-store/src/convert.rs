//! Conversions between `Value`, serde types and `serde_json::Value`.
//!
//! Writing goes through [`ValueSerializer`] so values JSON cannot carry are
//! refused with `Encode` instead of being stored as something else.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Number, Value as JsonValue};

use flatstore_core_store::{Error, Value};

use crate::ser::ValueSerializer;

/// Convert a Value to a Rust type via serde.
///
/// A value that does not fit `T` is a `Validation` error: the stored shape
/// is not the one the caller expected.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_json::from_value(value_to_json(value)?).map_err(|e| Error::validation(e.to_string()))
}

/// Convert a Rust type to a Value via serde.
///
/// # Errors
///
/// `Encode` for NaN or infinite floats, integers outside `i64`, and maps
/// with non-scalar keys.
pub fn to_value<T: Serialize + ?Sized>(data: &T) -> Result<Value, Error> {
    data.serialize(ValueSerializer)
        .map_err(|e| Error::encode(e.to_string()))
}

/// Render a Value as JSON. Fails with `Encode` on a non-finite float.
pub fn value_to_json(value: Value) -> Result<JsonValue, Error> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(b),
        Value::Integer(i) => JsonValue::Number(i.into()),
        Value::Float(f) => JsonValue::Number(
            Number::from_f64(f)
                .ok_or_else(|| Error::encode(format!("{} cannot be stored as JSON", f)))?,
        ),
        Value::String(s) => JsonValue::String(s),
        Value::Array(items) => JsonValue::Array(
            items
                .into_iter()
                .map(value_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Value::Map(map) => JsonValue::Object(
            map.into_iter()
                .map(|(k, v)| Ok((k, value_to_json(v)?)))
                .collect::<Result<_, Error>>()?,
        ),
    })
}

/// Read JSON into a Value.
///
/// Integers keep their type; an integer above `i64::MAX` fails with `Encode`
/// rather than being widened to a float.
pub fn json_to_value(json: JsonValue) -> Result<Value, Error> {
    Ok(match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => match (n.as_i64(), n.is_u64(), n.as_f64()) {
            (Some(i), _, _) => Value::Integer(i),
            (None, true, _) => {
                return Err(Error::encode(format!(
                    "integer {} does not fit in a signed 64-bit integer",
                    n
                )))
            }
            (None, false, Some(f)) => Value::Float(f),
            (None, false, None) => {
                return Err(Error::encode(format!("unrepresentable number {}", n)))
            }
        },
        JsonValue::String(s) => Value::String(s),
        JsonValue::Array(items) => Value::Array(
            items
                .into_iter()
                .map(json_to_value)
                .collect::<Result<_, _>>()?,
        ),
        JsonValue::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| Ok((k, json_to_value(v)?)))
                .collect::<Result<_, Error>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Reminder {
        label: String,
        minutes: u32,
        channels: Vec<String>,
        snooze: Option<f64>,
    }

    fn reminder() -> Reminder {
        Reminder {
            label: "stand up".to_string(),
            minutes: 45,
            channels: vec!["dm".to_string()],
            snooze: None,
        }
    }

    #[test]
    fn struct_round_trip() {
        let value = to_value(&reminder()).unwrap();
        assert_eq!(value.get(&flatstore_core_store::path!("snooze")), Some(&Value::Null));
        let back: Reminder = from_value(value).unwrap();
        assert_eq!(back, reminder());
    }

    #[test]
    fn non_finite_float_is_encode_error() {
        let mut bad = reminder();
        bad.snooze = Some(f64::NAN);
        assert!(matches!(to_value(&bad), Err(Error::Encode { .. })));

        assert!(matches!(
            value_to_json(Value::Array(vec![Value::Float(f64::INFINITY)])),
            Err(Error::Encode { .. })
        ));
    }

    #[test]
    fn large_unsigned_is_encode_error() {
        assert!(matches!(to_value(&u64::MAX), Err(Error::Encode { .. })));
        assert!(matches!(
            json_to_value(serde_json::json!({"n": u64::MAX})),
            Err(Error::Encode { .. })
        ));
    }

    #[test]
    fn json_numbers_keep_their_kind() {
        let value = json_to_value(serde_json::json!({"i": -100, "f": 2.75, "w": 2.0})).unwrap();
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map.get("i"), Some(&Value::Integer(-100)));
        assert_eq!(map.get("f"), Some(&Value::Float(2.75)));
        assert_eq!(map.get("w"), Some(&Value::Float(2.0)));
    }

    #[test]
    fn shape_mismatch_is_validation_error() {
        let err = from_value::<Reminder>(Value::from("not a struct")).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
