//! Encoding of the flat table as a JSON object.
//!
//! The backing file is a single object mapping rendered paths to scalars:
//!
//! ```json
//! {
//!     "a.b.x": 1,
//!     "a.b.y.[-1]": 2,
//!     "a.b.y.[0]": 2,
//!     "a.b.y.[1]": 3
//! }
//! ```

use serde::Serialize;
use serde_json::value::Value as JsonValue;
use serde_json::{Map, Number};

use flatstore_core_store::{normalize, Error, Path, Record, Scalar};

/// Convert a scalar to its JSON form.
///
/// Non-finite floats have no JSON representation and fail with `Encode`.
pub fn scalar_to_json(path: &Path, scalar: &Scalar) -> Result<JsonValue, Error> {
    Ok(match scalar {
        Scalar::Null => JsonValue::Null,
        Scalar::Bool(b) => JsonValue::Bool(*b),
        Scalar::Integer(i) => JsonValue::Number((*i).into()),
        Scalar::Float(f) => JsonValue::Number(Number::from_f64(*f).ok_or_else(|| {
            Error::encode(format!("{} cannot be stored as JSON at {}", f, path))
        })?),
        Scalar::String(s) => JsonValue::String(s.clone()),
    })
}

/// Convert a JSON table entry back to a scalar.
pub fn json_to_scalar(key: &str, json: JsonValue) -> Result<Scalar, Error> {
    match json {
        JsonValue::Null => Ok(Scalar::Null),
        JsonValue::Bool(b) => Ok(Scalar::Bool(b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Scalar::Integer(i))
            } else if n.is_u64() {
                Err(Error::corrupt(format!(
                    "integer at '{}' does not fit in a signed 64-bit integer: {}",
                    key, n
                )))
            } else if let Some(f) = n.as_f64() {
                Ok(Scalar::Float(f))
            } else {
                Err(Error::corrupt(format!("unrepresentable number at '{}': {}", key, n)))
            }
        }
        JsonValue::String(s) => Ok(Scalar::String(s)),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(Error::corrupt(format!(
            "entry '{}' holds a container, only scalars are stored",
            key
        ))),
    }
}

/// Parse the table file contents into sorted records.
///
/// A zero-length (or all-whitespace) file is an empty table.
pub fn decode_table(bytes: &[u8]) -> Result<Vec<Record>, Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let object: Map<String, JsonValue> = serde_json::from_slice(bytes)
        .map_err(|e| Error::corrupt(format!("table is not a JSON object: {}", e)))?;

    let mut records = object
        .into_iter()
        .map(|(key, json)| {
            let path = Path::parse(&key)
                .map_err(|e| Error::corrupt(format!("bad path key '{}': {}", key, e)))?;
            let scalar = json_to_scalar(&key, json)?;
            Ok(Record::new(path, scalar))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    normalize(&mut records);
    Ok(records)
}

/// Serialize records as the table file contents.
///
/// Keys come out sorted. `indent` is the number of spaces per level; zero
/// writes the compact form.
pub fn encode_table(records: &[Record], indent: usize) -> Result<Vec<u8>, Error> {
    let mut object = Map::new();
    for record in records {
        object.insert(
            record.path.to_string(),
            scalar_to_json(&record.path, &record.scalar)?,
        );
    }

    if indent == 0 {
        return serde_json::to_vec(&object).map_err(|e| Error::encode(e.to_string()));
    }

    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    object
        .serialize(&mut serializer)
        .map_err(|e| Error::encode(e.to_string()))?;
    Ok(out)
}
