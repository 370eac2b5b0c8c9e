//! Structured records with a declared shape.
//!
//! A [`Model`] is a serde type whose stored form is a map with a fixed set
//! of fields. Its identity field (by default `uuid`) is never stored: it is
//! the last segment of the path the record lives at.

use serde::de::DeserializeOwned;
use serde::Serialize;

use flatstore_core_store::{Error, Path, PathError, Segment, Value};

use crate::convert::{from_value, to_value};

/// The kind of value a field must hold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldKind {
    String,
    Integer,
    /// Integer or float.
    Number,
    Bool,
    /// Array whose every element has the inner kind.
    Array(&'static FieldKind),
    /// Null or the inner kind.
    Nullable(&'static FieldKind),
    /// Any one of the listed kinds.
    OneOf(&'static [FieldKind]),
}

impl FieldKind {
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldKind::String, Value::String(_)) => true,
            (FieldKind::Integer, Value::Integer(_)) => true,
            (FieldKind::Number, Value::Integer(_) | Value::Float(_)) => true,
            (FieldKind::Bool, Value::Bool(_)) => true,
            (FieldKind::Array(inner), Value::Array(items)) => {
                items.iter().all(|item| inner.matches(item))
            }
            (FieldKind::Nullable(_), Value::Null) => true,
            (FieldKind::Nullable(inner), other) => inner.matches(other),
            (FieldKind::OneOf(kinds), other) => kinds.iter().any(|kind| kind.matches(other)),
            _ => false,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FieldKind::String => "string".to_string(),
            FieldKind::Integer => "integer".to_string(),
            FieldKind::Number => "number".to_string(),
            FieldKind::Bool => "bool".to_string(),
            FieldKind::Array(inner) => format!("array of {}", inner.describe()),
            FieldKind::Nullable(inner) => format!("{} or null", inner.describe()),
            FieldKind::OneOf(kinds) => kinds
                .iter()
                .map(FieldKind::describe)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }
}

/// One declared field of a model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Field { name, kind }
    }
}

/// Check that `value` is a map holding exactly `fields`, each of the
/// declared kind.
pub fn check_shape(model: &str, fields: &[Field], value: &Value) -> Result<(), Error> {
    let Value::Map(map) = value else {
        return Err(Error::validation(format!(
            "{} must be a map, got {}",
            model,
            value.kind()
        )));
    };

    for field in fields {
        match map.get(field.name) {
            None => {
                return Err(Error::validation(format!(
                    "{} is missing field `{}`",
                    model, field.name
                )))
            }
            Some(found) if !field.kind.matches(found) => {
                return Err(Error::validation(format!(
                    "{} field `{}` should be {}, got {}",
                    model,
                    field.name,
                    field.kind.describe(),
                    found.kind()
                )))
            }
            Some(_) => {}
        }
    }

    if let Some(extra) = map
        .keys()
        .find(|key| !fields.iter().any(|field| field.name == key.as_str()))
    {
        return Err(Error::validation(format!(
            "{} has unexpected field `{}`",
            model, extra
        )));
    }

    Ok(())
}

/// A structured record stored through
/// [`Document::set_model`](crate::Document::set_model).
pub trait Model: Serialize + DeserializeOwned {
    /// Type name used in validation messages.
    const NAME: &'static str;

    /// Top-level key the records of this type are stored under.
    const COLLECTION: &'static str;

    /// Field holding the record's identity. It is stripped before writing.
    const IDENTITY: &'static str = "uuid";

    /// Every stored field, identity excluded.
    const FIELDS: &'static [Field];

    fn identity(&self) -> &str;

    fn set_identity(&mut self, identity: String);

    /// Value-level checks beyond the shape (ranges, lengths).
    fn validate(&self) -> Result<(), Error> {
        Ok(())
    }

    /// `<COLLECTION>.<identity>`.
    fn storage_path(&self) -> Result<Path, Error> {
        Ok(Path::from_segments(vec![
            Segment::key(Self::COLLECTION)?,
            Segment::key(self.identity())?,
        ]))
    }
}

/// Serialize a model into the value that gets stored.
pub fn to_record_value<M: Model>(model: &M) -> Result<Value, Error> {
    model.validate()?;

    let mut value = to_value(model)?;
    if let Value::Map(map) = &mut value {
        map.remove(M::IDENTITY);
    }

    check_shape(M::NAME, M::FIELDS, &value)?;
    Ok(value)
}

/// Rebuild a model from its stored value and identity.
pub fn from_record_value<M: Model>(identity: String, mut value: Value) -> Result<M, Error> {
    if let Value::Map(map) = &mut value {
        map.remove(M::IDENTITY);
    }
    check_shape(M::NAME, M::FIELDS, &value)?;

    let mut model: M = from_value(value)?;
    model.set_identity(identity);
    model.validate()?;
    Ok(model)
}

/// The identity a model stored at `path` has: its last key segment.
pub fn identity_of(path: &Path) -> Result<String, Error> {
    match path.last() {
        Some(Segment::Key(key)) => Ok(key.clone()),
        _ => Err(Error::from(PathError::InvalidPath {
            message: format!("a model path must end in a key, got '{}'", path),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatstore_core_store::path;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(skip)]
        uuid: String,
        text: String,
        pinned: bool,
        tags: Vec<String>,
        weight: Option<f64>,
    }

    impl Model for Note {
        const NAME: &'static str = "Note";
        const COLLECTION: &'static str = "notes";
        const FIELDS: &'static [Field] = &[
            Field::new("text", FieldKind::String),
            Field::new("pinned", FieldKind::Bool),
            Field::new("tags", FieldKind::Array(&FieldKind::String)),
            Field::new("weight", FieldKind::Nullable(&FieldKind::Number)),
        ];

        fn identity(&self) -> &str {
            &self.uuid
        }

        fn set_identity(&mut self, identity: String) {
            self.uuid = identity;
        }

        fn validate(&self) -> Result<(), Error> {
            if self.text.is_empty() {
                return Err(Error::validation("Note text must not be empty"));
            }
            Ok(())
        }
    }

    fn note() -> Note {
        Note {
            uuid: "n1".to_string(),
            text: "hello".to_string(),
            pinned: false,
            tags: vec![],
            weight: None,
        }
    }

    #[test]
    fn identity_is_not_stored() {
        let value = to_record_value(&note()).unwrap();
        let Value::Map(map) = &value else {
            panic!("expected map");
        };
        assert!(!map.contains_key("uuid"));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn record_value_round_trip() {
        let value = to_record_value(&note()).unwrap();
        let back: Note = from_record_value("n1".to_string(), value).unwrap();
        assert_eq!(back, note());
    }

    #[test]
    fn validate_runs_before_write() {
        let mut bad = note();
        bad.text.clear();
        assert!(matches!(
            to_record_value(&bad),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn missing_and_extra_fields_rejected() {
        let missing: Value = [("text", Value::from("x"))].into_iter().collect();
        let err = check_shape("Note", Note::FIELDS, &missing).unwrap_err();
        assert!(err.to_string().contains("missing field `pinned`"));

        let mut extra = to_record_value(&note()).unwrap();
        if let Value::Map(map) = &mut extra {
            map.insert("colour".to_string(), Value::from("red"));
        }
        let err = check_shape("Note", Note::FIELDS, &extra).unwrap_err();
        assert!(err.to_string().contains("unexpected field `colour`"));
    }

    #[test]
    fn wrong_kind_rejected() {
        let mut value = to_record_value(&note()).unwrap();
        if let Value::Map(map) = &mut value {
            map.insert("tags".to_string(), Value::from(vec![1i64]));
        }
        let err = check_shape("Note", Note::FIELDS, &value).unwrap_err();
        assert!(err
            .to_string()
            .contains("field `tags` should be array of string, got array"));
    }

    #[test]
    fn non_map_rejected() {
        let err = check_shape("Note", Note::FIELDS, &Value::from(3i64)).unwrap_err();
        assert!(err.to_string().contains("must be a map"));
    }

    #[test]
    fn field_kinds() {
        let due = FieldKind::Nullable(&FieldKind::OneOf(&[FieldKind::String, FieldKind::Number]));
        assert!(due.matches(&Value::Null));
        assert!(due.matches(&Value::from("RRULE")));
        assert!(due.matches(&Value::from(1.5)));
        assert!(!due.matches(&Value::from(true)));
        assert_eq!(due.describe(), "string or number or null");
    }

    #[test]
    fn storage_path_and_identity() {
        assert_eq!(note().storage_path().unwrap(), path!("notes.n1"));
        assert_eq!(identity_of(&path!("notes.n1")).unwrap(), "n1");
        assert!(identity_of(&path!("notes.[0]")).is_err());
        assert!(identity_of(&Path::root()).is_err());
    }
}
