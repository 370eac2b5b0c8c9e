//! The flat path codec.
//!
//! `flatten` turns a `Value` tree into (path, scalar) records and
//! `reconstruct` turns records back into the tree. Arrays carry an extra
//! record at `<array>.[-1]` holding their length, so an empty array is still
//! visible in the table.
//!
//! ```text
//! a.b = {"x": 1, "y": [2, 3]}
//!
//! a.b.x      = 1
//! a.b.y.[-1] = 2
//! a.b.y.[0]  = 2
//! a.b.y.[1]  = 3
//! ```

use std::collections::BTreeMap;

use crate::path::MAX_ARRAY_LEN;
use crate::{Error, Path, PathError, Record, Scalar, Segment, Value};

/// Flatten `value`, rooted at `parent`, into records.
///
/// Every map key becomes a key segment; keys containing `.`, `[` or `]`, or
/// empty keys, are rejected. A scalar cannot be stored at the root path.
pub fn flatten(parent: &Path, value: &Value) -> Result<Vec<Record>, Error> {
    if parent.is_empty() && value.as_scalar().is_some() {
        return Err(Error::from(PathError::InvalidPath {
            message: format!("cannot store a scalar ({}) at the root path", value.kind()),
        }));
    }

    let mut records = Vec::new();
    flatten_into(parent, value, &mut records)?;
    Ok(records)
}

fn flatten_into(parent: &Path, value: &Value, out: &mut Vec<Record>) -> Result<(), Error> {
    match value {
        Value::Map(map) => {
            for (key, child) in map {
                let segment = Segment::key_at(key.as_str(), parent.len())?;
                flatten_into(&parent.child(segment), child, out)?;
            }
        }
        Value::Array(items) => {
            if items.len() > MAX_ARRAY_LEN {
                return Err(Error::from(PathError::InvalidPath {
                    message: format!(
                        "array at {} has {} elements, more than {}",
                        parent,
                        items.len(),
                        MAX_ARRAY_LEN
                    ),
                }));
            }
            out.push(Record::new(
                parent.child(Segment::Length),
                Scalar::Integer(items.len() as i64),
            ));
            for (i, item) in items.iter().enumerate() {
                flatten_into(&parent.child(Segment::Index(i)), item, out)?;
            }
        }
        Value::Null => out.push(Record::new(parent.clone(), Scalar::Null)),
        Value::Bool(b) => out.push(Record::new(parent.clone(), Scalar::Bool(*b))),
        Value::Integer(i) => out.push(Record::new(parent.clone(), Scalar::Integer(*i))),
        Value::Float(f) => out.push(Record::new(parent.clone(), Scalar::Float(*f))),
        Value::String(s) => out.push(Record::new(parent.clone(), Scalar::String(s.clone()))),
    }
    Ok(())
}

type Entry<'a> = (&'a [Segment], &'a Scalar);

/// Rebuild the value stored under `parent`.
///
/// Records that are not under `parent` are ignored, so the whole table can
/// be passed in. Returns `Ok(None)` when nothing is stored under `parent`.
///
/// # Errors
///
/// `AmbiguousContainer` when one container has both array-shaped
/// (`[n]`, `[-1]`) and key-shaped children.
pub fn reconstruct(parent: &Path, records: &[Record]) -> Result<Option<Value>, Error> {
    let entries: Vec<Entry<'_>> = records
        .iter()
        .filter(|record| record.path.has_prefix(parent))
        .map(|record| (&record.path.segments()[parent.len()..], &record.scalar))
        .collect();

    if entries.is_empty() {
        return Ok(None);
    }

    build(parent, &entries).map(Some)
}

fn build(at: &Path, entries: &[Entry<'_>]) -> Result<Value, Error> {
    // A path is either a leaf or a container, never both.
    if let Some((_, scalar)) = entries.iter().find(|(rest, _)| rest.is_empty()) {
        return Ok(Value::from((*scalar).clone()));
    }

    let mut groups: BTreeMap<&Segment, Vec<Entry<'_>>> = BTreeMap::new();
    for (rest, scalar) in entries {
        groups.entry(&rest[0]).or_default().push((&rest[1..], *scalar));
    }

    let array_shaped = groups.keys().any(|segment| segment.is_array_segment());
    let map_shaped = groups
        .keys()
        .any(|segment| matches!(segment, Segment::Key(_)));

    if array_shaped && map_shaped {
        return Err(Error::AmbiguousContainer { path: at.clone() });
    }

    if array_shaped {
        return build_array(at, &groups);
    }

    let mut map = BTreeMap::new();
    for (segment, children) in &groups {
        if let Segment::Key(key) = segment {
            let child = build(&at.child((*segment).clone()), children)?;
            map.insert(key.clone(), child);
        }
    }
    Ok(Value::Map(map))
}

fn build_array(at: &Path, groups: &BTreeMap<&Segment, Vec<Entry<'_>>>) -> Result<Value, Error> {
    if let Some(sentinel) = groups.get(&Segment::Length) {
        // Zero length wins over any element records still lying around.
        if build(&at.child(Segment::Length), sentinel)? == Value::Integer(0) {
            return Ok(Value::array());
        }
    }

    let mut items: Vec<Value> = Vec::new();
    let mut any = false;
    for (segment, children) in groups {
        if let Segment::Index(i) = segment {
            let i = *i;
            let len = i
                .checked_add(1)
                .filter(|len| *len <= MAX_ARRAY_LEN)
                .ok_or_else(|| {
                    Error::corrupt(format!(
                        "array index {} at {} is not below {}",
                        i, at, MAX_ARRAY_LEN
                    ))
                })?;
            let item = build(&at.child(Segment::Index(i)), children)?;
            if len > items.len() {
                items.resize(len, Value::Null);
            }
            items[i] = item;
            any = true;
        }
    }

    Ok(if any { Value::Array(items) } else { Value::Null })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    fn map(entries: Vec<(&str, Value)>) -> Value {
        entries.into_iter().collect()
    }

    fn round_trip(at: &Path, value: Value) {
        let records = flatten(at, &value).unwrap();
        assert_eq!(reconstruct(at, &records).unwrap(), Some(value));
    }

    #[test]
    fn flatten_nested_value() {
        let value = map(vec![
            ("x", Value::from(1i64)),
            ("y", Value::from(vec![2i64, 3])),
        ]);
        let mut records = flatten(&path!("a.b"), &value).unwrap();
        records.sort_by(|a, b| a.path.cmp(&b.path));

        let rendered: Vec<String> = records.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["a.b.x=1", "a.b.y.[-1]=2", "a.b.y.[0]=2", "a.b.y.[1]=3"]
        );
    }

    #[test]
    fn empty_array_is_a_single_sentinel() {
        let records = flatten(&path!("n"), &Value::array()).unwrap();
        assert_eq!(records, vec![Record::new(path!("n.[-1]"), 0i64)]);
        assert_eq!(
            reconstruct(&path!("n"), &records).unwrap(),
            Some(Value::array())
        );
    }

    #[test]
    fn scalar_flattens_to_itself() {
        let records = flatten(&path!("lists.1.utc_offset"), &Value::from(8.0)).unwrap();
        assert_eq!(records, vec![Record::new(path!("lists.1.utc_offset"), 8.0)]);

        let records = flatten(&path!("x"), &Value::Null).unwrap();
        assert_eq!(records, vec![Record::new(path!("x"), Scalar::Null)]);
    }

    #[test]
    fn round_trips() {
        round_trip(&path!("s"), Value::from("hello"));
        round_trip(&path!("n"), Value::Null);
        round_trip(&path!("f"), Value::from(-0.25));
        round_trip(&path!("empty"), Value::array());
        round_trip(
            &path!("nested.arrays"),
            Value::Array(vec![
                Value::array(),
                Value::from(vec![1i64]),
                Value::Array(vec![Value::from(vec!["a", "b"]), Value::Null]),
            ]),
        );
        round_trip(
            &path!("lists.123"),
            map(vec![
                ("created_at", Value::from(1_700_000_000_000.0)),
                ("created_by", Value::from("42")),
                ("guild_id", Value::Null),
                ("notes", Value::from(vec!["buy milk", "call mom"])),
                ("utc_offset", Value::from(8.0)),
                (
                    "tasks",
                    Value::Array(vec![
                        map(vec![("done", Value::from(true)), ("tags", Value::array())]),
                        map(vec![("done", Value::from(false))]),
                    ]),
                ),
            ]),
        );
    }

    #[test]
    fn round_trips_at_root() {
        round_trip(
            &Path::root(),
            map(vec![("a", Value::from(1i64)), ("b", Value::from(vec![true]))]),
        );
        round_trip(&Path::root(), Value::from(vec![1i64, 2]));
    }

    #[test]
    fn scalar_at_root_rejected() {
        let err = flatten(&Path::root(), &Value::from(1i64)).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
    }

    #[test]
    fn keys_with_separators_rejected() {
        let value = map(vec![("due.date", Value::from(1i64))]);
        let err = flatten(&path!("tasks"), &value).unwrap_err();
        assert!(err.to_string().contains("due.date"));

        let value = map(vec![("[0]", Value::from(1i64))]);
        assert!(flatten(&path!("tasks"), &value).is_err());
    }

    #[test]
    fn empty_map_writes_nothing() {
        let records = flatten(&path!("profile"), &Value::map()).unwrap();
        assert!(records.is_empty());
        assert_eq!(reconstruct(&path!("profile"), &records).unwrap(), None);
    }

    #[test]
    fn reconstruct_ignores_unrelated_and_sibling_prefix_records() {
        let records = vec![
            Record::new(path!("a.b.x"), 1i64),
            Record::new(path!("a.bc.x"), 2i64),
            Record::new(path!("z"), 3i64),
        ];
        assert_eq!(
            reconstruct(&path!("a.b"), &records).unwrap(),
            Some(map(vec![("x", Value::from(1i64))]))
        );
        assert_eq!(reconstruct(&path!("q"), &records).unwrap(), None);
    }

    #[test]
    fn reconstruct_indices_out_of_order() {
        let records = vec![
            Record::new(path!("l.[2]"), "c"),
            Record::new(path!("l.[0]"), "a"),
            Record::new(path!("l.[-1]"), 3i64),
            Record::new(path!("l.[1]"), "b"),
        ];
        assert_eq!(
            reconstruct(&path!("l"), &records).unwrap(),
            Some(Value::from(vec!["a", "b", "c"]))
        );
    }

    #[test]
    fn reconstruct_index_ordering_past_ten() {
        let value = Value::from((0..12i64).collect::<Vec<_>>());
        round_trip(&path!("big"), value);
    }

    #[test]
    fn zero_sentinel_short_circuits_stale_elements() {
        let records = vec![
            Record::new(path!("l.[-1]"), 0i64),
            Record::new(path!("l.[0]"), "stale"),
        ];
        assert_eq!(
            reconstruct(&path!("l"), &records).unwrap(),
            Some(Value::array())
        );
    }

    #[test]
    fn nonzero_sentinel_is_informational() {
        // Left behind by writing a shorter array over a longer one.
        let records = vec![
            Record::new(path!("l.[-1]"), 1i64),
            Record::new(path!("l.[0]"), "new"),
            Record::new(path!("l.[1]"), "old"),
        ];
        assert_eq!(
            reconstruct(&path!("l"), &records).unwrap(),
            Some(Value::from(vec!["new", "old"]))
        );
    }

    #[test]
    fn missing_indices_fill_with_null() {
        let records = vec![Record::new(path!("l.[2]"), 7i64)];
        assert_eq!(
            reconstruct(&path!("l"), &records).unwrap(),
            Some(Value::Array(vec![Value::Null, Value::Null, Value::from(7i64)]))
        );
    }

    #[test]
    fn out_of_range_index_is_corrupt() {
        let huge = Path::from_segments(vec![
            Segment::key("l").unwrap(),
            Segment::Index(usize::MAX),
        ]);
        let records = vec![Record::new(huge, 1i64)];
        assert!(matches!(
            reconstruct(&path!("l"), &records),
            Err(Error::Corrupt { .. })
        ));

        let large = Path::from_segments(vec![
            Segment::key("l").unwrap(),
            Segment::Index(MAX_ARRAY_LEN),
        ]);
        let records = vec![
            Record::new(path!("l.[0]"), 1i64),
            Record::new(large, 2i64),
        ];
        assert!(matches!(
            reconstruct(&path!("l"), &records),
            Err(Error::Corrupt { .. })
        ));
    }

    #[test]
    fn sentinel_without_elements_is_null() {
        let records = vec![Record::new(path!("l.[-1]"), 2i64)];
        assert_eq!(reconstruct(&path!("l"), &records).unwrap(), Some(Value::Null));
    }

    #[test]
    fn scalar_wins_over_children() {
        let records = vec![
            Record::new(path!("a"), 1i64),
            Record::new(path!("a.b"), 2i64),
        ];
        assert_eq!(
            reconstruct(&path!("a"), &records).unwrap(),
            Some(Value::from(1i64))
        );
    }

    #[test]
    fn conflicting_children_are_ambiguous() {
        let records = vec![
            Record::new(path!("doc.c.[0]"), 1i64),
            Record::new(path!("doc.c.name"), "x"),
        ];
        let err = reconstruct(&path!("doc"), &records).unwrap_err();
        match err {
            Error::AmbiguousContainer { path } => assert_eq!(path, path!("doc.c")),
            other => panic!("expected AmbiguousContainer, got {:?}", other),
        }

        let records = vec![
            Record::new(path!("doc.[-1]"), 0i64),
            Record::new(path!("doc.name"), "x"),
        ];
        assert!(matches!(
            reconstruct(&path!("doc"), &records),
            Err(Error::AmbiguousContainer { .. })
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::path;
    use proptest::prelude::*;

    fn arb_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            (-1.0e15f64..1.0e15).prop_map(Value::Float),
            ".{0,8}".prop_map(Value::String),
        ]
    }

    /// Nested values the codec can represent: maps are never empty.
    fn arb_value() -> impl Strategy<Value = Value> {
        arb_leaf().prop_recursive(4, 48, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                prop::collection::btree_map("[a-z_][a-z0-9_ ]{0,6}", inner, 1..5)
                    .prop_map(Value::Map),
            ]
        })
    }

    proptest! {
        /// reconstruct(flatten(v)) == v for every representable value
        #[test]
        fn prop_round_trip(value in arb_value()) {
            let at = path!("doc.v");
            let records = flatten(&at, &value).unwrap();
            prop_assert_eq!(reconstruct(&at, &records).unwrap(), Some(value));
        }

        /// Record order does not matter to reconstruct
        #[test]
        fn prop_order_independent(value in arb_value()) {
            let at = path!("doc");
            let mut records = flatten(&at, &value).unwrap();
            records.reverse();
            prop_assert_eq!(reconstruct(&at, &records).unwrap(), Some(value));
        }

        /// Every flattened path parses back from its rendering
        #[test]
        fn prop_paths_render_canonically(value in arb_value()) {
            for record in flatten(&path!("doc"), &value).unwrap() {
                prop_assert_eq!(Path::parse(record.path.as_str()).unwrap(), record.path);
            }
        }
    }
}
