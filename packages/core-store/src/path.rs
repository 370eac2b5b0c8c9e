//! Path type with key and array-index segments.
//!
//! A path is a dot-delimited list of segments. Key segments name an object
//! member; bracketed segments address an array element (`[0]`, `[1]`, ...)
//! or the array-length sentinel (`[-1]`).

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use lazy_static::lazy_static;
use regex::Regex;

/// Arrays hold at most this many elements; `[n]` segments must be below it.
pub const MAX_ARRAY_LEN: usize = 1 << 20;

/// Errors related to path parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path segment is malformed.
    InvalidSegment {
        segment: String,
        position: usize,
        message: String,
    },
    /// The path string is invalid.
    InvalidPath { message: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidSegment {
                segment,
                position,
                message,
            } => {
                write!(
                    f,
                    "invalid path segment '{}' at position {}: {}",
                    segment, position, message
                )
            }
            PathError::InvalidPath { message } => {
                write!(f, "invalid path: {}", message)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// A single path segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Object member name.
    Key(String),
    /// Array element position.
    Index(usize),
    /// Array-length sentinel, rendered as `[-1]`.
    Length,
}

impl Segment {
    /// Create a key segment, validating it.
    pub fn key(name: impl Into<String>) -> Result<Self, PathError> {
        Self::key_at(name, 0)
    }

    /// Create a key segment that will sit at `position` in its path.
    pub(crate) fn key_at(name: impl Into<String>, position: usize) -> Result<Self, PathError> {
        let name = name.into();
        Self::validate_key(&name, position)?;
        Ok(Segment::Key(name))
    }

    /// Parse one segment as it appears in a rendered path.
    pub fn parse(s: &str, position: usize) -> Result<Self, PathError> {
        lazy_static! {
            static ref BRACKETED: Regex = Regex::new(r"^\[(-1|0|[1-9][0-9]*)\]$").unwrap();
        }

        if s.starts_with('[') {
            let captures = BRACKETED
                .captures(s)
                .ok_or_else(|| PathError::InvalidSegment {
                    segment: s.to_string(),
                    position,
                    message: "expected `[n]` with n a non-negative integer, or `[-1]`".to_string(),
                })?;

            return match &captures[1] {
                "-1" => Ok(Segment::Length),
                digits => match digits.parse::<usize>() {
                    Ok(i) if i < MAX_ARRAY_LEN => Ok(Segment::Index(i)),
                    _ => Err(PathError::InvalidSegment {
                        segment: s.to_string(),
                        position,
                        message: format!("array index must be below {}", MAX_ARRAY_LEN),
                    }),
                },
            };
        }

        Self::validate_key(s, position)?;
        Ok(Segment::Key(s.to_string()))
    }

    fn validate_key(key: &str, position: usize) -> Result<(), PathError> {
        if key.is_empty() {
            return Err(PathError::InvalidSegment {
                segment: key.to_string(),
                position,
                message: "empty segment".to_string(),
            });
        }

        if let Some(c) = key.chars().find(|c| matches!(c, '.' | '[' | ']')) {
            return Err(PathError::InvalidSegment {
                segment: key.to_string(),
                position,
                message: format!("invalid character '{}' in key", c),
            });
        }

        Ok(())
    }

    /// Whether this segment addresses an array (element or sentinel).
    pub fn is_array_segment(&self) -> bool {
        matches!(self, Segment::Index(_) | Segment::Length)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => write!(f, "{}", key),
            Segment::Index(i) => write!(f, "[{}]", i),
            Segment::Length => write!(f, "[-1]"),
        }
    }
}

/// A validated, dot-delimited path.
///
/// The canonical rendering is cached: equality, hashing and ordering all go
/// through it, so sorting paths is the same as sorting path strings.
#[derive(Clone, Debug, Default)]
pub struct Path {
    segments: Vec<Segment>,
    rendered: String,
}

impl Path {
    /// The empty path. It is a prefix of every other path.
    pub fn root() -> Self {
        Path::default()
    }

    /// Parse a path string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use flatstore_core_store::{Path, Segment};
    ///
    /// let path = Path::parse("lists.123.notes.[0]").unwrap();
    /// assert_eq!(path.len(), 4);
    /// assert_eq!(path.last(), Some(&Segment::Index(0)));
    ///
    /// assert!(Path::parse("").unwrap().is_empty());
    /// assert!(Path::parse("foo..bar").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Ok(Path::root());
        }

        let segments = s
            .split('.')
            .enumerate()
            .map(|(i, segment)| Segment::parse(segment, i))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Path {
            segments,
            rendered: s.to_string(),
        })
    }

    /// Build a path from segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let rendered = segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Path { segments, rendered }
    }

    /// Append a segment, returning the longer path.
    pub fn child(&self, segment: Segment) -> Self {
        let mut rendered = self.rendered.clone();
        if !rendered.is_empty() {
            rendered.push('.');
        }
        rendered.push_str(&segment.to_string());

        let mut segments = self.segments.clone();
        segments.push(segment);

        Path { segments, rendered }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Check whether `prefix` is this path or one of its ancestors.
    ///
    /// Matching happens on segment boundaries: `a.bc.x` is under `a.bc` but
    /// not under `a.b`.
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        prefix.len() <= self.len() && self.segments[..prefix.len()] == prefix.segments[..]
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}

impl PartialOrd for Path {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Path {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rendered.cmp(&other.rendered)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered)
    }
}

impl std::str::FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

/// Macro for creating paths from literals.
///
/// # Example
///
/// ```rust
/// use flatstore_core_store::path;
///
/// let p = path!("tasks.42.tags.[1]");
/// assert_eq!(p.len(), 4);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s).expect("invalid path literal")
    };
}
