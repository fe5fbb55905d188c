// File: rusty-forms-types/src/path.rs
// Purpose: Dotted field paths addressing locations in the value tree

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Errors produced when parsing a path string strictly
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("field path is empty")]
    Empty,

    #[error("field path `{0}` contains an empty segment")]
    EmptySegment(String),
}

/// A single segment of a field path
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Seg {
    /// Object key: `social` in `social.twitter`
    Key(String),
    /// Array position: `0` in `phoneNumbers.0`
    Index(usize),
}

impl Seg {
    fn parse(raw: &str) -> Self {
        // "01" stays a key so that it round-trips through Display
        match raw.parse::<usize>() {
            Ok(i) if i.to_string() == raw => Seg::Index(i),
            _ => Seg::Key(raw.to_string()),
        }
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Seg::Key(k) => Some(k),
            Seg::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Seg::Key(_) => None,
            Seg::Index(i) => Some(*i),
        }
    }
}

impl fmt::Display for Seg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seg::Key(k) => write!(f, "{}", k),
            Seg::Index(i) => write!(f, "{}", i),
        }
    }
}

/// Address of a field inside the value tree.
///
/// Written as a dotted string where purely numeric segments index into arrays:
///
/// ```
/// use rusty_forms_types::{FieldPath, Seg};
///
/// let path = FieldPath::parse("phNumbers.1.number").unwrap();
/// assert_eq!(path.segments()[1], Seg::Index(1));
/// assert_eq!(path.to_string(), "phNumbers.1.number");
/// ```
///
/// Paths order segment by segment, so a map keyed by `FieldPath` iterates
/// parents before children and array items by position.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<Seg>);

impl FieldPath {
    /// The root path (the whole value tree)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path, rejecting empty paths and empty segments
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        raw.split('.')
            .map(|part| {
                if part.is_empty() {
                    Err(PathError::EmptySegment(raw.to_string()))
                } else {
                    Ok(Seg::parse(part))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn from_segments(segments: Vec<Seg>) -> Self {
        Self(segments)
    }

    /// Append a key segment (builder style)
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment (builder style)
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    /// Join a relative path onto this one
    pub fn join(&self, other: &FieldPath) -> FieldPath {
        let mut joined = self.clone();
        joined.0.extend(other.0.iter().cloned());
        joined
    }

    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Seg> {
        self.0.last()
    }

    pub fn parent(&self) -> Option<FieldPath> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// True if `prefix` is this path or one of its ancestors
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// True if one path is an ancestor of (or equal to) the other.
    ///
    /// A change at `social` affects a watcher of `social.twitter` and
    /// the other way round.
    pub fn overlaps(&self, other: &FieldPath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Position of this path inside the array at `array`, if it lives under one of its items.
    ///
    /// `phNumbers.2.number` under `phNumbers` yields `Some(2)`.
    pub fn index_under(&self, array: &FieldPath) -> Option<usize> {
        if self.0.len() <= array.0.len() || !self.starts_with(array) {
            return None;
        }
        self.0[array.0.len()].as_index()
    }

    /// Copy of this path with the item index directly under `array` replaced
    pub fn with_index_under(&self, array: &FieldPath, index: usize) -> FieldPath {
        let mut moved = self.clone();
        if moved.0.len() > array.0.len() && moved.starts_with(array) {
            moved.0[array.0.len()] = Seg::Index(index);
        }
        moved
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Lenient conversion used by the form API: empty segments are dropped,
/// so `""` becomes the root path.
impl From<&str> for FieldPath {
    fn from(raw: &str) -> Self {
        Self(raw.split('.').filter(|p| !p.is_empty()).map(Seg::parse).collect())
    }
}

impl From<String> for FieldPath {
    fn from(raw: String) -> Self {
        FieldPath::from(raw.as_str())
    }
}

impl From<&String> for FieldPath {
    fn from(raw: &String) -> Self {
        FieldPath::from(raw.as_str())
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(path: &FieldPath) -> Self {
        path.clone()
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FieldPath::parse(&raw).map_err(serde::de::Error::custom)
    }
}
