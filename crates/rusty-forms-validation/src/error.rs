// File: rusty-forms-validation/src/error.rs
// Purpose: Field-scoped validation errors and the error map

use rusty_forms_types::FieldPath;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// Which rule produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    MissingRequiredValue,
    PatternMismatch,
    CustomValidationFailure,
    CoercionFailure,
    /// Set by the application through `set_error`
    Manual,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MissingRequiredValue => write!(f, "required"),
            ErrorKind::PatternMismatch => write!(f, "pattern"),
            ErrorKind::CustomValidationFailure => write!(f, "validate"),
            ErrorKind::CoercionFailure => write!(f, "coercion"),
            ErrorKind::Manual => write!(f, "manual"),
        }
    }
}

/// A validation failure for one field.
///
/// Never raised as a fault: it is stored in an [`ErrorMap`] and shown next
/// to the offending input until further input fixes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingRequiredValue, message)
    }

    pub fn pattern(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PatternMismatch, message)
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CustomValidationFailure, message)
    }

    pub fn coercion(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CoercionFailure, message)
    }

    pub fn manual(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Manual, message)
    }
}

/// Errors by field path. A missing key means the field has no error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<FieldPath, FieldError>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<FieldPath>, error: FieldError) -> Option<FieldError> {
        self.0.insert(path.into(), error)
    }

    pub fn get(&self, path: impl Into<FieldPath>) -> Option<&FieldError> {
        self.0.get(&path.into())
    }

    /// Message of the error at `path`, the usual thing to render
    pub fn message(&self, path: impl Into<FieldPath>) -> Option<&str> {
        self.get(path).map(|e| e.message.as_str())
    }

    pub fn contains(&self, path: impl Into<FieldPath>) -> bool {
        self.0.contains_key(&path.into())
    }

    pub fn remove(&mut self, path: impl Into<FieldPath>) -> Option<FieldError> {
        self.0.remove(&path.into())
    }

    /// Drop the error at `prefix` and every error below it
    pub fn clear_under(&mut self, prefix: &FieldPath) {
        self.0.retain(|path, _| !path.starts_with(prefix));
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&FieldPath, &FieldError) -> bool) {
        self.0.retain(|path, error| keep(path, error));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &FieldError)> {
        self.0.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.0.keys()
    }

    /// Nested JSON mirroring the value tree:
    /// `{"social": {"twitter": {"type": "required", "message": "..."}}}`.
    ///
    /// Array indices become object keys, as sparse errors would otherwise
    /// need padding. An error on a path that also has errors below it is
    /// kept under a `root` key next to them.
    pub fn to_tree(&self) -> JsonValue {
        let mut root = Map::new();
        for (path, error) in &self.0 {
            let segments = path.segments();
            let Some((last, parents)) = segments.split_last() else {
                continue;
            };
            let mut node = &mut root;
            for seg in parents {
                let child = node
                    .entry(seg.to_string())
                    .or_insert_with(|| JsonValue::Object(Map::new()));
                if !child.is_object() {
                    *child = JsonValue::Object(Map::new());
                }
                node = match child {
                    JsonValue::Object(map) => map,
                    _ => unreachable!("child was just made an object"),
                };
            }
            let error = serde_json::to_value(error).unwrap_or(JsonValue::Null);
            if self.has_errors_below(path) {
                let container = node
                    .entry(last.to_string())
                    .or_insert_with(|| JsonValue::Object(Map::new()));
                if let JsonValue::Object(map) = container {
                    map.insert("root".to_string(), error);
                }
            } else {
                node.insert(last.to_string(), error);
            }
        }
        JsonValue::Object(root)
    }
}

impl ErrorMap {
    fn has_errors_below(&self, path: &FieldPath) -> bool {
        self.0
            .range(path.clone()..)
            .nth(1)
            .is_some_and(|(next, _)| next.starts_with(path))
    }
}

impl FromIterator<(FieldPath, FieldError)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (FieldPath, FieldError)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ErrorMap {
    type Item = (FieldPath, FieldError);
    type IntoIter = std::collections::btree_map::IntoIter<FieldPath, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_insert_and_lookup() {
        let mut errors = ErrorMap::new();
        errors.insert("email", FieldError::pattern("Invalid email format"));

        assert!(errors.contains("email"));
        assert_eq!(errors.message("email"), Some("Invalid email format"));
        assert_eq!(
            errors.get("email").map(|e| e.kind),
            Some(ErrorKind::PatternMismatch)
        );
        assert!(errors.get("username").is_none());
    }

    #[test]
    fn test_clear_under_prefix() {
        let mut errors = ErrorMap::new();
        errors.insert("social.twitter", FieldError::required("Twitter handler is required"));
        errors.insert("social.facebook", FieldError::required("Facebook username is required"));
        errors.insert("channel", FieldError::required("Channel is required"));

        errors.clear_under(&FieldPath::from("social"));
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("channel"));
    }

    #[test]
    fn test_tree_mirrors_values() {
        let mut errors = ErrorMap::new();
        errors.insert("social.twitter", FieldError::required("Twitter handler is required"));
        errors.insert("phoneNumbers.1", FieldError::required("Secondary phone is required"));

        assert_eq!(
            errors.to_tree(),
            json!({
                "phoneNumbers": {
                    "1": { "type": "missingRequiredValue", "message": "Secondary phone is required" }
                },
                "social": {
                    "twitter": { "type": "missingRequiredValue", "message": "Twitter handler is required" }
                }
            })
        );
    }

    #[test]
    fn test_tree_keeps_parent_error_under_root() {
        let mut errors = ErrorMap::new();
        errors.insert("social", FieldError::manual("Add at least one profile"));
        errors.insert("social.twitter", FieldError::required("Twitter handler is required"));

        assert_eq!(
            errors.to_tree(),
            json!({
                "social": {
                    "root": { "type": "manual", "message": "Add at least one profile" },
                    "twitter": { "type": "missingRequiredValue", "message": "Twitter handler is required" }
                }
            })
        );
    }

    #[test]
    fn test_display() {
        let error = FieldError::custom("Enter a different email address");
        assert_eq!(error.to_string(), "validate: Enter a different email address");
    }
}
