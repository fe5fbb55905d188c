// File: rusty-forms-types/src/value.rs
// Purpose: Value tree held by the form store

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

use crate::path::{FieldPath, Seg};

/// Object node of the value tree
pub type Object = BTreeMap<String, Value>;

/// Supported value types in a form
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// May hold `NaN` when numeric input failed to parse
    Number(f64),
    String(String),
    /// `None` is an unparseable date, stored as-is
    Date(Option<NaiveDate>),
    Array(Vec<Value>),
    Object(Object),
}

impl Value {
    /// Empty object, the usual root of a form
    pub fn object() -> Self {
        Value::Object(Object::new())
    }

    /// Whether the value counts as "no input" for a `required` rule
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !*b,
            Value::Number(n) => n.is_nan(),
            Value::String(s) => s.is_empty(),
            Value::Date(d) => d.is_none(),
            Value::Array(items) => items.is_empty(),
            Value::Object(_) => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => *d,
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Child for a single path segment
    pub fn get(&self, seg: &Seg) -> Option<&Value> {
        match (self, seg) {
            (Value::Object(map), Seg::Key(k)) => map.get(k),
            // numeric keys on objects ("0") are still reachable
            (Value::Object(map), Seg::Index(i)) => map.get(&i.to_string()),
            (Value::Array(items), Seg::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    /// Read the value at `path`; `None` means undefined
    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(self, |node, seg| node.get(seg))
    }

    /// Write `value` at `path`, creating intermediate objects and arrays.
    ///
    /// A scalar found on the way is replaced by the container the next
    /// segment needs. Arrays are padded with `Null` up to the target index.
    pub fn set_path(&mut self, path: &FieldPath, value: Value) {
        let mut node = self;
        for seg in path.segments() {
            node = node.child_or_insert(seg);
        }
        *node = value;
    }

    fn child_or_insert(&mut self, seg: &Seg) -> &mut Value {
        match seg {
            Seg::Key(_) if !matches!(self, Value::Object(_)) => *self = Value::object(),
            Seg::Index(_) if !matches!(self, Value::Object(_) | Value::Array(_)) => {
                *self = Value::Array(Vec::new())
            }
            _ => {}
        }
        match (self, seg) {
            (Value::Object(map), Seg::Key(k)) => map.entry(k.clone()).or_default(),
            // numeric segments on an object address string keys ("0")
            (Value::Object(map), Seg::Index(i)) => map.entry(i.to_string()).or_default(),
            (Value::Array(items), Seg::Index(i)) => {
                if items.len() <= *i {
                    items.resize(*i + 1, Value::Null);
                }
                &mut items[*i]
            }
            _ => unreachable!("container was shaped for the segment above"),
        }
    }

    /// Mutable access to an existing value at `path`
    pub fn get_path_mut(&mut self, path: &FieldPath) -> Option<&mut Value> {
        let mut node = self;
        for seg in path.segments() {
            node = match (node, seg) {
                (Value::Object(map), Seg::Key(k)) => map.get_mut(k)?,
                (Value::Object(map), Seg::Index(i)) => map.get_mut(&i.to_string())?,
                (Value::Array(items), Seg::Index(i)) => items.get_mut(*i)?,
                _ => return None,
            };
        }
        Some(node)
    }

    /// Remove the value at `path`.
    ///
    /// Object keys are deleted. Array slots are reset to `Null` rather than
    /// spliced so sibling positions stay stable.
    pub fn remove_path(&mut self, path: &FieldPath) -> Option<Value> {
        let (last, parent) = match (path.last(), path.parent()) {
            (Some(last), Some(parent)) => (last, parent),
            _ => return Some(std::mem::take(self)),
        };
        match (self.get_path_mut(&parent)?, last) {
            (Value::Object(map), Seg::Key(k)) => map.remove(k),
            (Value::Object(map), Seg::Index(i)) => map.remove(&i.to_string()),
            (Value::Array(items), Seg::Index(i)) => items.get_mut(*i).map(std::mem::take),
            _ => None,
        }
    }

    /// Paths of every leaf (non-container) value under this node, relative to it.
    ///
    /// Empty containers count as leaves so they are never lost in diffs.
    pub fn leaf_paths(&self) -> Vec<FieldPath> {
        let mut out = Vec::new();
        self.collect_leaves(FieldPath::root(), &mut out);
        out
    }

    fn collect_leaves(&self, at: FieldPath, out: &mut Vec<FieldPath>) {
        match self {
            Value::Object(map) if !map.is_empty() => {
                for (k, v) in map {
                    v.collect_leaves(at.clone().key(k.clone()), out);
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (i, v) in items.iter().enumerate() {
                    v.collect_leaves(at.clone().index(i), out);
                }
            }
            _ => out.push(at),
        }
    }

    /// JSON form for inspection and logging.
    ///
    /// `NaN` becomes `null`, dates are `YYYY-MM-DD` and an invalid date is
    /// the string `"Invalid Date"`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Date(Some(d)) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
            Value::Date(None) => JsonValue::String("Invalid Date".to_string()),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => JsonValue::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                // Format number nicely (remove .0 for integers)
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => f.write_str(s),
            Value::Date(Some(d)) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Date(None) => f.write_str("Invalid Date"),
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Object(_) => f.write_str("[Object]"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(Some(d))
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Value {
        Value::from(json!({
            "username": "",
            "social": { "twitter": "", "facebook": "" },
            "phoneNumbers": ["", ""],
            "phNumbers": [{ "number": "" }],
            "age": 0
        }))
    }

    #[test]
    fn test_get_nested_and_indexed() {
        let v = sample();
        assert_eq!(
            v.get_path(&FieldPath::from("social.twitter")),
            Some(&Value::from(""))
        );
        assert_eq!(
            v.get_path(&FieldPath::from("phNumbers.0.number")),
            Some(&Value::from(""))
        );
        assert_eq!(v.get_path(&FieldPath::from("phNumbers.3.number")), None);
        assert_eq!(v.get_path(&FieldPath::from("username.length")), None);
    }

    #[test]
    fn test_set_creates_containers() {
        let mut v = Value::object();
        v.set_path(&FieldPath::from("phNumbers.2.number"), "555".into());

        let items = v
            .get_path(&FieldPath::from("phNumbers"))
            .and_then(Value::as_array)
            .unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Value::Null);
        assert_eq!(
            v.get_path(&FieldPath::from("phNumbers.2.number")),
            Some(&Value::from("555"))
        );
    }

    #[test]
    fn test_set_root_replaces_tree() {
        let mut v = sample();
        v.set_path(&FieldPath::root(), Value::from(json!({ "a": 1 })));
        assert_eq!(v, Value::from(json!({ "a": 1 })));
    }

    #[test]
    fn test_remove_object_key_and_array_slot() {
        let mut v = sample();
        assert_eq!(
            v.remove_path(&FieldPath::from("social.twitter")),
            Some(Value::from(""))
        );
        assert_eq!(v.get_path(&FieldPath::from("social.twitter")), None);

        v.remove_path(&FieldPath::from("phoneNumbers.0"));
        let phones = v.get_path(&FieldPath::from("phoneNumbers")).unwrap();
        assert_eq!(phones, &Value::Array(vec![Value::Null, Value::from("")]));
    }

    #[test]
    fn test_emptiness() {
        assert!(Value::Null.is_empty());
        assert!(Value::from("").is_empty());
        assert!(Value::Number(f64::NAN).is_empty());
        assert!(Value::Date(None).is_empty());
        assert!(Value::Array(vec![]).is_empty());
        assert!(Value::Bool(false).is_empty());

        assert!(!Value::from(0).is_empty());
        assert!(!Value::from("x").is_empty());
        assert!(!Value::object().is_empty());
    }

    #[test]
    fn test_leaf_paths() {
        let leaves: Vec<String> = sample().leaf_paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            leaves,
            vec![
                "age",
                "phNumbers.0.number",
                "phoneNumbers.0",
                "phoneNumbers.1",
                "social.facebook",
                "social.twitter",
                "username",
            ]
        );
    }

    #[test]
    fn test_to_json_special_values() {
        let v = Value::Array(vec![
            Value::Number(f64::NAN),
            Value::Date(None),
            Value::from(NaiveDate::from_ymd_opt(2001, 2, 3).unwrap()),
        ]);
        assert_eq!(v.to_json(), json!([null, "Invalid Date", "2001-02-03"]));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Null.to_string(), "");
    }
}
