// File: rusty-forms/src/store.rs
// Purpose: Current and default value trees

use rusty_forms_types::{FieldPath, Value};

use crate::error::{FormError, Result};

/// Flags for [`FormStateManager::set_value`](crate::FormStateManager::set_value).
///
/// All off by default: a programmatic set only changes the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetValueOptions {
    pub should_validate: bool,
    pub should_dirty: bool,
    pub should_touch: bool,
}

impl SetValueOptions {
    /// Treat the set like a user edit: validate, dirty and touch
    pub fn all() -> Self {
        Self {
            should_validate: true,
            should_dirty: true,
            should_touch: true,
        }
    }

    pub fn validate(mut self) -> Self {
        self.should_validate = true;
        self
    }

    pub fn dirty(mut self) -> Self {
        self.should_dirty = true;
        self
    }

    pub fn touch(mut self) -> Self {
        self.should_touch = true;
        self
    }
}

/// Value store: the live tree plus the defaults it is diffed against
#[derive(Debug, Clone)]
pub struct ValueStore {
    values: Value,
    defaults: Value,
}

impl ValueStore {
    pub fn new(defaults: Value) -> Self {
        let defaults = match defaults {
            Value::Null => Value::object(),
            other => other,
        };
        Self {
            values: defaults.clone(),
            defaults,
        }
    }

    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        self.values.get_path(path)
    }

    pub fn default_of(&self, path: &FieldPath) -> Option<&Value> {
        self.defaults.get_path(path)
    }

    pub fn set(&mut self, path: &FieldPath, value: Value) {
        tracing::trace!(path = %path, value = %value, "store write");
        self.values.set_path(path, value);
    }

    pub fn remove(&mut self, path: &FieldPath) -> Option<Value> {
        self.values.remove_path(path)
    }

    pub fn values(&self) -> &Value {
        &self.values
    }

    pub fn defaults(&self) -> &Value {
        &self.defaults
    }

    /// Deep compare of the whole tree against the defaults
    pub fn is_dirty(&self) -> bool {
        !same(Some(&self.values), Some(&self.defaults))
    }

    /// Whether the value at `path` differs from its default
    pub fn differs_from_default(&self, path: &FieldPath) -> bool {
        !same(self.get(path), self.default_of(path))
    }

    /// Restore the default at `path`, or clear it when there is none
    pub fn restore_default(&mut self, path: &FieldPath) {
        match self.defaults.get_path(path).cloned() {
            Some(default) => self.values.set_path(path, default),
            None => {
                self.values.remove_path(path);
            }
        }
    }

    /// Replace values (and optionally defaults) wholesale
    pub fn reset(&mut self, defaults: Option<Value>) {
        if let Some(defaults) = defaults {
            self.defaults = match defaults {
                Value::Null => Value::object(),
                other => other,
            };
        }
        self.values = self.defaults.clone();
    }

    /// The array at `path`, created empty when nothing is stored there
    pub fn array_mut(&mut self, path: &FieldPath) -> Result<&mut Vec<Value>> {
        if self.values.get_path(path).map_or(true, Value::is_null) {
            self.values.set_path(path, Value::Array(Vec::new()));
        }
        self.values
            .get_path_mut(path)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| FormError::NotAnArray(path.clone()))
    }

    pub fn array_len(&self, path: &FieldPath) -> usize {
        self.get(path)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

/// Structural equality where a missing value and `Null` are the same
fn same(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => true,
        (Some(Value::Object(x)), Some(Value::Object(y))) => x
            .keys()
            .chain(y.keys())
            .all(|k| same(x.get(k), y.get(k))),
        (Some(Value::Array(x)), Some(Value::Array(y))) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| same(Some(l), Some(r)))
        }
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> ValueStore {
        ValueStore::new(Value::from(json!({
            "username": "",
            "social": { "twitter": "", "facebook": "" },
            "phNumbers": [{ "number": "" }]
        })))
    }

    #[test]
    fn test_fresh_store_is_pristine() {
        assert!(!store().is_dirty());
    }

    #[test]
    fn test_deep_change_is_dirty() {
        let mut store = store();
        let path = FieldPath::from("social.twitter");
        store.set(&path, "@codevolution".into());
        assert!(store.is_dirty());
        assert!(store.differs_from_default(&path));
        assert!(!store.differs_from_default(&FieldPath::from("social.facebook")));

        store.set(&path, "".into());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_missing_and_null_compare_equal() {
        let mut store = store();
        store.set(&FieldPath::from("nickname"), Value::Null);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_array_length_change_is_dirty() {
        let mut store = store();
        let path = FieldPath::from("phNumbers");
        store
            .array_mut(&path)
            .unwrap()
            .push(Value::from(json!({ "number": "" })));
        assert!(store.is_dirty());
        assert_eq!(store.array_len(&path), 2);
    }

    #[test]
    fn test_array_mut_rejects_scalars() {
        let mut store = store();
        assert_eq!(
            store.array_mut(&FieldPath::from("username")).unwrap_err(),
            FormError::NotAnArray(FieldPath::from("username"))
        );
        assert!(store.array_mut(&FieldPath::from("tags")).unwrap().is_empty());
    }

    #[test]
    fn test_restore_default() {
        let mut store = store();
        let path = FieldPath::from("username");
        store.set(&path, "bruce".into());
        store.restore_default(&path);
        assert_eq!(store.get(&path), Some(&Value::from("")));

        let extra = FieldPath::from("extra");
        store.set(&extra, "x".into());
        store.restore_default(&extra);
        assert_eq!(store.get(&extra), None);
    }

    #[test]
    fn test_reset_with_new_defaults() {
        let mut store = store();
        store.set(&FieldPath::from("username"), "bruce".into());
        store.reset(Some(Value::from(json!({ "username": "wayne" }))));
        assert_eq!(
            store.get(&FieldPath::from("username")),
            Some(&Value::from("wayne"))
        );
        assert!(!store.is_dirty());
    }
}
