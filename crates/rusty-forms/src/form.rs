// File: rusty-forms/src/form.rs
// Purpose: FormStateManager - registration, value updates, validation, submit and reset

use rusty_forms_types::{FieldPath, Value};
use rusty_forms_validation::{ErrorMap, FieldError, FieldRules};
use uuid::Uuid;

use crate::config::FormConfig;
use crate::error::{FormError, Result};
use crate::field_array::{FieldArrays, Reindex};
use crate::registry::{ElementRef, FieldBinding, Registry};
use crate::state::{FieldState, FormSnapshot, FormState, Interaction};
use crate::store::{SetValueOptions, ValueStore};
use crate::watch::{EventKind, SubscriptionId, WatchEvent, WatchTarget, Watched, Watchers};

/// Result of [`FormStateManager::handle_submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Valid,
    Invalid,
}

impl SubmitOutcome {
    pub fn is_valid(self) -> bool {
        self == SubmitOutcome::Valid
    }
}

/// Owns the state of one form instance.
///
/// All mutation goes through `&mut self`; derived state (dirty, valid) is
/// recomputed on read, so it never drifts from the values.
#[derive(Debug)]
pub struct FormStateManager {
    pub(crate) id: Uuid,
    pub(crate) config: FormConfig,
    pub(crate) store: ValueStore,
    pub(crate) registry: Registry,
    pub(crate) errors: ErrorMap,
    pub(crate) interaction: Interaction,
    pub(crate) arrays: FieldArrays,
    pub(crate) watchers: Watchers,
    focus: Option<ElementRef>,
}

impl Default for FormStateManager {
    fn default() -> Self {
        Self::new(Value::object())
    }
}

impl FormStateManager {
    /// New form seeded with `defaults`; current values start as a copy of them
    pub fn new(defaults: impl Into<Value>) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(form = %id, "form created");
        Self {
            id,
            config: FormConfig::default(),
            store: ValueStore::new(defaults.into()),
            registry: Registry::default(),
            errors: ErrorMap::new(),
            interaction: Interaction::default(),
            arrays: FieldArrays::default(),
            watchers: Watchers::default(),
            focus: None,
        }
    }

    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    // ---- registration ----

    /// Register a field under `path` with `rules`.
    ///
    /// Registering the same path again merges the rules. A field with no
    /// stored value gets its default, or `Null`.
    pub fn register(&mut self, path: impl Into<FieldPath>, rules: FieldRules) -> Result<FieldBinding> {
        let path = path.into();
        if path.is_root() {
            return Err(FormError::RootPath);
        }

        if self.store.get(&path).is_none() {
            let initial = self.store.default_of(&path).cloned().unwrap_or_default();
            self.store.set(&path, initial);
        }

        let entry = self.registry.register(&path, rules);
        tracing::debug!(
            field = %path,
            rules = entry.rules.rules().len(),
            "field registered"
        );
        Ok(FieldBinding { name: path })
    }

    /// Remove the field at `path` and everything registered below it.
    ///
    /// The stored value is dropped (array slots become `Null`), along with
    /// errors and touched/dirty marks.
    pub fn unregister(&mut self, path: impl Into<FieldPath>) -> bool {
        let path = path.into();
        let removed = self.registry.unregister_under(&path);
        self.store.remove(&path);
        self.errors.clear_under(&path);
        self.interaction.forget(&path);
        tracing::debug!(field = %path, removed, "field unregistered");
        self.notify(Some(&path), EventKind::Unregister);
        removed > 0
    }

    pub fn is_registered(&self, path: impl Into<FieldPath>) -> bool {
        self.registry.contains(&path.into())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ---- input events ----

    /// Change event from a bound input carrying its raw text
    pub fn handle_change(&mut self, path: &FieldPath, raw: &str) {
        let value = match self.registry.get(path) {
            Some(entry) => entry.rules.coerce(raw),
            None => {
                tracing::warn!(field = %path, "change on unregistered field");
                Value::from(raw)
            }
        };
        self.store.set(path, value);

        if self.store.differs_from_default(path) {
            self.interaction.mark_dirty(path);
        }

        let touched = self.interaction.is_touched(path);
        if self
            .config
            .validates_on_change(self.interaction.is_submitted, touched)
        {
            self.refresh_error(path);
        }
        self.drop_disabled_errors();
        self.notify(Some(path), EventKind::Change);
    }

    /// Blur event: marks the field touched
    pub fn handle_blur(&mut self, path: &FieldPath) {
        self.interaction.mark_touched(path);
        if self.config.validates_on_blur(self.interaction.is_submitted) {
            self.refresh_error(path);
        }
    }

    /// Attach or detach the rendered element of a registered field
    pub fn set_ref(&mut self, path: &FieldPath, element: Option<ElementRef>) {
        match self.registry.get_mut(path) {
            Some(entry) => entry.element = element,
            None => tracing::warn!(field = %path, "ref for unregistered field ignored"),
        }
    }

    // ---- values ----

    pub fn get_value(&self, path: impl Into<FieldPath>) -> Option<Value> {
        self.store.get(&path.into()).cloned()
    }

    /// Whole value tree, disabled fields included
    pub fn get_values(&self) -> Value {
        self.store.values().clone()
    }

    pub fn default_values(&self) -> &Value {
        self.store.defaults()
    }

    /// Programmatic write of `value` at `path`.
    ///
    /// A string written to a registered number or date field is coerced
    /// first. `options` decide whether the write also dirties, touches and
    /// validates the field (and any registered fields below it).
    pub fn set_value(&mut self, path: impl Into<FieldPath>, value: impl Into<Value>, options: SetValueOptions) {
        let path = path.into();
        let value = match self.registry.get(&path) {
            Some(entry) => entry.rules.coerce_value(value.into()),
            None => value.into(),
        };
        self.store.set(&path, value);

        let mut affected: Vec<FieldPath> = self.registry.under(&path).map(|e| e.path.clone()).collect();
        if !affected.contains(&path) {
            affected.insert(0, path.clone());
        }

        for field in &affected {
            if options.should_dirty && self.store.differs_from_default(field) {
                self.interaction.mark_dirty(field);
            }
            if options.should_touch {
                self.interaction.mark_touched(field);
            }
            if options.should_validate {
                self.refresh_error(field);
            }
        }

        tracing::debug!(field = %path, ?options, "value set");
        self.drop_disabled_errors();
        self.notify(Some(&path), EventKind::SetValue);
    }

    // ---- validation ----

    /// Validate one registered field without touching the visible errors.
    ///
    /// Unregistered paths have no rules and always pass.
    pub fn validate_field(&self, path: impl Into<FieldPath>) -> Option<FieldError> {
        let path = path.into();
        let entry = self.registry.get(&path)?;
        entry
            .rules
            .evaluate(self.store.get(&path), self.store.values())
            .err()
    }

    /// Validate every registered field; disabled fields are skipped
    pub fn validate_all(&self) -> ErrorMap {
        let values = self.store.values();
        self.registry
            .iter()
            .filter_map(|entry| {
                entry
                    .rules
                    .evaluate(self.store.get(&entry.path), values)
                    .err()
                    .map(|error| (entry.path.clone(), error))
            })
            .collect()
    }

    /// Validate `path` and the registered fields below it, writing the
    /// result to the visible errors. Returns whether they all passed.
    pub fn trigger(&mut self, path: impl Into<FieldPath>) -> bool {
        let path = path.into();
        let fields: Vec<FieldPath> = self.registry.under(&path).map(|e| e.path.clone()).collect();
        let mut valid = true;
        for field in &fields {
            valid &= self.refresh_error(field);
        }
        tracing::debug!(field = %path, valid, "trigger");
        valid
    }

    /// Validate the whole form into the visible errors
    pub fn trigger_all(&mut self) -> bool {
        self.errors = self.validate_all();
        self.errors.is_empty()
    }

    /// Show an error that did not come from the rules (e.g. a server response).
    ///
    /// It stays until the field is validated again, cleared or reset.
    pub fn set_error(&mut self, path: impl Into<FieldPath>, error: FieldError) {
        self.errors.insert(path, error);
    }

    /// Clear visible errors at `path` and below
    pub fn clear_errors(&mut self, path: impl Into<FieldPath>) {
        self.errors.clear_under(&path.into());
    }

    pub fn clear_all_errors(&mut self) {
        self.errors.clear();
    }

    /// Errors currently shown
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    // ---- derived state ----

    /// Whether every registered, enabled field passes its rules right now
    pub fn is_valid(&self) -> bool {
        self.validate_all().is_empty()
    }

    /// Whether the values differ from the defaults anywhere
    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    pub fn form_state(&self) -> FormState {
        FormState {
            is_dirty: self.is_dirty(),
            is_valid: self.is_valid(),
            dirty_fields: self.interaction.dirty_fields().clone(),
            touched_fields: self.interaction.touched_fields().clone(),
            errors: self.errors.clone(),
            submit_count: self.interaction.submit_count,
            is_submitted: self.interaction.is_submitted,
            is_submit_successful: self.interaction.is_submit_successful,
        }
    }

    /// Full copy of the current values and interaction marks
    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            values: self.store.values().clone(),
            dirty_fields: self.interaction.dirty_fields().clone(),
            touched_fields: self.interaction.touched_fields().clone(),
            is_valid: self.is_valid(),
            is_dirty: self.is_dirty(),
        }
    }

    pub fn get_field_state(&self, path: impl Into<FieldPath>) -> FieldState {
        let path = path.into();
        FieldState {
            value: self.store.get(&path).cloned(),
            is_touched: self.interaction.is_touched(&path),
            is_dirty: self.interaction.is_dirty(&path),
            is_disabled: self
                .registry
                .get(&path)
                .is_some_and(|e| e.rules.is_disabled(self.store.values())),
            error: self.errors.get(&path).cloned(),
        }
    }

    /// Element to focus after the last failed submit
    pub fn focus_target(&self) -> Option<&ElementRef> {
        self.focus.as_ref()
    }

    // ---- submit ----

    /// Validate everything and call exactly one of the handlers.
    ///
    /// `on_valid` receives the values with disabled fields left out;
    /// `on_invalid` receives the errors, which also become the visible ones.
    pub fn handle_submit<V, I>(&mut self, on_valid: V, on_invalid: I) -> SubmitOutcome
    where
        V: FnOnce(FormSnapshot),
        I: FnOnce(ErrorMap),
    {
        self.interaction.submit_count += 1;
        self.interaction.is_submitted = true;

        let errors = self.validate_all();
        self.errors = errors.clone();

        if errors.is_empty() {
            self.interaction.is_submit_successful = true;
            self.focus = None;
            let snapshot = self.submit_snapshot();
            tracing::debug!(form = %self.id, submit_count = self.interaction.submit_count, "submit valid");
            on_valid(snapshot);
            SubmitOutcome::Valid
        } else {
            self.interaction.is_submit_successful = false;
            self.focus = if self.config.should_focus_error {
                self.registry
                    .first_with_element(errors.paths())
                    .and_then(|entry| entry.element.clone())
            } else {
                None
            };
            tracing::debug!(
                form = %self.id,
                errors = errors.len(),
                focus = ?self.focus,
                "submit invalid"
            );
            on_invalid(errors);
            SubmitOutcome::Invalid
        }
    }

    fn submit_snapshot(&self) -> FormSnapshot {
        let mut values = self.store.values().clone();
        for entry in self.registry.iter() {
            if entry.rules.is_disabled(self.store.values()) {
                values.remove_path(&entry.path);
            }
        }
        FormSnapshot {
            values,
            dirty_fields: self.interaction.dirty_fields().clone(),
            touched_fields: self.interaction.touched_fields().clone(),
            is_valid: true,
            is_dirty: self.is_dirty(),
        }
    }

    // ---- reset ----

    /// Restore the defaults (or adopt `new_defaults`) and clear all
    /// errors, marks, submit counters and array ids.
    pub fn reset(&mut self, new_defaults: Option<Value>) {
        self.store.reset(new_defaults);
        self.errors.clear();
        self.interaction.reset();
        self.arrays.clear();
        self.focus = None;
        tracing::debug!(form = %self.id, "form reset");
        self.notify(None, EventKind::Reset);
    }

    /// Restore one field to its default and clear its error and marks
    pub fn reset_field(&mut self, path: impl Into<FieldPath>) {
        let path = path.into();
        self.store.restore_default(&path);
        self.errors.clear_under(&path);
        self.interaction.forget(&path);
        self.notify(Some(&path), EventKind::Reset);
    }

    // ---- watching ----

    /// Read the watched values; never mutates or validates
    pub fn watch(&self, target: impl Into<WatchTarget>) -> Watched {
        target.into().read(self.store.values())
    }

    /// Call `callback` after every mutation that touches `target`
    pub fn subscribe<F>(&mut self, target: impl Into<WatchTarget>, callback: F) -> SubscriptionId
    where
        F: FnMut(&WatchEvent<'_>) + 'static,
    {
        let id = self.watchers.subscribe(target.into(), callback);
        tracing::trace!(subscription = %id, "subscribed");
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.watchers.unsubscribe(id)
    }

    // ---- internals ----

    /// Re-run the rules of `path` into the visible errors; true when it passes
    pub(crate) fn refresh_error(&mut self, path: &FieldPath) -> bool {
        match self.validate_field(path) {
            Some(error) => {
                tracing::trace!(field = %path, %error, "field invalid");
                self.errors.insert(path, error);
                false
            }
            None => {
                self.errors.remove(path);
                true
            }
        }
    }

    /// A field that became disabled has nothing to report
    fn drop_disabled_errors(&mut self) {
        let values = self.store.values();
        let registry = &self.registry;
        self.errors.retain(|path, _| {
            registry
                .get(path)
                .map_or(true, |entry| !entry.rules.is_disabled(values))
        });
    }

    pub(crate) fn notify(&mut self, name: Option<&FieldPath>, kind: EventKind) {
        self.watchers.notify(name, kind, self.store.values());
    }

    /// Apply an array reorder to every path-keyed piece of state
    pub(crate) fn reindex(&mut self, array: &FieldPath, op: Reindex) {
        let f = |path: &FieldPath| op.apply(array, path);
        self.registry.remap(f);
        self.interaction.remap(f);
        self.arrays.remap(f);
        let errors = std::mem::take(&mut self.errors);
        self.errors = errors
            .into_iter()
            .filter_map(|(path, error)| f(&path).map(|moved| (moved, error)))
            .collect();
    }

    /// Forget everything registered or recorded under the items of `array`
    pub(crate) fn drop_items(&mut self, array: &FieldPath) {
        let f = |path: &FieldPath| match path.index_under(array) {
            Some(_) => None,
            None => Some(path.clone()),
        };
        self.registry.remap(f);
        self.interaction.remap(f);
        self.arrays.remap(f);
        self.errors.retain(|path, _| path.index_under(array).is_none());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn form() -> FormStateManager {
        FormStateManager::new(json!({ "username": "", "channel": "" }))
    }

    #[test]
    fn test_register_root_is_rejected() {
        let mut form = form();
        assert_eq!(
            form.register(FieldPath::root(), FieldRules::new()).unwrap_err(),
            FormError::RootPath
        );
    }

    #[test]
    fn test_register_seeds_missing_value() {
        let mut form = form();
        form.register("nickname", FieldRules::new()).unwrap();
        assert_eq!(form.get_value("nickname"), Some(Value::Null));
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_change_validates_in_default_mode() {
        let mut form = form();
        let username = form
            .register("username", FieldRules::new().required("Username is required"))
            .unwrap();

        username.on_change(&mut form, "");
        assert_eq!(form.errors().message("username"), Some("Username is required"));

        username.on_change(&mut form, "bruce");
        assert!(form.errors().is_empty());
        assert!(form.get_field_state("username").is_dirty);
    }

    #[test]
    fn test_disabled_errors_are_dropped_when_condition_flips() {
        let mut form = FormStateManager::new(json!({ "channel": "yt", "social": { "twitter": "" } }));
        form.register("channel", FieldRules::new()).unwrap();
        form.register(
            "social.twitter",
            FieldRules::new()
                .required("Enter twitter profile")
                .disabled_when(|values| {
                    values
                        .get_path(&FieldPath::from("channel"))
                        .map_or(true, Value::is_empty)
                }),
        )
        .unwrap();

        assert!(!form.trigger("social.twitter"));
        form.handle_change(&FieldPath::from("channel"), "");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_focus_target_prefers_first_invalid_with_ref() {
        let mut form = form();
        form.register("username", FieldRules::new().required("Username is required"))
            .unwrap();
        let channel = form
            .register("channel", FieldRules::new().required("Channel is required"))
            .unwrap();
        channel.set_ref(&mut form, Some(ElementRef::new("channel-input")));

        let outcome = form.handle_submit(|_| panic!("form is invalid"), |_| {});
        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert_eq!(form.focus_target(), Some(&ElementRef::new("channel-input")));
    }

    #[test]
    fn test_focus_target_follows_registration_order() {
        let mut form = FormStateManager::new(json!({ "username": "", "age": 0 }));
        let fields = [
            ("username", "username-input", FieldRules::new().required("Username is required")),
            (
                "age",
                "age-input",
                FieldRules::new().required("Age is required").value_as_number(),
            ),
        ];
        for (path, element, rules) in fields {
            let binding = form.register(path, rules).unwrap();
            binding.set_ref(&mut form, Some(ElementRef::new(element)));
        }
        form.handle_change(&FieldPath::from("age"), "abc");

        form.handle_submit(|_| panic!("form is invalid"), |_| {});
        assert_eq!(form.errors().len(), 2);
        assert_eq!(form.focus_target(), Some(&ElementRef::new("username-input")));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut form = form();
        let username = form
            .register("username", FieldRules::new().required("Username is required"))
            .unwrap();
        username.on_change(&mut form, "bruce");
        username.on_blur(&mut form);
        form.handle_submit(|_| {}, |_| {});

        form.reset(None);
        let state = form.form_state();
        assert_eq!(form.get_value("username"), Some(Value::from("")));
        assert!(state.dirty_fields.is_empty());
        assert!(state.touched_fields.is_empty());
        assert_eq!(state.submit_count, 0);
        assert!(!state.is_submitted);
    }
}
