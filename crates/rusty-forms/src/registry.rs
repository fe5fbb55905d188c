// File: rusty-forms/src/registry.rs
// Purpose: Registered fields, their rules and the bindings handed to the presentation layer

use rusty_forms_types::FieldPath;
use rusty_forms_validation::FieldRules;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use crate::form::FormStateManager;

/// Opaque handle to the input element a field is rendered into (a DOM id, a widget key...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ElementRef(pub String);

impl ElementRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered field
#[derive(Debug, Clone)]
pub struct FieldEntry {
    pub path: FieldPath,
    pub rules: FieldRules,
    pub element: Option<ElementRef>,
    /// Registration order; survives array reindexing
    pub order: u64,
}

/// Returned by `register`: the field name plus handlers to wire to an input.
///
/// Handlers take the form explicitly; there is no ambient form instance.
///
/// ```
/// use rusty_forms::{FieldRules, FormStateManager};
///
/// let mut form = FormStateManager::default();
/// let username = form.register("username", FieldRules::new()).unwrap();
/// username.on_change(&mut form, "bruce");
/// username.on_blur(&mut form);
/// assert!(form.get_field_state("username").is_touched);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub name: FieldPath,
}

impl FieldBinding {
    /// Input event carrying the raw text of the control
    pub fn on_change(&self, form: &mut FormStateManager, raw: &str) {
        form.handle_change(&self.name, raw);
    }

    /// Focus left the control
    pub fn on_blur(&self, form: &mut FormStateManager) {
        form.handle_blur(&self.name);
    }

    /// Attach (or with `None`, detach) the rendered element
    pub fn set_ref(&self, form: &mut FormStateManager, element: Option<ElementRef>) {
        form.set_ref(&self.name, element);
    }
}

/// Registered fields by path
#[derive(Debug, Clone, Default)]
pub struct Registry {
    fields: BTreeMap<FieldPath, FieldEntry>,
    next_order: u64,
}

impl Registry {
    /// Create the entry, or merge `rules` into the existing one
    pub fn register(&mut self, path: &FieldPath, rules: FieldRules) -> &FieldEntry {
        match self.fields.entry(path.clone()) {
            Entry::Occupied(occupied) => {
                let entry = occupied.into_mut();
                entry.rules.merge(rules);
                entry
            }
            Entry::Vacant(vacant) => {
                let order = self.next_order;
                self.next_order += 1;
                vacant.insert(FieldEntry {
                    path: path.clone(),
                    rules,
                    element: None,
                    order,
                })
            }
        }
    }

    /// Drop every entry at `prefix` and below
    pub fn unregister_under(&mut self, prefix: &FieldPath) -> usize {
        let before = self.fields.len();
        self.fields.retain(|path, _| !path.starts_with(prefix));
        before - self.fields.len()
    }

    pub fn get(&self, path: &FieldPath) -> Option<&FieldEntry> {
        self.fields.get(path)
    }

    pub fn get_mut(&mut self, path: &FieldPath) -> Option<&mut FieldEntry> {
        self.fields.get_mut(path)
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.fields.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldEntry> {
        self.fields.values()
    }

    /// Of `paths`, the registered one with a ref that was registered first
    pub fn first_with_element<'a>(
        &self,
        paths: impl IntoIterator<Item = &'a FieldPath>,
    ) -> Option<&FieldEntry> {
        paths
            .into_iter()
            .filter_map(|path| self.fields.get(path))
            .filter(|entry| entry.element.is_some())
            .min_by_key(|entry| entry.order)
    }

    /// Entries at `prefix` and below, in tree order
    pub fn under<'a>(&'a self, prefix: &'a FieldPath) -> impl Iterator<Item = &'a FieldEntry> + 'a {
        self.fields
            .range(prefix.clone()..)
            .take_while(move |(path, _)| path.starts_with(prefix))
            .map(|(_, entry)| entry)
    }

    /// Rewrite every registered path, dropping the ones mapped to `None`
    pub(crate) fn remap(&mut self, f: impl Fn(&FieldPath) -> Option<FieldPath>) {
        let fields = std::mem::take(&mut self.fields);
        self.fields = fields
            .into_values()
            .filter_map(|mut entry| {
                let path = f(&entry.path)?;
                entry.path = path.clone();
                Some((path, entry))
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_forms_validation::RuleKind;

    #[test]
    fn test_register_twice_merges() {
        let mut registry = Registry::default();
        let path = FieldPath::from("channel");

        registry.register(&path, FieldRules::new().required("Channel is required"));
        registry.register(&path, FieldRules::new().required("Channel needed").validate(|_, _| Ok(())));

        assert_eq!(registry.len(), 1);
        let kinds: Vec<RuleKind> = registry
            .get(&path)
            .unwrap()
            .rules
            .rules()
            .iter()
            .map(|r| r.kind())
            .collect();
        assert_eq!(kinds, vec![RuleKind::Required, RuleKind::Validate]);
    }

    #[test]
    fn test_first_with_element_follows_registration_order() {
        let mut registry = Registry::default();
        for path in ["username", "email", "age"] {
            registry.register(&FieldPath::from(path), FieldRules::new());
        }
        for path in ["username", "age"] {
            registry.get_mut(&FieldPath::from(path)).unwrap().element =
                Some(ElementRef::new(path));
        }

        let errored = [FieldPath::from("age"), FieldPath::from("email"), FieldPath::from("username")];
        let first = registry.first_with_element(&errored).unwrap();
        assert_eq!(first.path, FieldPath::from("username"));

        // a repeat registration keeps the original position
        registry.register(&FieldPath::from("username"), FieldRules::new());
        assert_eq!(registry.get(&FieldPath::from("username")).unwrap().order, 0);
    }

    #[test]
    fn test_under_prefix() {
        let mut registry = Registry::default();
        for path in ["social.twitter", "social.facebook", "socialite", "channel"] {
            registry.register(&FieldPath::from(path), FieldRules::new());
        }

        let social = FieldPath::from("social");
        let under: Vec<String> = registry.under(&social).map(|e| e.path.to_string()).collect();
        assert_eq!(under, vec!["social.facebook", "social.twitter"]);

        assert_eq!(registry.unregister_under(&social), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remap_moves_entries() {
        let mut registry = Registry::default();
        registry.register(&FieldPath::from("phNumbers.1.number"), FieldRules::new());

        registry.remap(|p| Some(p.with_index_under(&FieldPath::from("phNumbers"), 0)));
        let entry = registry.get(&FieldPath::from("phNumbers.0.number")).unwrap();
        assert_eq!(entry.path, FieldPath::from("phNumbers.0.number"));
    }
}
