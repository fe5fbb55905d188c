// File: rusty-forms/src/state.rs
// Purpose: Interaction history and derived read state (dirty, touched, valid)

use rusty_forms_types::{FieldPath, Value};
use rusty_forms_validation::{ErrorMap, FieldError};
use serde::Serialize;
use std::collections::BTreeSet;

/// Accumulated interaction history.
///
/// Touched and dirty marks are monotonic: once set they stay set until a
/// reset, even if the value goes back to its default.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    dirty: BTreeSet<FieldPath>,
    touched: BTreeSet<FieldPath>,
    pub(crate) submit_count: u32,
    pub(crate) is_submitted: bool,
    pub(crate) is_submit_successful: bool,
}

impl Interaction {
    pub fn mark_dirty(&mut self, path: &FieldPath) {
        self.dirty.insert(path.clone());
    }

    pub fn mark_touched(&mut self, path: &FieldPath) {
        self.touched.insert(path.clone());
    }

    pub fn is_dirty(&self, path: &FieldPath) -> bool {
        self.dirty.contains(path)
    }

    pub fn is_touched(&self, path: &FieldPath) -> bool {
        self.touched.contains(path)
    }

    pub fn dirty_fields(&self) -> &BTreeSet<FieldPath> {
        &self.dirty
    }

    pub fn touched_fields(&self) -> &BTreeSet<FieldPath> {
        &self.touched
    }

    /// Drop marks at `prefix` and below
    pub fn forget(&mut self, prefix: &FieldPath) {
        self.dirty.retain(|p| !p.starts_with(prefix));
        self.touched.retain(|p| !p.starts_with(prefix));
    }

    /// Rewrite every marked path, dropping the ones mapped to `None`
    pub(crate) fn remap(&mut self, f: impl Fn(&FieldPath) -> Option<FieldPath>) {
        self.dirty = self.dirty.iter().filter_map(&f).collect();
        self.touched = self.touched.iter().filter_map(&f).collect();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Read state of the whole form, recomputed on request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub is_dirty: bool,
    pub is_valid: bool,
    pub dirty_fields: BTreeSet<FieldPath>,
    pub touched_fields: BTreeSet<FieldPath>,
    /// Errors currently shown, as governed by the validation mode
    pub errors: ErrorMap,
    pub submit_count: u32,
    pub is_submitted: bool,
    pub is_submit_successful: bool,
}

impl FormState {
    /// A submit control is worth enabling: something changed and nothing fails
    pub fn can_submit(&self) -> bool {
        self.is_dirty && self.is_valid
    }
}

/// Point-in-time copy of the form handed to submit handlers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub values: Value,
    pub dirty_fields: BTreeSet<FieldPath>,
    pub touched_fields: BTreeSet<FieldPath>,
    pub is_valid: bool,
    pub is_dirty: bool,
}

impl FormSnapshot {
    pub fn get(&self, path: impl Into<FieldPath>) -> Option<&Value> {
        self.values.get_path(&path.into())
    }
}

/// Read state of one field for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldState {
    pub value: Option<Value>,
    pub is_touched: bool,
    pub is_dirty: bool,
    pub is_disabled: bool,
    pub error: Option<FieldError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marks_are_monotonic_until_reset() {
        let mut interaction = Interaction::default();
        let path = FieldPath::from("username");

        interaction.mark_dirty(&path);
        interaction.mark_touched(&path);
        interaction.mark_dirty(&path);
        assert_eq!(interaction.dirty_fields().len(), 1);
        assert!(interaction.is_dirty(&path));
        assert!(interaction.is_touched(&path));

        interaction.reset();
        assert!(!interaction.is_dirty(&path));
        assert!(!interaction.is_touched(&path));
    }

    #[test]
    fn test_forget_prefix() {
        let mut interaction = Interaction::default();
        interaction.mark_touched(&FieldPath::from("social.twitter"));
        interaction.mark_touched(&FieldPath::from("social.facebook"));
        interaction.mark_touched(&FieldPath::from("channel"));

        interaction.forget(&FieldPath::from("social"));
        let left: Vec<String> = interaction
            .touched_fields()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(left, vec!["channel"]);
    }

    #[test]
    fn test_remap_drops_and_moves() {
        let mut interaction = Interaction::default();
        interaction.mark_dirty(&FieldPath::from("list.0"));
        interaction.mark_dirty(&FieldPath::from("list.1"));

        interaction.remap(|p| {
            if p == &FieldPath::from("list.0") {
                None
            } else {
                Some(FieldPath::from("list.0"))
            }
        });
        assert!(interaction.is_dirty(&FieldPath::from("list.0")));
        assert_eq!(interaction.dirty_fields().len(), 1);
    }
}
