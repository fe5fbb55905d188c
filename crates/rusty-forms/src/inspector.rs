// File: rusty-forms/src/inspector.rs
// Purpose: Serializable dump of a form's full state for debugging panels and logs

use rusty_forms_validation::ValueAs;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::form::FormStateManager;

/// One registered field as the inspector shows it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectedField {
    pub name: String,
    pub rules: Vec<String>,
    pub value_as: ValueAs,
    pub is_disabled: bool,
    pub is_dirty: bool,
    pub is_touched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything the form knows, at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorSnapshot {
    pub form_id: Uuid,
    pub values: JsonValue,
    pub default_values: JsonValue,
    pub errors: JsonValue,
    pub dirty_fields: Vec<String>,
    pub touched_fields: Vec<String>,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub submit_count: u32,
    pub is_submitted: bool,
    pub is_submit_successful: bool,
    pub fields: Vec<InspectedField>,
    /// Item ids per field array
    pub field_arrays: BTreeMap<String, Vec<String>>,
    pub subscriptions: usize,
}

impl InspectorSnapshot {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl FormStateManager {
    /// Capture the full state; reading it has no effect on the form
    pub fn inspect(&self) -> InspectorSnapshot {
        let values = self.store.values();
        let fields = self
            .registry
            .iter()
            .map(|entry| InspectedField {
                name: entry.path.to_string(),
                rules: entry.rules.rules().iter().map(|r| r.kind().to_string()).collect(),
                value_as: entry.rules.value_as(),
                is_disabled: entry.rules.is_disabled(values),
                is_dirty: self.interaction.is_dirty(&entry.path),
                is_touched: self.interaction.is_touched(&entry.path),
                element: entry.element.as_ref().map(ToString::to_string),
                error: self.errors.message(&entry.path).map(str::to_string),
            })
            .collect();

        InspectorSnapshot {
            form_id: self.id,
            values: values.to_json(),
            default_values: self.store.defaults().to_json(),
            errors: self.errors.to_tree(),
            dirty_fields: self.interaction.dirty_fields().iter().map(ToString::to_string).collect(),
            touched_fields: self
                .interaction
                .touched_fields()
                .iter()
                .map(ToString::to_string)
                .collect(),
            is_dirty: self.is_dirty(),
            is_valid: self.is_valid(),
            submit_count: self.interaction.submit_count,
            is_submitted: self.interaction.is_submitted,
            is_submit_successful: self.interaction.is_submit_successful,
            fields,
            field_arrays: self
                .arrays
                .iter()
                .map(|(path, ids)| (path.to_string(), ids.iter().map(ToString::to_string).collect()))
                .collect(),
            subscriptions: self.watchers.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_forms_validation::FieldRules;
    use serde_json::json;

    #[test]
    fn test_inspect_reports_fields_and_errors() {
        let mut form = FormStateManager::new(json!({ "username": "", "age": 0 }));
        form.register("username", FieldRules::new().required("Username is required"))
            .unwrap();
        form.register("age", FieldRules::new().value_as_number()).unwrap();
        form.trigger_all();

        let snapshot = form.inspect();
        assert_eq!(snapshot.form_id, form.id());
        assert_eq!(snapshot.fields.len(), 2);
        assert!(!snapshot.is_valid);
        assert_eq!(
            snapshot.errors["username"]["message"],
            json!("Username is required")
        );

        let age = snapshot.fields.iter().find(|f| f.name == "age").unwrap();
        assert_eq!(age.value_as, ValueAs::Number);
        assert!(age.rules.is_empty());
    }

    #[test]
    fn test_to_json_pretty_uses_camel_case() {
        let mut form = FormStateManager::new(json!({ "phNumbers": [{ "number": "" }] }));
        form.field_array("phNumbers").unwrap();

        let rendered = form.inspect().to_json_pretty().unwrap();
        assert!(rendered.contains("\"formId\""));
        assert!(rendered.contains("\"fieldArrays\""));
        assert!(rendered.contains("item-0"));
    }
}
