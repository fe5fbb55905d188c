// File: rusty-forms/src/config.rs
// Purpose: Form behaviour configuration, optionally read from rusty-forms.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// When field errors are written to the visible error map before the first submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Only on submit
    OnSubmit,
    /// When a field loses focus
    OnBlur,
    /// On every change
    #[default]
    OnChange,
    /// On the first blur, then on every change
    OnTouched,
    /// On blur and on change, before and after submit
    All,
}

/// When field errors are refreshed after the form has been submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReValidateMode {
    OnBlur,
    #[default]
    OnChange,
    OnSubmit,
}

/// Form configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub mode: ValidationMode,

    #[serde(default)]
    pub re_validate_mode: ReValidateMode,

    /// Point `focus_target` at the first invalid field with a ref after a failed submit
    #[serde(default = "default_true")]
    pub should_focus_error: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::default(),
            re_validate_mode: ReValidateMode::default(),
            should_focus_error: true,
        }
    }
}

impl FormConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read form config: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse form config: {:?}", path))
    }

    /// Load configuration from default path (./rusty-forms.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("rusty-forms.toml")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    /// Whether a change event should write field errors
    pub(crate) fn validates_on_change(&self, is_submitted: bool, is_touched: bool) -> bool {
        if self.mode == ValidationMode::All {
            return true;
        }
        if is_submitted {
            return self.re_validate_mode == ReValidateMode::OnChange;
        }
        match self.mode {
            ValidationMode::OnChange | ValidationMode::All => true,
            ValidationMode::OnTouched => is_touched,
            ValidationMode::OnSubmit | ValidationMode::OnBlur => false,
        }
    }

    /// Whether a blur event should write field errors
    pub(crate) fn validates_on_blur(&self, is_submitted: bool) -> bool {
        if self.mode == ValidationMode::All {
            return true;
        }
        if is_submitted {
            return self.re_validate_mode == ReValidateMode::OnBlur;
        }
        matches!(
            self.mode,
            ValidationMode::OnBlur | ValidationMode::OnTouched | ValidationMode::All
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = FormConfig::default();
        assert_eq!(config.mode, ValidationMode::OnChange);
        assert_eq!(config.re_validate_mode, ReValidateMode::OnChange);
        assert!(config.should_focus_error);
    }

    #[test]
    fn test_empty_config() {
        let config = FormConfig::from_toml_str("").unwrap();
        assert_eq!(config, FormConfig::default());
    }

    #[test]
    fn test_custom_modes() {
        let toml = r#"
            mode = "on_submit"
            re_validate_mode = "on_blur"
            should_focus_error = false
        "#;
        let config = FormConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.mode, ValidationMode::OnSubmit);
        assert_eq!(config.re_validate_mode, ReValidateMode::OnBlur);
        assert!(!config.should_focus_error);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(FormConfig::from_toml_str(r#"mode = "sometimes""#).is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = FormConfig::load("does/not/exist/rusty-forms.toml").unwrap();
        assert_eq!(config, FormConfig::default());
    }

    #[rstest]
    #[case(ValidationMode::OnSubmit, false, false, false)]
    #[case(ValidationMode::OnChange, false, false, true)]
    #[case(ValidationMode::OnTouched, false, false, false)]
    #[case(ValidationMode::OnTouched, false, true, true)]
    #[case(ValidationMode::OnSubmit, true, false, true)]
    #[case(ValidationMode::All, true, false, true)]
    fn test_validates_on_change(
        #[case] mode: ValidationMode,
        #[case] submitted: bool,
        #[case] touched: bool,
        #[case] expected: bool,
    ) {
        let config = FormConfig {
            mode,
            ..FormConfig::default()
        };
        assert_eq!(config.validates_on_change(submitted, touched), expected);
    }

    #[rstest]
    #[case(ValidationMode::OnChange, false, false)]
    #[case(ValidationMode::OnBlur, false, true)]
    #[case(ValidationMode::All, false, true)]
    #[case(ValidationMode::OnBlur, true, false)]
    #[case(ValidationMode::All, true, true)]
    fn test_validates_on_blur(
        #[case] mode: ValidationMode,
        #[case] submitted: bool,
        #[case] expected: bool,
    ) {
        let config = FormConfig {
            mode,
            ..FormConfig::default()
        };
        assert_eq!(config.validates_on_blur(submitted), expected);
    }
}
