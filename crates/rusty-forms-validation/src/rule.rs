// File: rusty-forms-validation/src/rule.rs
// Purpose: Declarative field rules and their evaluation

use regex::Regex;
use rusty_forms_types::Value;
use std::fmt;
use std::sync::Arc;

use crate::coerce::{coerce_value, is_coercion_failure, ValueAs};
use crate::error::FieldError;

/// Custom check over `(field value, whole form values)`.
///
/// Returns `Err(message)` to reject the value.
pub type ValidateFn = Arc<dyn Fn(&Value, &Value) -> Result<(), String> + Send + Sync>;

/// Disabled condition over the whole form values
pub type DisabledFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Discriminant of a [`Rule`], also the evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKind {
    Disabled,
    Required,
    Pattern,
    Validate,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Disabled => write!(f, "disabled"),
            RuleKind::Required => write!(f, "required"),
            RuleKind::Pattern => write!(f, "pattern"),
            RuleKind::Validate => write!(f, "validate"),
        }
    }
}

/// A single validation rule
#[derive(Clone)]
pub enum Rule {
    Required { message: String },
    Pattern { regex: Regex, message: String },
    Validate(ValidateFn),
    Disabled(DisabledFn),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required { message } => f.debug_struct("Required").field("message", message).finish(),
            Rule::Pattern { regex, message } => f
                .debug_struct("Pattern")
                .field("regex", &regex.as_str())
                .field("message", message)
                .finish(),
            Rule::Validate(_) => f.write_str("Validate(..)"),
            Rule::Disabled(_) => f.write_str("Disabled(..)"),
        }
    }
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Required { .. } => RuleKind::Required,
            Rule::Pattern { .. } => RuleKind::Pattern,
            Rule::Validate(_) => RuleKind::Validate,
            Rule::Disabled(_) => RuleKind::Disabled,
        }
    }

    /// Evaluate this rule alone.
    ///
    /// `value` is `None` when nothing is stored at the field's path.
    /// `Disabled` never fails here; callers check it before anything else.
    pub fn check(&self, value: Option<&Value>, values: &Value) -> Result<(), FieldError> {
        match self {
            Rule::Required { message } => match value {
                Some(v) if !v.is_empty() => Ok(()),
                _ => Err(FieldError::required(message.clone())),
            },
            Rule::Pattern { regex, message } => match value.and_then(Value::as_str) {
                Some(s) if !s.is_empty() && !regex.is_match(s) => {
                    Err(FieldError::pattern(message.clone()))
                }
                _ => Ok(()),
            },
            Rule::Validate(check) => {
                let null = Value::Null;
                check(value.unwrap_or(&null), values).map_err(|message| FieldError::custom(message))
            }
            Rule::Disabled(_) => Ok(()),
        }
    }
}

/// The rules and input options registered for one field.
///
/// ```
/// use rusty_forms_validation::FieldRules;
///
/// let rules = FieldRules::new()
///     .required("Username is required")
///     .validate(|value, _| match value.as_str() {
///         Some("admin@example.com") => Err("Enter a different email address".into()),
///         _ => Ok(()),
///     });
/// assert!(rules.is_required());
/// ```
#[derive(Clone, Default)]
pub struct FieldRules {
    rules: Vec<Rule>,
    value_as: ValueAs,
    coercion_message: Option<String>,
}

impl fmt::Debug for FieldRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRules")
            .field("rules", &self.rules)
            .field("value_as", &self.value_as)
            .field("coercion_message", &self.coercion_message)
            .finish()
    }
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.with_rule(Rule::Required {
            message: message.into(),
        })
    }

    pub fn pattern(self, regex: Regex, message: impl Into<String>) -> Self {
        self.with_rule(Rule::Pattern {
            regex,
            message: message.into(),
        })
    }

    pub fn validate<F>(self, check: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.with_rule(Rule::Validate(Arc::new(check)))
    }

    /// Unconditionally enabled or disabled
    pub fn disabled(self, disabled: bool) -> Self {
        self.with_rule(Rule::Disabled(Arc::new(move |_: &Value| disabled)))
    }

    /// Disabled while `condition` holds for the current form values
    pub fn disabled_when<F>(self, condition: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.with_rule(Rule::Disabled(Arc::new(condition)))
    }

    pub fn value_as_number(mut self) -> Self {
        self.value_as = ValueAs::Number;
        self
    }

    pub fn value_as_date(mut self) -> Self {
        self.value_as = ValueAs::Date;
        self
    }

    /// Report unparseable input on an optional coerced field
    pub fn coercion_message(mut self, message: impl Into<String>) -> Self {
        self.coercion_message = Some(message.into());
        self
    }

    /// Add a rule, replacing an earlier one of the same kind.
    /// `Validate` rules accumulate instead.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.push_rule(rule);
        self
    }

    fn push_rule(&mut self, rule: Rule) {
        let kind = rule.kind();
        if kind != RuleKind::Validate {
            if let Some(existing) = self.rules.iter_mut().find(|r| r.kind() == kind) {
                *existing = rule;
                return;
            }
        }
        self.rules.push(rule);
    }

    /// Merge rules from a repeated registration of the same field.
    ///
    /// Incoming validators replace the registered ones as a set, so
    /// registering on every render keeps one copy of each.
    pub fn merge(&mut self, other: FieldRules) {
        if other.rules.iter().any(|r| r.kind() == RuleKind::Validate) {
            self.rules.retain(|r| r.kind() != RuleKind::Validate);
        }
        for rule in other.rules {
            self.push_rule(rule);
        }
        if other.value_as != ValueAs::Text {
            self.value_as = other.value_as;
        }
        if other.coercion_message.is_some() {
            self.coercion_message = other.coercion_message;
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn value_as(&self) -> ValueAs {
        self.value_as
    }

    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|r| r.kind() == RuleKind::Required)
    }

    /// Whether any disabled condition currently holds
    pub fn is_disabled(&self, values: &Value) -> bool {
        self.rules.iter().any(|rule| match rule {
            Rule::Disabled(condition) => condition(values),
            _ => false,
        })
    }

    /// Apply this field's coercion to a raw input string
    pub fn coerce(&self, raw: &str) -> Value {
        crate::coerce::coerce(raw, self.value_as)
    }

    /// Apply this field's coercion to a programmatically set value
    pub fn coerce_value(&self, value: Value) -> Value {
        coerce_value(value, self.value_as)
    }

    /// Evaluate all rules for a field: required, then pattern, then custom
    /// validators in registration order. The first failure is returned.
    ///
    /// A disabled field always passes.
    pub fn evaluate(&self, value: Option<&Value>, values: &Value) -> Result<(), FieldError> {
        if self.is_disabled(values) {
            return Ok(());
        }

        self.check_kind(RuleKind::Required, value, values)?;

        if let (Some(message), Some(v)) = (&self.coercion_message, value) {
            if is_coercion_failure(v, self.value_as) {
                return Err(FieldError::coercion(message.clone()));
            }
        }

        self.check_kind(RuleKind::Pattern, value, values)?;
        self.check_kind(RuleKind::Validate, value, values)
    }

    fn check_kind(
        &self,
        kind: RuleKind,
        value: Option<&Value>,
        values: &Value,
    ) -> Result<(), FieldError> {
        self.rules
            .iter()
            .filter(|rule| rule.kind() == kind)
            .try_for_each(|rule| rule.check(value, values))
    }
}
