//! rusty-forms validation
//!
//! Declarative per-field rules evaluated as pure functions over
//! `(value, rule, whole form values)`.
//!
//! - [`Rule`] / [`FieldRules`] - required, pattern, custom validate and disabled rules
//! - [`ValueAs`] - numeric and date coercion of raw input strings
//! - [`FieldError`] / [`ErrorMap`] - field-scoped, recoverable validation failures

pub mod coerce;
pub mod error;
pub mod rule;

pub use coerce::{coerce, coerce_value, ValueAs};
pub use error::{ErrorKind, ErrorMap, FieldError};
pub use rule::{DisabledFn, FieldRules, Rule, RuleKind, ValidateFn};
