//! # rusty-forms
//!
//! Client-side form state: registered fields over a nested value tree,
//! declarative validation rules, dynamic field arrays with stable item ids,
//! derived dirty/touched/valid state and change watchers.
//!
//! ## Quick Start
//!
//! ```rust
//! use rusty_forms::{FieldRules, FormStateManager, SubmitOutcome, Value};
//! use serde_json::json;
//!
//! let mut form = FormStateManager::new(json!({ "username": "", "channel": "" }));
//! let username = form
//!     .register("username", FieldRules::new().required("Username is required"))
//!     .unwrap();
//!
//! username.on_change(&mut form, "");
//! assert_eq!(form.errors().message("username"), Some("Username is required"));
//!
//! username.on_change(&mut form, "Batman");
//! let outcome = form.handle_submit(
//!     |snapshot| assert_eq!(snapshot.get("username"), Some(&Value::from("Batman"))),
//!     |errors| panic!("unexpected errors: {:?}", errors),
//! );
//! assert_eq!(outcome, SubmitOutcome::Valid);
//! ```
//!
//! ## Architecture
//!
//! - **`rusty-forms-types`** - `Value` tree and `FieldPath` addressing
//! - **`rusty-forms-validation`** - rules, coercion and error maps (pure)
//! - **`rusty-forms`** (this crate) - the stateful `FormStateManager`

pub mod config;
pub mod error;
pub mod field_array;
pub mod form;
pub mod inspector;
pub mod registry;
pub mod state;
pub mod store;
pub mod watch;

pub use config::{FormConfig, ReValidateMode, ValidationMode};
pub use error::{FormError, Result};
pub use field_array::{ArrayFieldItem, FieldArray, ItemId};
pub use form::{FormStateManager, SubmitOutcome};
pub use inspector::{InspectedField, InspectorSnapshot};
pub use registry::{ElementRef, FieldBinding, FieldEntry};
pub use state::{FieldState, FormSnapshot, FormState};
pub use store::SetValueOptions;
pub use watch::{EventKind, SubscriptionId, WatchEvent, WatchTarget, Watched};

pub use rusty_forms_types::{FieldPath, Object, PathError, Seg, Value};
pub use rusty_forms_validation::{ErrorKind, ErrorMap, FieldError, FieldRules, Rule, RuleKind, ValueAs};
