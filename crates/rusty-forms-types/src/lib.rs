//! Core data types for rusty-forms
//!
//! - [`Value`] - the nested value tree a form stores (objects, arrays, typed leaves)
//! - [`FieldPath`] - dotted addresses into that tree (`social.twitter`, `phNumbers.0.number`)
//!
//! Both are plain owned data with no knowledge of registration or validation,
//! so they can be shared between the validation crate and the state manager.

pub mod path;
pub mod value;

pub use path::{FieldPath, PathError, Seg};
pub use value::{Object, Value};
