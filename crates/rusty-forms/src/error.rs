// File: rusty-forms/src/error.rs
// Purpose: Errors for misuse of the form API (validation failures are data, not errors)

use rusty_forms_types::FieldPath;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("cannot register the form root as a field")]
    RootPath,

    #[error("value at `{0}` is not an array")]
    NotAnArray(FieldPath),

    #[error("index {index} out of bounds for `{path}` (len {len})")]
    IndexOutOfBounds {
        path: FieldPath,
        index: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, FormError>;
