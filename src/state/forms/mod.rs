//! Form domain layer
//!
//! Schema, values, validation and the state store that owns them.

mod form_state;
mod schema;
mod validator;
mod values;

use thiserror::Error;

pub use form_state::{Focus, FormEvent, FormStore};
pub use schema::{FieldDefinition, FieldKind, FormSchema, FormVariant};
pub use validator::{validate, validate_field, FieldErrors, ValidForm, ValidationResult};
pub use values::{FieldValue, FormValues};

/// Misuse of the form store or schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Field '{0}' is not part of this form")]
    UnknownField(String),

    #[error("Field '{0}' is declared twice")]
    DuplicateField(String),

    #[error("Field '{field}' expects {expected}")]
    KindMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("'{option}' is not an option of field '{field}'")]
    UnknownOption { field: String, option: String },
}
