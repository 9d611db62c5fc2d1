//! Validation of form values against a schema
//!
//! Every field is checked on its own; there are no cross-field rules. All
//! failures are collected in one pass so the user sees every outstanding
//! problem at once.

use super::schema::{FieldDefinition, FieldKind, FormSchema};
use super::values::{FieldValue, FormValues};
use regex::Regex;
use std::collections::BTreeMap;

pub const INVALID_EMAIL: &str = "Invalid email address.";
pub const INVALID_CHOICE: &str = "Choose one of the listed options.";

lazy_static::lazy_static! {
    /// local-part "@" domain, with at least one dot in the domain
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is valid");
}

/// Error message per failing field
pub type FieldErrors = BTreeMap<String, String>;

/// Form values that passed validation
///
/// Only [`validate`] constructs this, so holding one proves the values were
/// checked against the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidForm(FormValues);

impl ValidForm {
    pub fn values(&self) -> &FormValues {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(ValidForm),
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    /// Errors of an invalid result (empty when valid)
    pub fn errors(&self) -> FieldErrors {
        match self {
            ValidationResult::Valid(_) => FieldErrors::new(),
            ValidationResult::Invalid(errors) => errors.clone(),
        }
    }
}

/// Check every field of `values` against `schema`
pub fn validate(schema: &FormSchema, values: &FormValues) -> ValidationResult {
    let empty = FieldValue::default();
    let errors: FieldErrors = schema
        .fields()
        .iter()
        .filter_map(|field| {
            let value = values.get(&field.name).unwrap_or(&empty);
            validate_field(field, value).map(|message| (field.name.clone(), message))
        })
        .collect();

    if errors.is_empty() {
        ValidationResult::Valid(ValidForm(values.clone()))
    } else {
        ValidationResult::Invalid(errors)
    }
}

/// Check a single field, returning its error message if it fails
pub fn validate_field(field: &FieldDefinition, value: &FieldValue) -> Option<String> {
    match &field.kind {
        FieldKind::MultiSelect { min_selections, .. } => {
            let selected = value.as_choices().map_or(0, |set| set.len());
            let minimum = if field.required {
                (*min_selections).max(1)
            } else {
                *min_selections
            };
            (selected < minimum).then(|| field.message.clone())
        }
        kind => {
            let text = value.as_text().trim();
            if text.is_empty() {
                return field.required.then(|| field.message.clone());
            }
            match kind {
                FieldKind::Email if !EMAIL_PATTERN.is_match(text) => {
                    Some(INVALID_EMAIL.to_string())
                }
                FieldKind::SingleSelect { options } if !options.iter().any(|o| o == text) => {
                    Some(INVALID_CHOICE.to_string())
                }
                _ => None,
            }
        }
    }
}
