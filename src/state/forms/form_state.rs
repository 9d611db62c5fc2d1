//! Form state store
//!
//! Holds the canonical values, error messages and focus of one form. Render
//! layers subscribe to [`FormEvent`]s instead of polling for changes.

use super::schema::{FieldDefinition, FieldKind, FormSchema};
use super::validator::{self, FieldErrors, ValidationResult};
use super::values::{FieldValue, FormValues};
use super::FormError;
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Change notifications published by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    ValueChanged { field: String },
    ErrorsChanged,
}

/// What currently has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Field(usize),
    Submit,
}

pub struct FormStore {
    schema: FormSchema,
    values: FormValues,
    errors: FieldErrors,
    /// 0..len are fields, len is the submit button
    focus_index: usize,
    /// Highlighted option within a focused choice field
    option_cursor: usize,
    events: broadcast::Sender<FormEvent>,
}

impl FormStore {
    pub fn new(schema: FormSchema) -> Self {
        let values = FormValues::empty_for(&schema);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            schema,
            values,
            errors: FieldErrors::new(),
            focus_index: 0,
            option_cursor: 0,
            events,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Snapshot of the current values
    pub fn values(&self) -> FormValues {
        self.values.clone()
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Subscribe to value and error changes
    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: FormEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn definition(&self, field: &str) -> Result<&FieldDefinition, FormError> {
        self.schema
            .field(field)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))
    }

    /// Replace the value of a field without validating it
    pub fn set_value(&mut self, field: &str, value: FieldValue) -> Result<(), FormError> {
        let definition = self.definition(field)?;
        match (&value, definition.kind.is_set()) {
            (FieldValue::Choices(_), false) => {
                return Err(FormError::KindMismatch {
                    field: field.to_string(),
                    expected: "text",
                })
            }
            (FieldValue::Text(_), true) => {
                return Err(FormError::KindMismatch {
                    field: field.to_string(),
                    expected: "a set of choices",
                })
            }
            _ => {}
        }

        if let Some(slot) = self.values.get_mut(field) {
            *slot = value;
        }
        self.publish(FormEvent::ValueChanged {
            field: field.to_string(),
        });
        Ok(())
    }

    /// Add `item` to a multi-select field, or remove it if already selected
    pub fn toggle_set_member(&mut self, field: &str, item: &str) -> Result<(), FormError> {
        let definition = self.definition(field)?;
        if !definition.kind.is_set() {
            return Err(FormError::KindMismatch {
                field: field.to_string(),
                expected: "a set of choices",
            });
        }
        if !definition.kind.options().iter().any(|o| o == item) {
            return Err(FormError::UnknownOption {
                field: field.to_string(),
                option: item.to_string(),
            });
        }

        if let Some(FieldValue::Choices(set)) = self.values.get_mut(field) {
            if !set.remove(item) {
                set.insert(item.to_string());
            }
        }
        self.publish(FormEvent::ValueChanged {
            field: field.to_string(),
        });
        Ok(())
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn set_errors(&mut self, errors: FieldErrors) {
        if self.errors != errors {
            self.errors = errors;
            self.publish(FormEvent::ErrorsChanged);
        }
    }

    /// Validate all fields and keep the resulting messages
    pub fn validate(&mut self) -> ValidationResult {
        let result = validator::validate(&self.schema, &self.values);
        self.set_errors(result.errors());
        result
    }

    /// Re-check one field and update only its message
    pub fn revalidate_field(&mut self, field: &str) -> Result<(), FormError> {
        let definition = self.definition(field)?;
        let empty = FieldValue::default();
        let value = self.values.get(field).unwrap_or(&empty);
        let message = validator::validate_field(definition, value);

        let mut errors = self.errors.clone();
        match message {
            Some(message) => errors.insert(field.to_string(), message),
            None => errors.remove(field),
        };
        self.set_errors(errors);
        Ok(())
    }

    pub fn focus(&self) -> Focus {
        if self.focus_index < self.schema.len() {
            Focus::Field(self.focus_index)
        } else {
            Focus::Submit
        }
    }

    pub fn focused_field(&self) -> Option<&FieldDefinition> {
        self.schema.fields().get(self.focus_index)
    }

    fn focus_count(&self) -> usize {
        self.schema.len() + 1
    }

    pub fn next_focus(&mut self) {
        self.focus_index = (self.focus_index + 1) % self.focus_count();
        self.option_cursor = 0;
    }

    pub fn prev_focus(&mut self) {
        if self.focus_index == 0 {
            self.focus_index = self.focus_count() - 1;
        } else {
            self.focus_index -= 1;
        }
        self.option_cursor = 0;
    }

    pub fn option_cursor(&self) -> usize {
        self.option_cursor
    }

    fn focused_option_count(&self) -> usize {
        self.focused_field().map_or(0, |f| f.kind.options().len())
    }

    pub fn next_option(&mut self) {
        let count = self.focused_option_count();
        if count > 0 {
            self.option_cursor = (self.option_cursor + 1) % count;
        }
    }

    pub fn prev_option(&mut self) {
        let count = self.focused_option_count();
        if count > 0 {
            self.option_cursor = (self.option_cursor + count - 1) % count;
        }
    }

    /// Toggle or select the highlighted option of the focused choice field
    pub fn activate_option(&mut self) -> Result<(), FormError> {
        let Some(field) = self.focused_field() else {
            return Ok(());
        };
        let Some(option) = field.kind.options().get(self.option_cursor).cloned() else {
            return Ok(());
        };
        let name = field.name.clone();
        if matches!(field.kind, FieldKind::MultiSelect { .. }) {
            self.toggle_set_member(&name, &option)
        } else {
            self.set_value(&name, FieldValue::Text(option))
        }
    }

    /// Append a character to the focused text field
    pub fn push_char(&mut self, c: char) -> Result<(), FormError> {
        self.edit_focused_text(|text| text.push(c))
    }

    /// Remove the last character of the focused text field
    pub fn pop_char(&mut self) -> Result<(), FormError> {
        self.edit_focused_text(|text| {
            text.pop();
        })
    }

    /// Start a new line in the focused multi-line field
    pub fn newline(&mut self) -> Result<(), FormError> {
        if !self.focused_field().is_some_and(|f| f.kind.is_multiline()) {
            return Ok(());
        }
        self.edit_focused_text(|text| text.push('\n'))
    }

    fn edit_focused_text(&mut self, edit: impl FnOnce(&mut String)) -> Result<(), FormError> {
        let Some(field) = self.focused_field() else {
            return Ok(());
        };
        if field.kind.is_choice() {
            return Ok(());
        }
        let name = field.name.clone();
        let mut text = self.values.text(&name).to_string();
        edit(&mut text);
        self.set_value(&name, FieldValue::Text(text))
    }
}
