//! Form value objects

use super::schema::FormSchema;
use std::collections::{BTreeMap, BTreeSet};

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Choices(BTreeSet<String>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    /// Get the text value (returns empty string for choice sets)
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s,
            FieldValue::Choices(_) => "",
        }
    }

    /// Get the selected choices (`None` for text values)
    pub fn as_choices(&self) -> Option<&BTreeSet<String>> {
        match self {
            FieldValue::Choices(set) => Some(set),
            FieldValue::Text(_) => None,
        }
    }

    /// Value as it is handed to the email template
    pub fn to_param(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Choices(set) => set.iter().cloned().collect::<Vec<_>>().join(", "),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// One value per schema field, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    /// Empty values for every field of the schema
    pub fn empty_for(schema: &FormSchema) -> Self {
        let entries = schema
            .fields()
            .iter()
            .map(|field| {
                let empty = if field.kind.is_set() {
                    FieldValue::Choices(BTreeSet::new())
                } else {
                    FieldValue::default()
                };
                (field.name.clone(), empty)
            })
            .collect();
        Self(entries)
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub(super) fn get_mut(&mut self, field: &str) -> Option<&mut FieldValue> {
        self.0.get_mut(field)
    }

    pub fn text(&self, field: &str) -> &str {
        self.get(field).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Flatten into the string map sent as template parameters
    pub fn template_params(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_param()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_for_has_one_entry_per_field() {
        let schema = FormSchema::ambassador();
        let values = FormValues::empty_for(&schema);
        assert_eq!(values.len(), schema.len());
        for field in schema.fields() {
            assert!(values.get(&field.name).is_some(), "missing {}", field.name);
        }
    }

    #[test]
    fn test_multi_select_starts_as_empty_set() {
        let values = FormValues::empty_for(&FormSchema::ambassador());
        let areas = values.get("contributionAreas").unwrap();
        assert_eq!(areas.as_choices(), Some(&BTreeSet::new()));
        assert_eq!(values.text("availability"), "");
    }

    #[test]
    fn test_template_params_join_choices() {
        let mut values = FormValues::empty_for(&FormSchema::ambassador());
        *values.get_mut("firstName").unwrap() = "John".into();
        *values.get_mut("contributionAreas").unwrap() = FieldValue::Choices(
            ["Translations", "Event Hosting"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );

        let params = values.template_params();
        assert_eq!(params["firstName"], "John");
        assert_eq!(params["contributionAreas"], "Event Hosting, Translations");
        assert_eq!(params["lastName"], "");
    }

    #[test]
    fn test_text_of_unknown_field_is_empty() {
        let values = FormValues::empty_for(&FormSchema::profile());
        assert_eq!(values.text("phone"), "");
    }
}
