//! Field schema: the declarative description of a form

use super::FormError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Labels offered by the contribution-area checkboxes
pub const CONTRIBUTION_AREAS: &[&str] = &[
    "Content Creation",
    "Community Moderation",
    "Translations",
    "Event Hosting",
    "Social Media",
    "Technical Writing",
];

/// Choices offered by the availability selector
pub const AVAILABILITY_OPTIONS: &[&str] = &[
    "A few hours a month",
    "A few hours a week",
    "Part-time",
];

/// What kind of control a field is and the rule attached to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Single-line text
    Text,
    /// Multi-line text
    MultiLine,
    /// Single-line text that must look like an email address
    Email,
    /// Exactly one value out of a fixed list
    SingleSelect { options: Vec<String> },
    /// Any subset of a fixed list, with a lower bound on its size
    MultiSelect {
        options: Vec<String>,
        min_selections: usize,
    },
}

impl FieldKind {
    pub fn single_select(options: &[&str]) -> Self {
        FieldKind::SingleSelect {
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }

    pub fn multi_select(options: &[&str], min_selections: usize) -> Self {
        FieldKind::MultiSelect {
            options: options.iter().map(|o| o.to_string()).collect(),
            min_selections,
        }
    }

    /// Options of a choice field (empty for text fields)
    pub fn options(&self) -> &[String] {
        match self {
            FieldKind::SingleSelect { options } | FieldKind::MultiSelect { options, .. } => {
                options
            }
            _ => &[],
        }
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, FieldKind::MultiLine)
    }

    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldKind::SingleSelect { .. } | FieldKind::MultiSelect { .. }
        )
    }

    /// Whether the field holds a set of values rather than a string
    pub fn is_set(&self) -> bool {
        matches!(self, FieldKind::MultiSelect { .. })
    }
}

/// Represents a single form field with its configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub placeholder: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Shown when a required field is left empty
    pub message: String,
}

impl FieldDefinition {
    /// Create a required field
    pub fn required(name: &str, label: &str, kind: FieldKind, message: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            placeholder: String::new(),
            kind,
            required: true,
            message: message.to_string(),
        }
    }

    /// Create an optional field
    pub fn optional(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            placeholder: String::new(),
            kind,
            required: false,
            message: String::new(),
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }
}

/// Which built-in schema to present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormVariant {
    /// Name, email, skills and experience
    Profile,
    /// Profile plus availability and contribution areas
    #[default]
    Ambassador,
}

/// An ordered, immutable set of field definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    title: String,
    intro: String,
    fields: Vec<FieldDefinition>,
}

impl FormSchema {
    /// Build a schema, rejecting duplicate field names
    pub fn new(
        title: &str,
        intro: &str,
        fields: Vec<FieldDefinition>,
    ) -> Result<Self, FormError> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self {
            title: title.to_string(),
            intro: intro.to_string(),
            fields,
        })
    }

    pub fn for_variant(variant: FormVariant) -> Self {
        match variant {
            FormVariant::Profile => Self::profile(),
            FormVariant::Ambassador => Self::ambassador(),
        }
    }

    /// The original five-field form
    pub fn profile() -> Self {
        Self {
            title: "PraSaga Ambassadors Form".to_string(),
            intro: "PraSaga is looking for passionate ambassadors to join our mission."
                .to_string(),
            fields: profile_fields(),
        }
    }

    /// The profile form plus availability and contribution areas
    pub fn ambassador() -> Self {
        let mut fields = profile_fields();
        fields.push(FieldDefinition::required(
            "availability",
            "Availability",
            FieldKind::single_select(AVAILABILITY_OPTIONS),
            "Availability is required.",
        ));
        fields.push(FieldDefinition::required(
            "contributionAreas",
            "Contribution Areas",
            FieldKind::multi_select(CONTRIBUTION_AREAS, 1),
            "Select at least one contribution area.",
        ));
        Self {
            fields,
            ..Self::profile()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn intro(&self) -> &str {
        &self.intro
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

fn profile_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::required(
            "firstName",
            "First Name",
            FieldKind::Text,
            "First name is required.",
        )
        .with_placeholder("John"),
        FieldDefinition::required(
            "lastName",
            "Last Name",
            FieldKind::Text,
            "Last name is required.",
        )
        .with_placeholder("Doe"),
        FieldDefinition::required("email", "Email", FieldKind::Email, "Email is required.")
            .with_placeholder("john.doe@example.com"),
        FieldDefinition::required(
            "skills",
            "Skills",
            FieldKind::MultiLine,
            "Skills are required.",
        )
        .with_placeholder("List your skills here..."),
        FieldDefinition::required(
            "experience",
            "Experience",
            FieldKind::MultiLine,
            "Experience is required.",
        )
        .with_placeholder("Describe your experience here..."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_profile_field_order() {
        let schema = FormSchema::profile();
        let names: Vec<_> = schema.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["firstName", "lastName", "email", "skills", "experience"]
        );
    }

    #[test]
    fn test_ambassador_extends_profile() {
        let schema = FormSchema::ambassador();
        assert_eq!(schema.len(), 7);
        assert_eq!(schema.position("contributionAreas"), Some(6));
        let areas = schema.field("contributionAreas").unwrap();
        assert!(areas.kind.is_set());
        assert!(areas.kind.options().iter().any(|o| o == "Translations"));
    }

    #[test]
    fn test_variant_selects_schema() {
        assert_eq!(
            FormSchema::for_variant(FormVariant::Profile),
            FormSchema::profile()
        );
        assert_eq!(FormVariant::default(), FormVariant::Ambassador);
    }

    #[test]
    fn test_builtin_names_are_unique() {
        for schema in [FormSchema::profile(), FormSchema::ambassador()] {
            let rebuilt = FormSchema::new(schema.title(), schema.intro(), schema.fields().to_vec());
            assert!(rebuilt.is_ok());
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let fields = vec![
            FieldDefinition::optional("nickname", "Nickname", FieldKind::Text),
            FieldDefinition::optional("nickname", "Alias", FieldKind::Text),
        ];
        let err = FormSchema::new("Form", "", fields).unwrap_err();
        assert!(matches!(err, FormError::DuplicateField(name) if name == "nickname"));
    }

    #[test]
    fn test_unknown_field_lookup() {
        let schema = FormSchema::profile();
        assert!(schema.field("phone").is_none());
        assert!(schema.position("phone").is_none());
    }

    #[test]
    fn test_variant_deserializes_lowercase() {
        let variant: FormVariant = serde_json::from_str("\"profile\"").unwrap();
        assert_eq!(variant, FormVariant::Profile);
    }

    #[test]
    fn test_text_kinds_have_no_options() {
        assert!(FieldKind::Email.options().is_empty());
        assert!(FieldKind::MultiLine.is_multiline());
        assert!(!FieldKind::Text.is_choice());
    }
}
