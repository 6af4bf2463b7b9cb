//! Core form types for formdesk.
//!
//! This module defines the data model shared by the registry, the field
//! editor and the submission store: field definitions, form definitions,
//! typed field values and submissions. The serialized shape matches the JSON
//! collections kept under the `customForms` and `formSubmissions` keys.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of input a field collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FieldType {
    /// Single-line text.
    #[default]
    Text,
    /// Numeric input.
    Number,
    /// Email address.
    Email,
    /// Calendar date (`YYYY-MM-DD`).
    Date,
    /// Multi-line text.
    Textarea,
    /// One choice out of a fixed option list.
    Select,
    /// Boolean tick box.
    Checkbox,
}

impl FieldType {
    /// Every field type, in the order the editor offers them.
    pub const ALL: [Self; 7] = [
        Self::Text,
        Self::Number,
        Self::Email,
        Self::Date,
        Self::Textarea,
        Self::Select,
        Self::Checkbox,
    ];

    /// The lowercase name used in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Email => "email",
            Self::Date => "date",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
        }
    }

    /// Parse a stored type name. Unknown names fall back to [`FieldType::Text`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .unwrap_or(Self::Text)
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input specification within a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    /// Identifier, unique within the owning form.
    pub id: String,

    /// Kind of input.
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Human-readable label, also used as the export column header.
    pub label: String,

    /// Whether a value must be given before submitting.
    #[serde(default)]
    pub required: bool,

    /// Choices for `select` fields; empty for every other type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    /// Hint shown in empty inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FormField {
    /// Create a field with no options and no placeholder.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        field_type: FieldType,
        label: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required,
            options: Vec::new(),
            placeholder: None,
        }
    }

    /// Attach select options. Ignored unless the field is a `select`.
    #[must_use]
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.field_type == FieldType::Select {
            self.options = options.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Attach a placeholder.
    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Whether `value` satisfies the `required` flag.
    ///
    /// Checkboxes must be ticked; every other type needs a non-empty value.
    #[must_use]
    pub fn is_satisfied_by(&self, value: Option<&FieldValue>) -> bool {
        if !self.required {
            return true;
        }
        match value {
            None => false,
            Some(FieldValue::Bool(checked)) => *checked,
            Some(FieldValue::Text(text)) => !text.trim().is_empty(),
            Some(FieldValue::Number(_)) => true,
        }
    }
}

/// A user-authored form schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Identifier derived from the creation time.
    pub id: String,
    /// Title shown in the registry and used for the export file name.
    pub title: String,
    /// Ordered field list.
    #[serde(default)]
    pub fields: Vec<FormField>,
}

impl FormDefinition {
    /// Create an empty form.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// Look up a field by id.
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Look up a field by id, or failing that by exact label.
    #[must_use]
    pub fn find_field(&self, reference: &str) -> Option<&FormField> {
        self.field(reference)
            .or_else(|| self.fields.iter().find(|f| f.label == reference))
    }

    /// Labels of required fields that `data` leaves unsatisfied, in field order.
    #[must_use]
    pub fn missing_required(&self, data: &FormData) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| !f.is_satisfied_by(data.get(&f.id)))
            .map(|f| f.label.clone())
            .collect()
    }
}

/// A value entered for one field.
///
/// The variant follows the field type: `Number` for number fields, `Bool`
/// for checkboxes, `Text` for everything else. Stored untagged, so the JSON
/// form is a bare string, number or boolean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Checkbox state.
    Bool(bool),
    /// Numeric input.
    Number(f64),
    /// Any textual input.
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Values keyed by field id.
pub type FormData = BTreeMap<String, FieldValue>;

/// One saved response to a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    /// Id of the form this responds to.
    pub form_id: String,
    /// When the response was saved.
    pub timestamp: DateTime<Utc>,
    /// Entered values.
    #[serde(default)]
    pub data: FormData,
}

impl FormSubmission {
    /// Create a submission stamped with `timestamp`.
    #[must_use]
    pub fn new(form_id: impl Into<String>, timestamp: DateTime<Utc>, data: FormData) -> Self {
        Self {
            form_id: form_id.into(),
            timestamp,
            data,
        }
    }

    /// The stringified value for `field_id`, or an empty string when absent.
    #[must_use]
    pub fn cell(&self, field_id: &str) -> String {
        self.data
            .get(field_id)
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_roundtrip_names() {
        for t in FieldType::ALL {
            assert_eq!(FieldType::parse(t.as_str()), t);
        }
    }

    #[test]
    fn test_unknown_field_type_falls_back_to_text() {
        assert_eq!(FieldType::parse("color"), FieldType::Text);
        let field: FormField =
            serde_json::from_str(r#"{"id":"1","type":"range","label":"Level","required":false}"#)
                .unwrap();
        assert_eq!(field.field_type, FieldType::Text);
    }

    #[test]
    fn test_field_serializes_browser_shape() {
        let field = FormField::new("17", FieldType::Select, "Color", true).with_options(["Red"]);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "select");
        assert_eq!(json["options"][0], "Red");
        assert!(json.get("placeholder").is_none());
    }

    #[test]
    fn test_options_ignored_for_non_select() {
        let field = FormField::new("1", FieldType::Text, "Name", false).with_options(["A"]);
        assert!(field.options.is_empty());
        let json = serde_json::to_value(&field).unwrap();
        assert!(json.get("options").is_none());
    }

    #[test]
    fn test_field_value_untagged() {
        let data: FormData =
            serde_json::from_str(r#"{"a":"Ana","b":42,"c":true}"#).unwrap();
        assert_eq!(data["a"], FieldValue::Text("Ana".to_string()));
        assert_eq!(data["b"], FieldValue::Number(42.0));
        assert_eq!(data["c"], FieldValue::Bool(true));
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Number(42.0).to_string(), "42");
        assert_eq!(FieldValue::Number(1.5).to_string(), "1.5");
        assert_eq!(FieldValue::Bool(false).to_string(), "false");
        assert_eq!(FieldValue::Text("x".into()).to_string(), "x");
    }

    #[test]
    fn test_required_checkbox_must_be_ticked() {
        let field = FormField::new("1", FieldType::Checkbox, "Agree", true);
        assert!(!field.is_satisfied_by(None));
        assert!(!field.is_satisfied_by(Some(&FieldValue::Bool(false))));
        assert!(field.is_satisfied_by(Some(&FieldValue::Bool(true))));
    }

    #[test]
    fn test_missing_required_in_field_order() {
        let mut form = FormDefinition::new("1", "Survey");
        form.fields.push(FormField::new("a", FieldType::Text, "Name", true));
        form.fields.push(FormField::new("b", FieldType::Text, "Nick", false));
        form.fields.push(FormField::new("c", FieldType::Email, "Email", true));

        let mut data = FormData::new();
        data.insert("c".into(), FieldValue::Text("   ".into()));
        assert_eq!(form.missing_required(&data), vec!["Name", "Email"]);
    }

    #[test]
    fn test_find_field_by_id_or_label() {
        let mut form = FormDefinition::new("1", "Survey");
        form.fields.push(FormField::new("a", FieldType::Text, "Name", true));
        assert_eq!(form.find_field("a").unwrap().label, "Name");
        assert_eq!(form.find_field("Name").unwrap().id, "a");
        assert!(form.find_field("Age").is_none());
    }

    #[test]
    fn test_submission_camel_case_and_cells() {
        let mut data = FormData::new();
        data.insert("a".into(), FieldValue::Text("Ana".into()));
        let sub = FormSubmission::new("1", Utc::now(), data);
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["formId"], "1");
        assert_eq!(sub.cell("a"), "Ana");
        assert_eq!(sub.cell("missing"), "");
    }
}
