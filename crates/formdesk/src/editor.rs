//! Transient field editor state.

use serde::{Deserialize, Serialize};

use crate::form::{FieldType, FormField};

/// The values typed into the field editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDraft {
    /// Selected field type.
    pub field_type: FieldType,
    /// Label text.
    pub label: String,
    /// Required flag.
    pub required: bool,
    /// Placeholder text; empty means none.
    pub placeholder: String,
    /// Comma-separated select options.
    pub options: String,
}

impl FieldDraft {
    /// A draft pre-filled from an existing field.
    #[must_use]
    pub fn from_field(field: &FormField) -> Self {
        Self {
            field_type: field.field_type,
            label: field.label.clone(),
            required: field.required,
            placeholder: field.placeholder.clone().unwrap_or_default(),
            options: field.options.join(", "),
        }
    }

    /// Whether the draft can be saved.
    #[must_use]
    pub fn has_label(&self) -> bool {
        !self.label.trim().is_empty()
    }

    /// Build the field this draft describes, under `id`.
    #[must_use]
    pub fn to_field(&self, id: impl Into<String>) -> FormField {
        let mut field = FormField::new(id, self.field_type, self.label.trim(), self.required)
            .with_options(parse_options(&self.options));
        let placeholder = self.placeholder.trim();
        if !placeholder.is_empty() {
            field = field.with_placeholder(placeholder);
        }
        field
    }
}

/// Editor state: the draft plus the id of the field being edited, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldEditor {
    editing: Option<String>,
    draft: FieldDraft,
}

impl FieldEditor {
    /// Start editing `field`, or start a new field when `None`.
    pub fn begin(&mut self, field: Option<&FormField>) {
        match field {
            Some(f) => {
                self.editing = Some(f.id.clone());
                self.draft = FieldDraft::from_field(f);
            }
            None => self.reset(),
        }
    }

    /// Back to create mode with an empty draft.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Id of the field being edited, if in edit mode.
    #[must_use]
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Current draft.
    #[must_use]
    pub fn draft(&self) -> &FieldDraft {
        &self.draft
    }

    /// Replace the draft, keeping the edit target.
    pub fn set_draft(&mut self, draft: FieldDraft) {
        self.draft = draft;
    }
}

/// Split comma-separated option text into trimmed, non-empty entries.
///
/// Order and duplicates are preserved.
#[must_use]
pub fn parse_options(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_keeps_duplicates() {
        assert_eq!(parse_options("A, B, B"), vec!["A", "B", "B"]);
    }

    #[test]
    fn test_parse_options_drops_blanks() {
        assert_eq!(parse_options(" , x,,  y ,"), vec!["x", "y"]);
        assert!(parse_options("").is_empty());
    }

    #[test]
    fn test_begin_edit_populates_draft() {
        let field = FormField::new("7", FieldType::Select, "Color", true)
            .with_options(["Red", "Blue"])
            .with_placeholder("pick");
        let mut editor = FieldEditor::default();
        editor.begin(Some(&field));

        assert_eq!(editor.editing(), Some("7"));
        assert_eq!(editor.draft().options, "Red, Blue");
        assert_eq!(editor.draft().placeholder, "pick");
        assert_eq!(editor.draft().to_field("7"), field);
    }

    #[test]
    fn test_begin_none_resets() {
        let field = FormField::new("7", FieldType::Number, "Age", false);
        let mut editor = FieldEditor::default();
        editor.begin(Some(&field));
        editor.begin(None);
        assert_eq!(editor, FieldEditor::default());
    }

    #[test]
    fn test_to_field_drops_options_for_non_select() {
        let draft = FieldDraft {
            field_type: FieldType::Text,
            label: " Name ".into(),
            options: "A, B".into(),
            ..FieldDraft::default()
        };
        let field = draft.to_field("1");
        assert_eq!(field.label, "Name");
        assert!(field.options.is_empty());
        assert!(field.placeholder.is_none());
    }

    #[test]
    fn test_has_label() {
        let mut draft = FieldDraft::default();
        assert!(!draft.has_label());
        draft.label = "   ".into();
        assert!(!draft.has_label());
        draft.label = "Name".into();
        assert!(draft.has_label());
    }
}
