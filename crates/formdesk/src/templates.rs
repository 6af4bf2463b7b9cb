//! Built-in form templates.

use std::fmt;

use crate::editor::FieldDraft;
use crate::form::FieldType;

/// A ready-made form schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    /// Name, surname, gender, birth date, email and address.
    PersonalDetails,
}

impl Template {
    /// Title given to forms created from this template.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::PersonalDetails => "Detalles personales",
        }
    }

    /// The template's fields, in order, as editor drafts.
    #[must_use]
    pub fn fields(self) -> Vec<FieldDraft> {
        match self {
            Self::PersonalDetails => vec![
                required(FieldType::Text, "Nombre", ""),
                required(FieldType::Text, "Apellido", ""),
                required(FieldType::Select, "Género", "Masculino, Femenino, Otro"),
                required(FieldType::Date, "Fecha de nacimiento", ""),
                required(FieldType::Email, "Email", ""),
                required(FieldType::Text, "Dirección", ""),
            ],
        }
    }
}

fn required(field_type: FieldType, label: &str, options: &str) -> FieldDraft {
    FieldDraft {
        field_type,
        label: label.to_string(),
        required: true,
        placeholder: String::new(),
        options: options.to_string(),
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersonalDetails => f.write_str("personal-details"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personal_details_fields() {
        let fields = Template::PersonalDetails.fields();
        assert_eq!(fields.len(), 6);
        assert!(fields.iter().all(|f| f.required));

        let gender = fields[2].to_field("g");
        assert_eq!(gender.field_type, FieldType::Select);
        assert_eq!(gender.options, vec!["Masculino", "Femenino", "Otro"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Template::PersonalDetails.to_string(), "personal-details");
    }
}
