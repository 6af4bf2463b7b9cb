//! Field rendering for fill mode.
//!
//! [`render`] maps a field and its current value to a [`Control`]: the input
//! the user interacts with. The control also owns the change handler,
//! [`Control::interpret`], which turns raw input into a typed
//! [`FieldValue`]. This is the only place that branches on field type.

use std::fmt;

use chrono::NaiveDate;

use crate::form::{FieldType, FieldValue, FormField};

/// Number of visible rows for textarea controls.
pub const TEXTAREA_ROWS: u8 = 4;

/// Label of the blank entry heading every select list.
pub const CHOOSE_ONE: &str = "-- choose one --";

/// Kind of single-line input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Free text.
    Text,
    /// Numbers only.
    Number,
    /// Email address.
    Email,
    /// `YYYY-MM-DD` date.
    Date,
}

/// An input control for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Control<'a> {
    /// Single-line input.
    Input {
        /// Which single-line input.
        kind: InputKind,
        /// Field label.
        label: &'a str,
        /// Hint shown when empty.
        placeholder: Option<&'a str>,
        /// Whether a value is required.
        required: bool,
        /// Current value as text.
        value: String,
    },
    /// Multi-line input.
    TextArea {
        /// Field label.
        label: &'a str,
        /// Hint shown when empty.
        placeholder: Option<&'a str>,
        /// Whether a value is required.
        required: bool,
        /// Visible rows.
        rows: u8,
        /// Current value.
        value: String,
    },
    /// Option list with a leading blank sentinel.
    Select {
        /// Field label.
        label: &'a str,
        /// Whether a choice is required.
        required: bool,
        /// Available choices, excluding the sentinel.
        options: &'a [String],
        /// Current choice; `None` means the sentinel is selected.
        selected: Option<String>,
    },
    /// Boolean tick box.
    Checkbox {
        /// Field label.
        label: &'a str,
        /// Whether it must be ticked.
        required: bool,
        /// Current state.
        checked: bool,
    },
}

/// Why raw input could not become a field value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Not a finite number.
    #[error("'{0}' is not a number")]
    Number(String),
    /// Not a `YYYY-MM-DD` date.
    #[error("'{0}' is not a date (expected YYYY-MM-DD)")]
    Date(String),
    /// Not one of the select options.
    #[error("'{0}' is not one of the options")]
    Choice(String),
    /// Not a recognizable yes/no.
    #[error("'{0}' is not yes or no")]
    Boolean(String),
}

/// Build the control for `field` showing `value`.
#[must_use]
pub fn render<'a>(field: &'a FormField, value: Option<&FieldValue>) -> Control<'a> {
    let label = field.label.as_str();
    let placeholder = field.placeholder.as_deref();
    let required = field.required;
    let text = || value.map(ToString::to_string).unwrap_or_default();

    let kind = match field.field_type {
        FieldType::Number => InputKind::Number,
        FieldType::Email => InputKind::Email,
        FieldType::Date => InputKind::Date,
        FieldType::Textarea => {
            return Control::TextArea {
                label,
                placeholder,
                required,
                rows: TEXTAREA_ROWS,
                value: text(),
            }
        }
        FieldType::Select => {
            return Control::Select {
                label,
                required,
                options: &field.options,
                selected: value.map(ToString::to_string).filter(|s| !s.is_empty()),
            }
        }
        FieldType::Checkbox => {
            return Control::Checkbox {
                label,
                required,
                checked: matches!(value, Some(FieldValue::Bool(true))),
            }
        }
        FieldType::Text => InputKind::Text,
    };

    Control::Input {
        kind,
        label,
        placeholder,
        required,
        value: text(),
    }
}

impl Control<'_> {
    /// Interpret raw input the way this control would.
    ///
    /// Returns `Ok(None)` when the input clears the value.
    ///
    /// # Errors
    ///
    /// Returns an [`InputError`] if the input cannot be produced by this control.
    pub fn interpret(&self, raw: &str) -> Result<Option<FieldValue>, InputError> {
        let trimmed = raw.trim();
        match self {
            Self::Checkbox { .. } => parse_bool(trimmed).map(|b| Some(FieldValue::Bool(b))),
            _ if trimmed.is_empty() => Ok(None),
            Self::Input {
                kind: InputKind::Number,
                ..
            } => trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(|n| Some(FieldValue::Number(n)))
                .ok_or_else(|| InputError::Number(raw.to_string())),
            Self::Input {
                kind: InputKind::Date,
                ..
            } => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(|_| Some(FieldValue::Text(trimmed.to_string())))
                .map_err(|_| InputError::Date(raw.to_string())),
            Self::Select { options, .. } => options
                .iter()
                .find(|o| o.as_str() == trimmed)
                .map(|o| Some(FieldValue::Text(o.clone())))
                .ok_or_else(|| InputError::Choice(raw.to_string())),
            Self::TextArea { .. } => Ok(Some(FieldValue::Text(raw.to_string()))),
            Self::Input { .. } => Ok(Some(FieldValue::Text(trimmed.to_string()))),
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool, InputError> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" | "0" | "off" => Ok(false),
        "true" | "yes" | "y" | "1" | "on" | "x" | "si" | "sí" => Ok(true),
        _ => Err(InputError::Boolean(raw.to_string())),
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Email => "email",
            Self::Date => "date",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Control<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let star = |required: bool| if required { "*" } else { "" };
        match self {
            Self::Input {
                kind,
                label,
                placeholder,
                required,
                value,
            } => {
                write!(f, "[{kind}] {label}{}: ", star(*required))?;
                match (value.is_empty(), placeholder) {
                    (true, Some(hint)) => write!(f, "({hint})"),
                    _ => f.write_str(value),
                }
            }
            Self::TextArea {
                label,
                placeholder,
                required,
                rows,
                value,
            } => {
                write!(f, "[textarea x{rows}] {label}{}: ", star(*required))?;
                match (value.is_empty(), placeholder) {
                    (true, Some(hint)) => write!(f, "({hint})"),
                    _ => f.write_str(value),
                }
            }
            Self::Select {
                label,
                required,
                options,
                selected,
            } => {
                write!(f, "[select] {label}{}: ", star(*required))?;
                let current = selected.as_deref().unwrap_or(CHOOSE_ONE);
                write!(f, "{current} {{{CHOOSE_ONE}")?;
                for option in *options {
                    write!(f, " | {option}")?;
                }
                f.write_str("}")
            }
            Self::Checkbox {
                label,
                required,
                checked,
            } => {
                let mark = if *checked { "x" } else { " " };
                write!(f, "[{mark}] {label}{}", star(*required))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(field_type: FieldType) -> FormField {
        FormField::new("f", field_type, "Label", false)
    }

    #[test]
    fn test_text_like_types_share_input_control() {
        for (t, kind) in [
            (FieldType::Text, InputKind::Text),
            (FieldType::Number, InputKind::Number),
            (FieldType::Email, InputKind::Email),
            (FieldType::Date, InputKind::Date),
        ] {
            let f = field(t).with_placeholder("hint");
            match render(&f, None) {
                Control::Input {
                    kind: k,
                    placeholder,
                    value,
                    ..
                } => {
                    assert_eq!(k, kind);
                    assert_eq!(placeholder, Some("hint"));
                    assert!(value.is_empty());
                }
                other => panic!("unexpected control {other:?}"),
            }
        }
    }

    #[test]
    fn test_textarea_has_fixed_rows() {
        let f = field(FieldType::Textarea);
        let value = FieldValue::Text("line one\nline two".into());
        match render(&f, Some(&value)) {
            Control::TextArea { rows, value, .. } => {
                assert_eq!(rows, TEXTAREA_ROWS);
                assert_eq!(value, "line one\nline two");
            }
            other => panic!("unexpected control {other:?}"),
        }
    }

    #[test]
    fn test_select_defaults_to_sentinel() {
        let f = field(FieldType::Select).with_options(["A", "B"]);
        let control = render(&f, None);
        assert!(matches!(control, Control::Select { selected: None, .. }));
        assert!(control.to_string().contains(CHOOSE_ONE));
    }

    #[test]
    fn test_select_interpret() {
        let f = field(FieldType::Select).with_options(["A", "B"]);
        let control = render(&f, None);
        assert_eq!(
            control.interpret("B").unwrap(),
            Some(FieldValue::Text("B".into()))
        );
        assert_eq!(control.interpret("").unwrap(), None);
        assert_eq!(
            control.interpret("C"),
            Err(InputError::Choice("C".into()))
        );
    }

    #[test]
    fn test_checkbox_reads_and_writes_booleans() {
        let f = field(FieldType::Checkbox);
        let control = render(&f, Some(&FieldValue::Bool(true)));
        assert!(matches!(control, Control::Checkbox { checked: true, .. }));
        assert_eq!(control.interpret("no").unwrap(), Some(FieldValue::Bool(false)));
        assert_eq!(control.interpret("").unwrap(), Some(FieldValue::Bool(false)));
        assert_eq!(control.interpret("yes").unwrap(), Some(FieldValue::Bool(true)));
        assert!(control.interpret("maybe").is_err());
    }

    #[test]
    fn test_number_interpret() {
        let f = field(FieldType::Number);
        let control = render(&f, None);
        assert_eq!(
            control.interpret(" 30 ").unwrap(),
            Some(FieldValue::Number(30.0))
        );
        assert!(control.interpret("thirty").is_err());
        assert!(control.interpret("NaN").is_err());
    }

    #[test]
    fn test_date_interpret() {
        let f = field(FieldType::Date);
        let control = render(&f, None);
        assert_eq!(
            control.interpret("1990-05-17").unwrap(),
            Some(FieldValue::Text("1990-05-17".into()))
        );
        assert!(control.interpret("17/05/1990").is_err());
    }

    #[test]
    fn test_empty_input_clears_value() {
        let f = field(FieldType::Text);
        let value = FieldValue::Text("Ana".into());
        assert_eq!(render(&f, Some(&value)).interpret("  ").unwrap(), None);
    }

    #[test]
    fn test_display_marks_required() {
        let f = FormField::new("f", FieldType::Text, "Name", true);
        let value = FieldValue::Text("Ana".into());
        assert_eq!(render(&f, Some(&value)).to_string(), "[text] Name*: Ana");
    }

    #[test]
    fn test_display_checkbox() {
        let f = field(FieldType::Checkbox);
        assert_eq!(render(&f, None).to_string(), "[ ] Label");
    }
}
