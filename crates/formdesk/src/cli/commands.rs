//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::form::FieldType;
use crate::templates::Template;

/// Form registry commands.
#[derive(Debug, Subcommand)]
pub enum FormCommand {
    /// List all forms
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Create an empty form
    Create {
        /// Form title
        title: String,
    },

    /// Create a form from a built-in template
    Template {
        /// Which template
        #[arg(value_enum)]
        template: TemplateArg,
    },

    /// Show a form's fields as fill-mode controls
    Show {
        /// Form id or title
        form: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Delete a form and its responses
    Delete {
        /// Form id or title
        form: String,
    },
}

/// Field schema commands.
#[derive(Debug, Subcommand)]
pub enum FieldCommand {
    /// Append a field to a form
    Add {
        /// Form id or title
        form: String,

        /// Properties of the new field
        #[command(flatten)]
        spec: FieldSpec,
    },

    /// Change an existing field in place
    Edit {
        /// Form id or title
        form: String,

        /// Field id or label
        field: String,

        /// Properties to change
        #[command(flatten)]
        spec: FieldSpec,
    },

    /// Remove a field from a form
    Delete {
        /// Form id or title
        form: String,

        /// Field id or label
        field: String,
    },
}

/// Field properties. Omitted options keep their current value when editing.
#[derive(Debug, Clone, Default, Args)]
pub struct FieldSpec {
    /// Field type
    #[arg(short = 't', long = "type", value_enum)]
    pub field_type: Option<FieldTypeArg>,

    /// Field label
    #[arg(short, long)]
    pub label: Option<String>,

    /// Require a value before submitting
    #[arg(short, long, conflicts_with = "optional")]
    pub required: bool,

    /// Allow submitting without a value
    #[arg(long)]
    pub optional: bool,

    /// Hint shown in empty inputs
    #[arg(short, long)]
    pub placeholder: Option<String>,

    /// Comma-separated choices for select fields
    #[arg(short, long)]
    pub options: Option<String>,
}

impl FieldSpec {
    /// The requested required flag, if either `--required` or `--optional` was given.
    #[must_use]
    pub fn required_flag(&self) -> Option<bool> {
        match (self.required, self.optional) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        }
    }
}

/// Fill command arguments.
#[derive(Debug, Args)]
pub struct FillCommand {
    /// Form id or title
    pub form: String,

    /// Field value as FIELD=VALUE (field id or label)
    #[arg(short = 's', long = "set", value_name = "FIELD=VALUE")]
    pub values: Vec<String>,

    /// Prompt for each field on stdin
    #[arg(short, long)]
    pub interactive: bool,
}

/// Data command arguments.
#[derive(Debug, Args)]
pub struct DataCommand {
    /// Form id or title
    pub form: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Form id or title
    pub form: String,

    /// Directory to write the spreadsheet to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Field type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldTypeArg {
    /// Single-line text
    Text,
    /// Number
    Number,
    /// Email address
    Email,
    /// Date (YYYY-MM-DD)
    Date,
    /// Multi-line text
    Textarea,
    /// Choice from --options
    Select,
    /// Yes/no tick box
    Checkbox,
}

impl From<FieldTypeArg> for FieldType {
    fn from(arg: FieldTypeArg) -> Self {
        match arg {
            FieldTypeArg::Text => Self::Text,
            FieldTypeArg::Number => Self::Number,
            FieldTypeArg::Email => Self::Email,
            FieldTypeArg::Date => Self::Date,
            FieldTypeArg::Textarea => Self::Textarea,
            FieldTypeArg::Select => Self::Select,
            FieldTypeArg::Checkbox => Self::Checkbox,
        }
    }
}

/// Built-in template argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TemplateArg {
    /// Name, surname, gender, birth date, email, address
    PersonalDetails,
}

impl From<TemplateArg> for Template {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::PersonalDetails => Self::PersonalDetails,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

/// Split a `FIELD=VALUE` argument at the first `=`.
///
/// Returns `None` if there is no `=` or the field part is empty.
#[must_use]
pub fn parse_assignment(arg: &str) -> Option<(&str, &str)> {
    let (field, value) = arg.split_once('=')?;
    let field = field.trim();
    (!field.is_empty()).then_some((field, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_arg_conversion() {
        let pairs = [
            (FieldTypeArg::Text, FieldType::Text),
            (FieldTypeArg::Number, FieldType::Number),
            (FieldTypeArg::Email, FieldType::Email),
            (FieldTypeArg::Date, FieldType::Date),
            (FieldTypeArg::Textarea, FieldType::Textarea),
            (FieldTypeArg::Select, FieldType::Select),
            (FieldTypeArg::Checkbox, FieldType::Checkbox),
        ];
        for (arg, expected) in pairs {
            assert_eq!(FieldType::from(arg), expected);
        }
    }

    #[test]
    fn test_template_arg_conversion() {
        assert_eq!(
            Template::from(TemplateArg::PersonalDetails),
            Template::PersonalDetails
        );
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_required_flag() {
        let mut spec = FieldSpec::default();
        assert_eq!(spec.required_flag(), None);
        spec.optional = true;
        assert_eq!(spec.required_flag(), Some(false));
        spec.optional = false;
        spec.required = true;
        assert_eq!(spec.required_flag(), Some(true));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("Name=Ana"), Some(("Name", "Ana")));
        assert_eq!(parse_assignment(" Name =a=b"), Some(("Name", "a=b")));
        assert_eq!(parse_assignment("Name="), Some(("Name", "")));
        assert_eq!(parse_assignment("Name"), None);
        assert_eq!(parse_assignment("=Ana"), None);
    }
}
