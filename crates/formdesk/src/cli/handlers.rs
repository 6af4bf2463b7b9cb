//! Command handlers.
//!
//! Each handler drives a [`Session`] and writes human or JSON output to the
//! given writer. Diagnostics go through `tracing` instead.

use std::io::{BufRead, Write};

use serde_json::json;
use tracing::debug;

use super::commands::{
    parse_assignment, ConfigCommand, DataCommand, ExportCommand, FieldCommand, FieldSpec,
    FillCommand, FormCommand, OutputFormat, StatusCommand,
};
use crate::config::Config;
use crate::editor::FieldDraft;
use crate::error::{Error, Result};
use crate::export::SheetTable;
use crate::form::FormDefinition;
use crate::render::render;
use crate::session::{Outcome, Session};
use crate::state::{Command, Rejection, Tab};
use crate::storage::{KeyValueStore, Storage};

/// Run a `form` subcommand.
///
/// # Errors
///
/// Returns an error if the form is unknown, the command is refused, or
/// output or persistence fails.
pub fn form<S: KeyValueStore, W: Write>(
    session: &mut Session<S>,
    cmd: FormCommand,
    out: &mut W,
) -> Result<()> {
    match cmd {
        FormCommand::List { format } => list_forms(session, format, out),
        FormCommand::Create { title } => {
            session.dispatch(Command::CreateForm { title })?;
            print_created(session, out)
        }
        FormCommand::Template { template } => {
            session.dispatch(Command::CreateFromTemplate(template.into()))?;
            print_created(session, out)
        }
        FormCommand::Show { form, format } => {
            let id = session.select(&form)?;
            let form = active(session, &id)?;
            if format == OutputFormat::Json {
                writeln!(out, "{}", serde_json::to_string_pretty(form)?)?;
                return Ok(());
            }
            writeln!(out, "{} ({})", form.title, form.id)?;
            if form.fields.is_empty() {
                writeln!(out, "  (no fields)")?;
            }
            for field in &form.fields {
                writeln!(out, "  {}", render(field, None))?;
            }
            Ok(())
        }
        FormCommand::Delete { form } => {
            let target = session
                .state()
                .find_form(&form)
                .ok_or_else(|| Error::form_not_found(&form))?;
            let (id, title) = (target.id.clone(), target.title.clone());
            session.dispatch(Command::DeleteForm { id })?;
            writeln!(out, "Deleted form '{title}'")?;
            Ok(())
        }
    }
}

fn list_forms<S: KeyValueStore, W: Write>(
    session: &Session<S>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let state = session.state();
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(state.forms())?)?;
        }
        OutputFormat::Plain => {
            for form in state.forms() {
                writeln!(out, "{}\t{}", form.id, form.title)?;
            }
        }
        OutputFormat::Table => {
            if state.forms().is_empty() {
                writeln!(out, "No forms yet. Create one with `formdesk form create`.")?;
                return Ok(());
            }
            let mut rows = vec![vec![
                "ID".to_string(),
                "TITLE".to_string(),
                "FIELDS".to_string(),
                "RESPONSES".to_string(),
            ]];
            for form in state.forms() {
                rows.push(vec![
                    form.id.clone(),
                    form.title.clone(),
                    form.fields.len().to_string(),
                    state.submissions_for(&form.id).count().to_string(),
                ]);
            }
            write_table(out, &rows)?;
        }
    }
    Ok(())
}

fn print_created<S: KeyValueStore, W: Write>(session: &Session<S>, out: &mut W) -> Result<()> {
    if let Some(form) = session.state().active_form() {
        writeln!(
            out,
            "Created form '{}' ({}) with {} field(s)",
            form.title,
            form.id,
            form.fields.len()
        )?;
    }
    Ok(())
}

/// Run a `field` subcommand.
///
/// # Errors
///
/// Returns an error if the form or field is unknown, the draft is refused,
/// or output or persistence fails.
pub fn field<S: KeyValueStore, W: Write>(
    session: &mut Session<S>,
    cmd: FieldCommand,
    out: &mut W,
) -> Result<()> {
    match cmd {
        FieldCommand::Add { form, spec } => {
            let id = session.select(&form)?;
            session.dispatch(Command::BeginEdit { field_id: None })?;
            save_draft(session, &spec)?;
            if let Some(field) = active(session, &id)?.fields.last() {
                writeln!(out, "Added {} field '{}' ({})", field.field_type, field.label, field.id)?;
            }
        }
        FieldCommand::Edit { form, field, spec } => {
            let id = session.select(&form)?;
            let field_id = resolve_field(active(session, &id)?, &field)?;
            session.dispatch(Command::BeginEdit {
                field_id: Some(field_id.clone()),
            })?;
            save_draft(session, &spec)?;
            if let Some(field) = active(session, &id)?.field(&field_id) {
                writeln!(out, "Updated field '{}' ({})", field.label, field.id)?;
            }
        }
        FieldCommand::Delete { form, field } => {
            let id = session.select(&form)?;
            let field_id = resolve_field(active(session, &id)?, &field)?;
            session.dispatch(Command::DeleteField { id: field_id })?;
            writeln!(out, "Deleted field '{field}'")?;
        }
    }
    Ok(())
}

/// Apply the given properties over the editor draft and save it.
fn save_draft<S: KeyValueStore>(session: &mut Session<S>, spec: &FieldSpec) -> Result<()> {
    let draft = merge_spec(session.state().editor().draft().clone(), spec);
    session.dispatch(Command::UpdateDraft(draft))?;
    session.dispatch(Command::SaveField)?;
    Ok(())
}

fn merge_spec(mut draft: FieldDraft, spec: &FieldSpec) -> FieldDraft {
    if let Some(field_type) = spec.field_type {
        draft.field_type = field_type.into();
    }
    if let Some(label) = &spec.label {
        draft.label.clone_from(label);
    }
    if let Some(required) = spec.required_flag() {
        draft.required = required;
    }
    if let Some(placeholder) = &spec.placeholder {
        draft.placeholder.clone_from(placeholder);
    }
    if let Some(options) = &spec.options {
        draft.options.clone_from(options);
    }
    draft
}

/// Enter values for a form and save them as its response.
///
/// `--set` values are applied first; with `--interactive` every field is
/// then prompted for on `input`. An empty answer keeps the current value.
///
/// # Errors
///
/// Returns an error if the form has no fields, a `--set` value is invalid,
/// required fields are left empty, or output or persistence fails.
pub fn fill<S: KeyValueStore, R: BufRead, W: Write>(
    session: &mut Session<S>,
    cmd: &FillCommand,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let id = session.select(&cmd.form)?;
    session.dispatch(Command::SwitchTab(Tab::Fill))?;

    for assignment in &cmd.values {
        let (reference, raw) =
            parse_assignment(assignment).ok_or_else(|| Error::InvalidAssignment {
                argument: assignment.clone(),
            })?;
        let field_id = resolve_field(active(session, &id)?, reference)?;
        session.dispatch(Command::SetValue {
            field_id,
            raw: raw.to_string(),
        })?;
    }

    if cmd.interactive {
        prompt_fields(session, &id, input, out)?;
    }

    let outcome = session.dispatch(Command::Submit)?;
    print_notifications(&outcome, out)
}

fn prompt_fields<S: KeyValueStore, R: BufRead, W: Write>(
    session: &mut Session<S>,
    form_id: &str,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let fields = active(session, form_id)?.fields.clone();
    for field in &fields {
        loop {
            let control = render(field, session.state().buffer().get(&field.id));
            write!(out, "{control}\n> ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                debug!("Input closed while prompting");
                return Ok(());
            }
            let raw = line.trim_end_matches(['\r', '\n']);
            if raw.trim().is_empty() {
                break;
            }

            match session.dispatch(Command::SetValue {
                field_id: field.id.clone(),
                raw: raw.to_string(),
            }) {
                Ok(_) => break,
                Err(Error::Rejected(rejection)) => writeln!(out, "  {rejection}")?,
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}

/// Show the stored responses of a form.
///
/// # Errors
///
/// Returns an error if the form is unknown or output fails.
pub fn data<S: KeyValueStore, W: Write>(
    session: &mut Session<S>,
    cmd: &DataCommand,
    out: &mut W,
) -> Result<()> {
    let id = session.select(&cmd.form)?;
    session.dispatch(Command::SwitchTab(Tab::Data))?;
    let state = session.state();
    let form = active(session, &id)?;

    if cmd.format == OutputFormat::Json {
        let submissions: Vec<_> = state.submissions_for(&id).collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&submissions)?)?;
        return Ok(());
    }

    let Some(table) = SheetTable::build(form, state.submissions()) else {
        writeln!(out, "No responses for '{}'", form.title)?;
        return Ok(());
    };
    let rows = table.to_rows(session.exporter().timestamp_format());

    if cmd.format == OutputFormat::Table {
        return write_table(out, &rows);
    }
    if let Some((header, records)) = rows.split_first() {
        for record in records {
            let mut cells = header.iter().zip(record);
            if let Some((_, timestamp)) = cells.next() {
                writeln!(out, "{timestamp}")?;
            }
            for (label, value) in cells {
                writeln!(out, "  {label}: {value}")?;
            }
        }
    }
    Ok(())
}

/// Export a form's responses to a spreadsheet.
///
/// # Errors
///
/// Returns an error if the form is unknown or the file cannot be written.
pub fn export<S: KeyValueStore, W: Write>(
    session: &mut Session<S>,
    cmd: &ExportCommand,
    out: &mut W,
) -> Result<()> {
    if let Some(dir) = &cmd.output_dir {
        let exporter = session.exporter().clone().with_output_dir(dir);
        session.set_exporter(exporter);
    }
    session.select(&cmd.form)?;
    session.dispatch(Command::SwitchTab(Tab::Data))?;

    let outcome = session.dispatch(Command::Export)?;
    if let Some(path) = &outcome.exported {
        writeln!(out, "Exported to {}", path.display())?;
    }
    print_notifications(&outcome, out)
}

/// Show counts and where data is stored.
///
/// # Errors
///
/// Returns an error if output fails.
pub fn status<W: Write>(session: &Session<Storage>, cmd: &StatusCommand, out: &mut W) -> Result<()> {
    let stats = session.stats();
    let storage = session.store().backend();
    let keys = storage.keys()?;

    if cmd.json {
        let status = json!({
            "forms": stats.forms,
            "fields": stats.fields,
            "submissions": stats.submissions,
            "database_path": storage.path(),
            "database_size_bytes": storage.size_bytes(),
            "keys": keys,
            "export_dir": session.exporter().output_dir(),
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&status)?)?;
    } else {
        writeln!(out, "formdesk status")?;
        writeln!(out, "---------------")?;
        writeln!(out, "Forms:         {}", stats.forms)?;
        writeln!(out, "Fields:        {}", stats.fields)?;
        writeln!(out, "Responses:     {}", stats.submissions)?;
        writeln!(out, "Database:      {}", storage.path().display())?;
        writeln!(out, "Size:          {} bytes", storage.size_bytes())?;
        writeln!(out, "Keys:          {}", keys.join(", "))?;
        writeln!(out, "Export dir:    {}", session.exporter().output_dir().display())?;
    }
    Ok(())
}

/// Run a `config` subcommand.
///
/// # Errors
///
/// Returns an error if output fails. Validation problems are reported, not
/// returned.
pub fn config<W: Write>(config: &Config, cmd: ConfigCommand, out: &mut W) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(config)?)?;
            } else {
                let output_dir = config
                    .export
                    .output_dir
                    .as_ref()
                    .map_or_else(|| ".".to_string(), |p| p.display().to_string());
                writeln!(out, "Current Configuration")?;
                writeln!(out, "=====================")?;
                writeln!(out)?;
                writeln!(out, "[Storage]")?;
                writeln!(out, "  Database path:      {}", config.database_path().display())?;
                writeln!(out)?;
                writeln!(out, "[Export]")?;
                writeln!(out, "  Output dir:         {output_dir}")?;
                writeln!(out, "  Sheet name:         {}", config.export.sheet_name)?;
                writeln!(out, "  Timestamp format:   {}", config.export.timestamp_format)?;
            }
        }
        ConfigCommand::Path => {
            writeln!(out, "{}", Config::default_config_path().display())?;
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            writeln!(out, "Validating configuration: {}", path.display())?;
            match Config::load_from(Some(path)) {
                Ok(_) => writeln!(out, "Configuration is valid.")?,
                Err(e) => writeln!(out, "Configuration error: {e}")?,
            }
        }
    }
    Ok(())
}

fn active<'a, S: KeyValueStore>(session: &'a Session<S>, id: &str) -> Result<&'a FormDefinition> {
    session
        .state()
        .form(id)
        .ok_or_else(|| Error::form_not_found(id))
}

fn resolve_field(form: &FormDefinition, reference: &str) -> Result<String> {
    form.find_field(reference)
        .map(|f| f.id.clone())
        .ok_or_else(|| Rejection::UnknownField(reference.to_string()).into())
}

fn print_notifications<W: Write>(outcome: &Outcome, out: &mut W) -> Result<()> {
    for notification in &outcome.notifications {
        writeln!(out, "{notification}")?;
    }
    Ok(())
}

/// Write rows as left-aligned columns separated by two spaces.
fn write_table<W: Write>(out: &mut W, rows: &[Vec<String>]) -> Result<()> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            rows.iter()
                .filter_map(|row| row.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}
