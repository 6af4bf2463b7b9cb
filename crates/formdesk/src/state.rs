//! Application state and the command pipeline.
//!
//! Every user action is a [`Command`]. [`AppState::apply`] performs the
//! state transition without touching storage or the file system and returns
//! the [`Effect`]s the caller must carry out afterwards (persisting a
//! collection, showing a notification, writing a spreadsheet). A refused
//! command returns a [`Rejection`] and leaves the state exactly as it was.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::editor::{FieldDraft, FieldEditor};
use crate::export::SheetTable;
use crate::form::{FormData, FormDefinition, FormSubmission};
use crate::render::{render, InputError};
use crate::templates::Template;

/// Which view of the active form is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    /// Editing the field schema.
    #[default]
    Build,
    /// Entering a response.
    Fill,
    /// Viewing and exporting responses.
    Data,
}

/// A user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create an empty form and make it active.
    CreateForm {
        /// Form title; must not be blank.
        title: String,
    },
    /// Create a form from a built-in template and make it active.
    CreateFromTemplate(Template),
    /// Make a form active.
    SelectForm {
        /// Id of the form.
        id: String,
    },
    /// Delete a form and its submissions.
    DeleteForm {
        /// Id of the form.
        id: String,
    },
    /// Open the field editor on an existing field, or on a new one.
    BeginEdit {
        /// Field to edit; `None` starts a new field.
        field_id: Option<String>,
    },
    /// Replace the editor draft.
    UpdateDraft(FieldDraft),
    /// Save the editor draft into the active form.
    SaveField,
    /// Remove a field from the active form.
    DeleteField {
        /// Id of the field.
        id: String,
    },
    /// Switch view.
    SwitchTab(Tab),
    /// Enter a value for one field of the active form.
    SetValue {
        /// Id of the field.
        field_id: String,
        /// Raw input as typed.
        raw: String,
    },
    /// Save the entered values as the active form's submission.
    Submit,
    /// Export the active form's submissions.
    Export,
}

/// A side effect requested by a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The form registry changed and must be written out.
    PersistForms,
    /// The submission list changed and must be written out.
    PersistSubmissions,
    /// Show a blocking notification.
    Notify(Notification),
    /// Write this table to a spreadsheet file.
    WriteSpreadsheet(SheetTable),
}

/// A message the user must acknowledge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A submission was stored.
    SubmissionSaved {
        /// Title of the form.
        form_title: String,
    },
    /// Export was requested but the form has no submissions.
    NothingToExport {
        /// Title of the form.
        form_title: String,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubmissionSaved { form_title } => {
                write!(f, "Response to '{form_title}' saved")
            }
            Self::NothingToExport { form_title } => {
                write!(f, "No responses to export for '{form_title}'")
            }
        }
    }
}

/// Why a command was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Form title is blank.
    BlankTitle,
    /// Field label is blank.
    BlankLabel,
    /// No form with this id.
    UnknownForm(String),
    /// No field with this id in the active form.
    UnknownField(String),
    /// The command needs an active form.
    NoActiveForm,
    /// The active form has no fields to fill.
    FillDisabled,
    /// Input the field's control cannot accept.
    InvalidInput {
        /// Field label.
        label: String,
        /// What was wrong with it.
        error: InputError,
    },
    /// Required fields left empty, by label.
    MissingRequired(Vec<String>),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankTitle => f.write_str("form title must not be blank"),
            Self::BlankLabel => f.write_str("field label must not be blank"),
            Self::UnknownForm(id) => write!(f, "no form with id '{id}'"),
            Self::UnknownField(id) => write!(f, "no field with id '{id}'"),
            Self::NoActiveForm => f.write_str("no form is selected"),
            Self::FillDisabled => f.write_str("the form has no fields to fill"),
            Self::InvalidInput { label, error } => write!(f, "{label}: {error}"),
            Self::MissingRequired(labels) => {
                write!(f, "required fields are empty: {}", labels.join(", "))
            }
        }
    }
}

impl std::error::Error for Rejection {}

/// Hands out time-based ids that never repeat within a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Start above every numeric id already in use.
    fn seeded(forms: &[FormDefinition]) -> Self {
        let last = forms
            .iter()
            .flat_map(|form| {
                std::iter::once(form.id.as_str()).chain(form.fields.iter().map(|f| f.id.as_str()))
            })
            .filter_map(|id| id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self { last }
    }

    fn next(&mut self, now: DateTime<Utc>) -> String {
        self.last = now.timestamp_millis().max(self.last + 1);
        self.last.to_string()
    }
}

/// Everything the form builder holds in memory.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    forms: Vec<FormDefinition>,
    submissions: Vec<FormSubmission>,
    active: Option<String>,
    editor: FieldEditor,
    buffer: FormData,
    tab: Tab,
    ids: IdGenerator,
}

impl AppState {
    /// State over previously stored collections, with no form selected.
    #[must_use]
    pub fn new(forms: Vec<FormDefinition>, submissions: Vec<FormSubmission>) -> Self {
        let ids = IdGenerator::seeded(&forms);
        Self {
            forms,
            submissions,
            ids,
            ..Self::default()
        }
    }

    /// The form registry, in creation order.
    #[must_use]
    pub fn forms(&self) -> &[FormDefinition] {
        &self.forms
    }

    /// Every stored submission.
    #[must_use]
    pub fn submissions(&self) -> &[FormSubmission] {
        &self.submissions
    }

    /// Submissions for one form.
    pub fn submissions_for<'a>(
        &'a self,
        form_id: &'a str,
    ) -> impl Iterator<Item = &'a FormSubmission> + 'a {
        self.submissions.iter().filter(move |s| s.form_id == form_id)
    }

    /// A form by id.
    #[must_use]
    pub fn form(&self, id: &str) -> Option<&FormDefinition> {
        self.forms.iter().find(|f| f.id == id)
    }

    /// A form by id, or failing that by exact title.
    #[must_use]
    pub fn find_form(&self, reference: &str) -> Option<&FormDefinition> {
        self.form(reference)
            .or_else(|| self.forms.iter().find(|f| f.title == reference))
    }

    /// The selected form.
    #[must_use]
    pub fn active_form(&self) -> Option<&FormDefinition> {
        self.active.as_deref().and_then(|id| self.form(id))
    }

    /// Field editor state.
    #[must_use]
    pub fn editor(&self) -> &FieldEditor {
        &self.editor
    }

    /// Values entered in fill mode so far.
    #[must_use]
    pub fn buffer(&self) -> &FormData {
        &self.buffer
    }

    /// Current view.
    #[must_use]
    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Apply `command` at time `now`.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] when the command cannot run; the state is
    /// unchanged in that case.
    pub fn apply(
        &mut self,
        command: Command,
        now: DateTime<Utc>,
    ) -> Result<Vec<Effect>, Rejection> {
        debug!(?command, "Applying command");
        match command {
            Command::CreateForm { title } => self.create_form(&title, now),
            Command::CreateFromTemplate(template) => Ok(self.create_from_template(template, now)),
            Command::SelectForm { id } => self.select_form(&id).map(|()| Vec::new()),
            Command::DeleteForm { id } => self.delete_form(&id),
            Command::BeginEdit { field_id } => self.begin_edit(field_id.as_deref()),
            Command::UpdateDraft(draft) => {
                self.editor.set_draft(draft);
                Ok(Vec::new())
            }
            Command::SaveField => self.save_field(now),
            Command::DeleteField { id } => self.delete_field(&id),
            Command::SwitchTab(tab) => self.switch_tab(tab),
            Command::SetValue { field_id, raw } => self.set_value(&field_id, &raw),
            Command::Submit => self.submit(now),
            Command::Export => self.export(),
        }
    }

    fn create_form(&mut self, title: &str, now: DateTime<Utc>) -> Result<Vec<Effect>, Rejection> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Rejection::BlankTitle);
        }
        let form = FormDefinition::new(self.ids.next(now), title);
        info!(id = %form.id, title = %form.title, "Created form");
        self.push_form(form);
        Ok(vec![Effect::PersistForms])
    }

    fn create_from_template(&mut self, template: Template, now: DateTime<Utc>) -> Vec<Effect> {
        let mut form = FormDefinition::new(self.ids.next(now), template.title());
        form.fields = template
            .fields()
            .iter()
            .map(|draft| draft.to_field(self.ids.next(now)))
            .collect();
        info!(id = %form.id, %template, "Created form from template");
        self.push_form(form);
        vec![Effect::PersistForms]
    }

    fn push_form(&mut self, form: FormDefinition) {
        let id = form.id.clone();
        self.forms.push(form);
        self.activate(Some(id));
    }

    fn activate(&mut self, id: Option<String>) {
        self.active = id;
        self.editor.reset();
        self.buffer.clear();
        self.normalize_tab();
    }

    fn select_form(&mut self, id: &str) -> Result<(), Rejection> {
        if self.form(id).is_none() {
            return Err(Rejection::UnknownForm(id.to_string()));
        }
        self.activate(Some(id.to_string()));
        Ok(())
    }

    fn delete_form(&mut self, id: &str) -> Result<Vec<Effect>, Rejection> {
        let index = self
            .forms
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| Rejection::UnknownForm(id.to_string()))?;
        let removed = self.forms.remove(index);

        let before = self.submissions.len();
        self.submissions.retain(|s| s.form_id != id);
        let cascaded = before - self.submissions.len();
        info!(id, title = %removed.title, cascaded, "Deleted form");

        if self.active.as_deref() == Some(id) {
            let next = self.forms.first().map(|f| f.id.clone());
            self.activate(next);
        }

        let mut effects = vec![Effect::PersistForms];
        if cascaded > 0 {
            effects.push(Effect::PersistSubmissions);
        }
        Ok(effects)
    }

    fn active_index(&self) -> Result<usize, Rejection> {
        let id = self.active.as_deref().ok_or(Rejection::NoActiveForm)?;
        self.forms
            .iter()
            .position(|f| f.id == id)
            .ok_or(Rejection::NoActiveForm)
    }

    fn begin_edit(&mut self, field_id: Option<&str>) -> Result<Vec<Effect>, Rejection> {
        let form = &self.forms[self.active_index()?];
        let field = match field_id {
            Some(id) => Some(
                form.field(id)
                    .ok_or_else(|| Rejection::UnknownField(id.to_string()))?,
            ),
            None => None,
        };
        self.editor.begin(field);
        Ok(Vec::new())
    }

    fn save_field(&mut self, now: DateTime<Utc>) -> Result<Vec<Effect>, Rejection> {
        let index = self.active_index()?;
        let draft = self.editor.draft();
        if !draft.has_label() {
            return Err(Rejection::BlankLabel);
        }

        match self.editor.editing() {
            Some(id) => {
                let position = self.forms[index]
                    .fields
                    .iter()
                    .position(|f| f.id == id)
                    .ok_or_else(|| Rejection::UnknownField(id.to_string()))?;
                let field = draft.to_field(id);
                debug!(form = %self.forms[index].id, field = %field.id, "Replaced field");
                self.forms[index].fields[position] = field;
            }
            None => {
                let field = draft.to_field(self.ids.next(now));
                debug!(form = %self.forms[index].id, field = %field.id, "Added field");
                self.forms[index].fields.push(field);
            }
        }

        self.editor.reset();
        Ok(vec![Effect::PersistForms])
    }

    fn delete_field(&mut self, id: &str) -> Result<Vec<Effect>, Rejection> {
        let index = self.active_index()?;
        let fields = &mut self.forms[index].fields;
        let position = fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| Rejection::UnknownField(id.to_string()))?;
        fields.remove(position);

        self.buffer.remove(id);
        if self.editor.editing() == Some(id) {
            self.editor.reset();
        }
        self.normalize_tab();
        Ok(vec![Effect::PersistForms])
    }

    fn fill_enabled(&self) -> bool {
        self.active_form().is_some_and(|f| !f.fields.is_empty())
    }

    fn normalize_tab(&mut self) {
        if self.tab == Tab::Fill && !self.fill_enabled() {
            self.tab = Tab::Build;
        }
    }

    fn switch_tab(&mut self, tab: Tab) -> Result<Vec<Effect>, Rejection> {
        if tab == Tab::Fill && !self.fill_enabled() {
            return Err(Rejection::FillDisabled);
        }
        self.tab = tab;
        Ok(Vec::new())
    }

    fn set_value(&mut self, field_id: &str, raw: &str) -> Result<Vec<Effect>, Rejection> {
        let form = &self.forms[self.active_index()?];
        let field = form
            .field(field_id)
            .ok_or_else(|| Rejection::UnknownField(field_id.to_string()))?;

        let value = render(field, self.buffer.get(field_id))
            .interpret(raw)
            .map_err(|error| Rejection::InvalidInput {
                label: field.label.clone(),
                error,
            })?;

        match value {
            Some(value) => {
                self.buffer.insert(field_id.to_string(), value);
            }
            None => {
                self.buffer.remove(field_id);
            }
        }
        Ok(Vec::new())
    }

    fn submit(&mut self, now: DateTime<Utc>) -> Result<Vec<Effect>, Rejection> {
        let form = &self.forms[self.active_index()?];
        if form.fields.is_empty() {
            return Err(Rejection::FillDisabled);
        }
        let missing = form.missing_required(&self.buffer);
        if !missing.is_empty() {
            return Err(Rejection::MissingRequired(missing));
        }

        let form_id = form.id.clone();
        let form_title = form.title.clone();
        let submission = FormSubmission::new(form_id.as_str(), now, std::mem::take(&mut self.buffer));

        self.submissions.retain(|s| s.form_id != form_id);
        self.submissions.push(submission);
        info!(form = %form_id, "Saved submission");

        Ok(vec![
            Effect::PersistSubmissions,
            Effect::Notify(Notification::SubmissionSaved { form_title }),
        ])
    }

    fn export(&self) -> Result<Vec<Effect>, Rejection> {
        let form = &self.forms[self.active_index()?];
        let effect = match SheetTable::build(form, &self.submissions) {
            Some(table) => Effect::WriteSpreadsheet(table),
            None => Effect::Notify(Notification::NothingToExport {
                form_title: form.title.clone(),
            }),
        };
        Ok(vec![effect])
    }
}
