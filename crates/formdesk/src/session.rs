//! A form-builder session: state plus the store it mirrors to.
//!
//! [`Session::dispatch`] runs a [`Command`] through [`AppState::apply`] and
//! then carries out the returned effects in order: persisting whichever
//! collection changed, collecting notifications, writing spreadsheets.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::export::Exporter;
use crate::state::{AppState, Command, Effect, Notification};
use crate::storage::KeyValueStore;
use crate::store::FormStore;

/// What a dispatched command produced besides state changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Notifications to show, in order.
    pub notifications: Vec<Notification>,
    /// Path of the spreadsheet written, if any.
    pub exported: Option<PathBuf>,
}

/// Counts over the loaded collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Forms in the registry.
    pub forms: usize,
    /// Fields across all forms.
    pub fields: usize,
    /// Stored submissions.
    pub submissions: usize,
}

/// Owns the in-memory state and keeps the store in step with it.
#[derive(Debug)]
pub struct Session<S> {
    store: FormStore<S>,
    state: AppState,
    exporter: Exporter,
}

impl<S: KeyValueStore> Session<S> {
    /// Load both collections from `backend` and start a session over them.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read. Malformed stored
    /// values load as empty collections.
    pub fn open(backend: S, exporter: Exporter) -> Result<Self> {
        let store = FormStore::new(backend);
        let forms = store.load_forms()?;
        let submissions = store.load_submissions()?;
        debug!(
            forms = forms.len(),
            submissions = submissions.len(),
            "Session opened"
        );
        Ok(Self {
            store,
            state: AppState::new(forms, submissions),
            exporter,
        })
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &FormStore<S> {
        &self.store
    }

    /// The exporter used for spreadsheet effects.
    #[must_use]
    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Replace the exporter.
    pub fn set_exporter(&mut self, exporter: Exporter) {
        self.exporter = exporter;
    }

    /// Dispatch `command` at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] if the command was refused, or an error
    /// from persisting or exporting.
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        self.dispatch_at(command, Utc::now())
    }

    /// Dispatch `command` as if it happened at `now`.
    ///
    /// # Errors
    ///
    /// Same as [`Session::dispatch`].
    pub fn dispatch_at(&mut self, command: Command, now: DateTime<Utc>) -> Result<Outcome> {
        let effects = self.state.apply(command, now)?;
        let mut outcome = Outcome::default();
        for effect in effects {
            match effect {
                Effect::PersistForms => self.store.save_forms(self.state.forms())?,
                Effect::PersistSubmissions => {
                    self.store.save_submissions(self.state.submissions())?;
                }
                Effect::Notify(notification) => outcome.notifications.push(notification),
                Effect::WriteSpreadsheet(table) => {
                    outcome.exported = Some(self.exporter.write(&table)?);
                }
            }
        }
        Ok(outcome)
    }

    /// Make the form with this id or title active and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormNotFound`] if nothing matches.
    pub fn select(&mut self, reference: &str) -> Result<String> {
        let id = self
            .state
            .find_form(reference)
            .map(|f| f.id.clone())
            .ok_or_else(|| Error::form_not_found(reference))?;
        self.dispatch(Command::SelectForm { id: id.clone() })?;
        Ok(id)
    }

    /// Counts over the loaded collections.
    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            forms: self.state.forms().len(),
            fields: self.state.forms().iter().map(|f| f.fields.len()).sum(),
            submissions: self.state.submissions().len(),
        }
    }
}
