//! `formdesk` - dynamic personal-data forms
//!
//! Define form schemas, fill them in, and export the collected responses to a
//! spreadsheet. Forms and responses live in a local key/value store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod form;
pub mod logging;
pub mod render;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod templates;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{FieldType, FieldValue, FormData, FormDefinition, FormField, FormSubmission};
pub use logging::init_logging;
pub use session::{Outcome, Session};
pub use state::{AppState, Command, Effect, Notification, Rejection, Tab};
pub use storage::{KeyValueStore, Storage};
pub use store::FormStore;
