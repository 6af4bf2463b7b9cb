//! Persistence of the form registry and submissions.
//!
//! Both collections are kept as JSON text under fixed keys of a
//! [`KeyValueStore`]. A value that is missing or does not parse loads as an
//! empty collection.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::form::{FormDefinition, FormSubmission};
use crate::storage::KeyValueStore;

/// Key holding the JSON array of form definitions.
pub const FORMS_KEY: &str = "customForms";

/// Key holding the JSON array of submissions.
pub const SUBMISSIONS_KEY: &str = "formSubmissions";

/// Loads and saves the two persisted collections.
#[derive(Debug)]
pub struct FormStore<S> {
    backend: S,
}

impl<S: KeyValueStore> FormStore<S> {
    /// Wrap a key/value backend.
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load the form registry.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend cannot be read.
    pub fn load_forms(&self) -> Result<Vec<FormDefinition>> {
        self.load_collection(FORMS_KEY)
    }

    /// Load the submission list.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend cannot be read.
    pub fn load_submissions(&self) -> Result<Vec<FormSubmission>> {
        self.load_collection(SUBMISSIONS_KEY)
    }

    /// Replace the stored form registry.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save_forms(&self, forms: &[FormDefinition]) -> Result<()> {
        self.save_collection(FORMS_KEY, forms)
    }

    /// Replace the stored submission list.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save_submissions(&self, submissions: &[FormSubmission]) -> Result<()> {
        self.save_collection(SUBMISSIONS_KEY, submissions)
    }

    fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let Some(text) = self.backend.get_item(key)? else {
            debug!(key, "Nothing stored, starting empty");
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<T>>(&text) {
            Ok(items) => {
                debug!(key, count = items.len(), "Loaded collection");
                Ok(items)
            }
            Err(err) => {
                warn!(key, %err, "Stored value is malformed, starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn save_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let text = serde_json::to_string(items)?;
        self.backend.set_item(key, &text)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::form::{FieldType, FieldValue, FormData, FormField};
    use crate::logging::init_test_logging;
    use crate::storage::Storage;

    fn create_test_store() -> FormStore<Storage> {
        FormStore::new(Storage::open_in_memory().expect("failed to create test storage"))
    }

    fn sample_forms() -> Vec<FormDefinition> {
        let mut survey = FormDefinition::new("1700000000000", "Survey");
        survey
            .fields
            .push(FormField::new("1", FieldType::Text, "Name", true).with_placeholder("Ana"));
        survey.fields.push(
            FormField::new("2", FieldType::Select, "Color", false).with_options(["Red", "Blue"]),
        );
        let empty = FormDefinition::new("1700000000001", "Empty");
        vec![survey, empty]
    }

    #[test]
    fn test_empty_store_loads_empty() {
        let store = create_test_store();
        assert!(store.load_forms().unwrap().is_empty());
        assert!(store.load_submissions().unwrap().is_empty());
    }

    #[test]
    fn test_forms_roundtrip_preserves_order_and_content() {
        let store = create_test_store();
        let forms = sample_forms();
        store.save_forms(&forms).unwrap();
        assert_eq!(store.load_forms().unwrap(), forms);
    }

    #[test]
    fn test_submissions_roundtrip() {
        let store = create_test_store();
        let mut data = FormData::new();
        data.insert("1".into(), FieldValue::Text("Ana".into()));
        data.insert("3".into(), FieldValue::Number(2.5));
        data.insert("4".into(), FieldValue::Bool(true));
        let subs = vec![FormSubmission::new("1700000000000", Utc::now(), data)];

        store.save_submissions(&subs).unwrap();
        assert_eq!(store.load_submissions().unwrap(), subs);
    }

    #[test]
    fn test_malformed_value_loads_empty() {
        init_test_logging();
        let store = create_test_store();
        store.backend().set_item(FORMS_KEY, "{not json").unwrap();
        store.backend().set_item(SUBMISSIONS_KEY, "42").unwrap();
        assert!(store.load_forms().unwrap().is_empty());
        assert!(store.load_submissions().unwrap().is_empty());
    }

    #[test]
    fn test_reads_browser_written_json() {
        let store = create_test_store();
        store
            .backend()
            .set_item(
                FORMS_KEY,
                r#"[{"id":"1","title":"Survey","fields":[{"id":"2","type":"checkbox","label":"Ok","required":false}]}]"#,
            )
            .unwrap();
        store
            .backend()
            .set_item(
                SUBMISSIONS_KEY,
                r#"[{"formId":"1","timestamp":"2024-03-01T10:15:00.000Z","data":{"2":true}}]"#,
            )
            .unwrap();

        let forms = store.load_forms().unwrap();
        assert_eq!(forms[0].fields[0].field_type, FieldType::Checkbox);
        let subs = store.load_submissions().unwrap();
        assert_eq!(subs[0].data["2"], FieldValue::Bool(true));
    }

    #[test]
    fn test_collections_are_independent() {
        let store = create_test_store();
        store.save_forms(&sample_forms()).unwrap();
        assert!(store.load_submissions().unwrap().is_empty());
        assert_eq!(
            store.backend().get_item(SUBMISSIONS_KEY).unwrap(),
            None
        );
    }
}
