//! Form schema and the required-field table.
//!
//! Both forms (opportunity, signup) describe their required fields with the
//! same `RequiredFields` structure: field key -> error message. The table can
//! be overridden from the config file, the field order always comes from the
//! schema.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::FormField;

/// `{ field key -> error message }` for every field that must not be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequiredFields(BTreeMap<String, String>);

impl RequiredFields {
    pub fn new<K, M>(entries: impl IntoIterator<Item = (K, M)>) -> Self
    where
        K: Into<String>,
        M: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, m)| (k.into(), m.into()))
                .collect(),
        )
    }

    pub fn message(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Replace messages (and add fields) from `overrides`.
    pub fn merge(mut self, overrides: &RequiredFields) -> Self {
        for (k, m) in &overrides.0 {
            self.0.insert(k.clone(), m.clone());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Declarative schema for a form.
///
/// - `title`:        Display title
/// - `description`:  Optional descriptive text rendered above the fields
/// - `fields`:       Ordered collection of `FormField` definitions
/// - `submit_path`:  Server-rendered endpoint the form posts to
/// - `busy_label`:   Shown on the submit control while a submission is in flight
#[derive(Debug, Clone)]
pub struct FormSchema {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<FormField>,
    pub submit_path: String,
    pub busy_label: String,
}

impl FormSchema {
    pub fn new(
        title: impl Into<String>,
        submit_path: impl Into<String>,
        fields: Vec<FormField>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields,
            submit_path: submit_path.into(),
            busy_label: "Saving...".into(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn busy_label(mut self, label: impl Into<String>) -> Self {
        self.busy_label = label.into();
        self
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_by_key(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_messages() {
        let base = RequiredFields::new([("name", "Name is required."), ("age", "Age is required.")]);
        let overrides = RequiredFields::new([("name", "Bitte Namen angeben.")]);
        let merged = base.merge(&overrides);
        assert_eq!(merged.message("name"), Some("Bitte Namen angeben."));
        assert_eq!(merged.message("age"), Some("Age is required."));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn required_fields_deserialize_from_plain_table() {
        let parsed: RequiredFields =
            serde_json::from_str(r#"{"title": "Title missing"}"#).unwrap();
        assert!(parsed.contains("title"));
    }
}
