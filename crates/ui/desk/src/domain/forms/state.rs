//! Form runtime (mutable) state.
//!
//! Captured values plus the per-field validity annotations the renderer
//! projects onto the fields. Free of UI concerns.

use std::collections::HashMap;

/// Visual validity of one field. A field without an entry is unmarked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Submission {
    #[default]
    Idle,
    /// Submit control disabled, busy indicator shown.
    Submitting,
}

#[derive(Debug, Default, Clone)]
pub struct FormState {
    pub values: HashMap<String, String>,
    pub annotations: HashMap<String, Validity>,
    /// Form-level messages (e.g. the server rejecting a submission).
    pub global_errors: Vec<String>,
    pub submission: Submission,
}

impl FormState {
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Missing or whitespace-only.
    pub fn is_blank(&self, key: &str) -> bool {
        self.get_value(key).is_none_or(|v| v.trim().is_empty())
    }

    pub fn annotation(&self, key: &str) -> Option<&Validity> {
        self.annotations.get(key)
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        match self.annotations.get(key) {
            Some(Validity::Invalid(msg)) => Some(msg),
            _ => None,
        }
    }

    pub fn is_invalid(&self, key: &str) -> bool {
        matches!(self.annotations.get(key), Some(Validity::Invalid(_)))
    }

    pub fn is_valid(&self, key: &str) -> bool {
        matches!(self.annotations.get(key), Some(Validity::Valid))
    }

    pub fn mark_valid(&mut self, key: &str) {
        self.annotations.insert(key.to_string(), Validity::Valid);
    }

    /// At most one annotation per field: marking twice replaces, never duplicates.
    pub fn mark_invalid(&mut self, key: &str, message: impl Into<String>) {
        self.annotations
            .insert(key.to_string(), Validity::Invalid(message.into()));
    }

    pub fn clear_annotation(&mut self, key: &str) {
        self.annotations.remove(key);
    }

    /// Drop every `Invalid` annotation, keep `Valid` ones.
    pub fn clear_invalid(&mut self) {
        self.annotations
            .retain(|_, v| matches!(v, Validity::Valid));
        self.global_errors.clear();
    }

    pub fn is_submitting(&self) -> bool {
        self.submission == Submission::Submitting
    }

    /// Values in the given key order, blanks included, for posting.
    pub fn ordered_values<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a str>,
    ) -> Vec<(String, String)> {
        keys.into_iter()
            .map(|k| (k.to_string(), self.get_value(k).unwrap_or("").to_string()))
            .collect()
    }
}
