//! Advisory client-side validation for the portal forms.
//!
//! `validate_submit` is a pure mapping from form state to per-field
//! annotations. `FieldValidator` applies the blur/input/submit rules on top of
//! it and owns the optional age gate. The server stays authoritative: an
//! allowed submission is still posted and may be rejected there.

use std::collections::BTreeMap;

use super::{AgeGate, FormSchema, FormState, RequiredFields, Submission};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// New `Invalid` annotations produced by this pass.
    pub invalid: BTreeMap<String, String>,
    /// First invalid field in schema order; focus moves there.
    pub first_invalid: Option<String>,
}

impl SubmitOutcome {
    pub fn allowed(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Required-field pass: every blank required field is invalid.
///
/// Filled fields produce nothing, so they keep whatever annotation they had.
pub fn validate_submit(
    schema: &FormSchema,
    required: &RequiredFields,
    state: &FormState,
) -> SubmitOutcome {
    let mut outcome = SubmitOutcome::default();
    for field in &schema.fields {
        let Some(message) = required.message(&field.key) else {
            continue;
        };
        if state.is_blank(&field.key) {
            outcome
                .invalid
                .insert(field.key.clone(), message.to_string());
            outcome.first_invalid.get_or_insert_with(|| field.key.clone());
        }
    }
    outcome
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Form moved to `Submitting`, the caller posts it.
    Proceed,
    Blocked(SubmitOutcome),
    /// A submission is already in flight.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct FieldValidator {
    pub required: RequiredFields,
    pub age_gate: Option<AgeGate>,
}

impl FieldValidator {
    pub fn new(required: RequiredFields) -> Self {
        Self {
            required,
            age_gate: None,
        }
    }

    pub fn with_age_gate(mut self, gate: AgeGate) -> Self {
        self.age_gate = Some(gate);
        self
    }

    /// Field lost focus: a non-empty value is marked valid.
    pub fn on_blur(&self, state: &mut FormState, key: &str) {
        if self.is_age_field(key) {
            return;
        }
        if !state.is_blank(key) {
            state.mark_valid(key);
        }
    }

    /// Value changed. Clears a previous error as soon as the field is filled;
    /// the age field gets live feedback instead.
    pub fn on_input(&self, state: &mut FormState, key: &str, value: &str) {
        state.set_value(key, value);
        if let Some(gate) = self.age_gate.as_ref().filter(|g| g.field == key) {
            gate.on_input(state, value);
            return;
        }
        if state.is_invalid(key) && !state.is_blank(key) {
            state.mark_valid(key);
        }
    }

    pub fn submit(&self, schema: &FormSchema, state: &mut FormState) -> SubmitDecision {
        if state.is_submitting() {
            return SubmitDecision::Ignored;
        }
        state.clear_invalid();

        let mut outcome = validate_submit(schema, &self.required, state);
        if let Some(gate) = &self.age_gate {
            let raw = state.get_value(&gate.field).unwrap_or("");
            if !outcome.invalid.contains_key(&gate.field) && gate.blocks(raw) {
                outcome
                    .invalid
                    .insert(gate.field.clone(), gate.message.clone());
            }
        }
        outcome.first_invalid = schema
            .fields
            .iter()
            .map(|f| &f.key)
            .find(|k| outcome.invalid.contains_key(*k))
            .cloned();

        for (key, message) in &outcome.invalid {
            state.mark_invalid(key, message.clone());
        }

        if outcome.allowed() {
            state.submission = Submission::Submitting;
            SubmitDecision::Proceed
        } else {
            SubmitDecision::Blocked(outcome)
        }
    }

    /// Server answered; the form becomes editable again.
    pub fn finish(&self, state: &mut FormState, rejection: Option<String>) {
        state.submission = Submission::Idle;
        if let Some(msg) = rejection {
            state.global_errors.push(msg);
        }
    }

    fn is_age_field(&self, key: &str) -> bool {
        self.age_gate.as_ref().is_some_and(|g| g.field == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forms::catalog;
    use pretty_assertions::assert_eq;

    fn signup() -> (FormSchema, FieldValidator) {
        let schema = catalog::signup_form(&[]);
        let validator = FieldValidator::new(catalog::signup_required())
            .with_age_gate(AgeGate::default());
        (schema, validator)
    }

    fn filled_signup() -> FormState {
        let mut state = FormState::default();
        state.set_value("name", "Ada");
        state.set_value("age", "30");
        state.set_value("expertise", "First aid");
        state.set_value("opportunity", "3");
        state
    }

    #[test]
    fn single_empty_field_blocks_and_only_it_is_marked() {
        let (schema, validator) = signup();
        let mut state = filled_signup();
        state.set_value("expertise", "  ");

        let SubmitDecision::Blocked(outcome) = validator.submit(&schema, &mut state) else {
            panic!("a blank required field must block");
        };
        assert_eq!(outcome.first_invalid.as_deref(), Some("expertise"));
        assert_eq!(outcome.invalid.len(), 1);
        assert_eq!(state.error("expertise"), Some("Please describe your expertise."));
        for key in ["name", "age", "opportunity"] {
            assert!(!state.is_invalid(key), "{key} falsely marked");
        }
        assert_eq!(state.submission, Submission::Idle);
    }

    #[test]
    fn first_invalid_follows_field_order() {
        let (schema, validator) = signup();
        let mut state = FormState::default();
        let SubmitDecision::Blocked(outcome) = validator.submit(&schema, &mut state) else {
            panic!("empty form must be blocked");
        };
        assert_eq!(outcome.first_invalid.as_deref(), Some("name"));
        assert_eq!(outcome.invalid.len(), 4);
        assert_eq!(state.error("age"), Some("Age is required."));
    }

    #[test]
    fn underage_blocks_submit() {
        let (schema, validator) = signup();
        let mut state = filled_signup();
        state.set_value("age", "16");
        let SubmitDecision::Blocked(outcome) = validator.submit(&schema, &mut state) else {
            panic!("underage must be blocked");
        };
        assert_eq!(outcome.first_invalid.as_deref(), Some("age"));
        assert!(state.is_invalid("age"));
    }

    #[test]
    fn valid_form_enters_submitting_once() {
        let (schema, validator) = signup();
        let mut state = filled_signup();
        assert_eq!(validator.submit(&schema, &mut state), SubmitDecision::Proceed);
        assert!(state.is_submitting());
        assert_eq!(validator.submit(&schema, &mut state), SubmitDecision::Ignored);

        validator.finish(&mut state, Some("Rejected by server".into()));
        assert!(!state.is_submitting());
        assert_eq!(state.global_errors, vec!["Rejected by server".to_string()]);
    }

    #[test]
    fn input_clears_error_only_when_previously_invalid() {
        let (schema, validator) = signup();
        let mut state = FormState::default();
        validator.on_input(&mut state, "name", "A");
        assert!(state.annotation("name").is_none());

        validator.submit(&schema, &mut state);
        validator.on_input(&mut state, "expertise", "Cooking");
        assert!(state.is_valid("expertise"));
    }

    #[test]
    fn blur_marks_filled_fields_valid() {
        let (_, validator) = signup();
        let mut state = FormState::default();
        validator.on_blur(&mut state, "name");
        assert!(state.annotation("name").is_none());
        state.set_value("name", "Grace");
        validator.on_blur(&mut state, "name");
        assert!(state.is_valid("name"));
    }

    #[test]
    fn age_input_routes_through_gate() {
        let (_, validator) = signup();
        let mut state = FormState::default();
        validator.on_input(&mut state, "age", "17");
        assert!(state.is_invalid("age"));
        validator.on_input(&mut state, "age", "18");
        assert!(state.is_valid("age"));
    }

    #[test]
    fn opportunity_form_uses_same_table_shape() {
        let schema = catalog::opportunity_form(&[]);
        let required = catalog::opportunity_required();
        let mut state = FormState::default();
        state.set_value("title", "Beach Cleanup");
        let outcome = validate_submit(&schema, &required, &state);
        assert!(!outcome.allowed());
        assert!(!outcome.invalid.contains_key("title"));
        assert_eq!(
            outcome.invalid.get("date").map(String::as_str),
            Some("This field is required.")
        );
    }
}
