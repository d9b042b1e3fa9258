//! Minimum-age check for the signup form.

use super::{FormState, Validity};

pub const DEFAULT_MIN_AGE: i64 = 18;

/// Live and on-submit check of the age field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeGate {
    pub field: String,
    pub min_age: i64,
    pub message: String,
}

impl Default for AgeGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_AGE)
    }
}

impl AgeGate {
    pub fn new(min_age: i64) -> Self {
        Self {
            field: "age".into(),
            min_age,
            message: format!("You must be at least {min_age} years old to volunteer."),
        }
    }

    /// `None` = empty or not a number, the field is left unmarked.
    pub fn assess(&self, raw: &str) -> Option<Validity> {
        let age = parse_leading_int(raw)?;
        if age < self.min_age {
            Some(Validity::Invalid(self.message.clone()))
        } else {
            Some(Validity::Valid)
        }
    }

    /// True when a value is present and below the minimum.
    pub fn blocks(&self, raw: &str) -> bool {
        matches!(self.assess(raw), Some(Validity::Invalid(_)))
    }

    /// Live feedback while typing. Re-applying the same value is a no-op.
    pub fn on_input(&self, state: &mut FormState, raw: &str) {
        match self.assess(raw) {
            Some(Validity::Valid) => state.mark_valid(&self.field),
            Some(Validity::Invalid(msg)) => state.mark_invalid(&self.field, msg),
            None => state.clear_annotation(&self.field),
        }
    }
}

/// Leading integer of `raw`, skipping leading whitespace ("17 years" -> 17).
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first()? {
        b'-' => (-1, &s[1..]),
        b'+' => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // saturate absurd inputs instead of failing the parse
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn seventeen_is_invalid_eighteen_valid() {
        let gate = AgeGate::default();
        let mut state = FormState::default();

        gate.on_input(&mut state, "17");
        assert_eq!(
            state.annotation("age"),
            Some(&Validity::Invalid(
                "You must be at least 18 years old to volunteer.".into()
            ))
        );

        gate.on_input(&mut state, "18");
        assert_eq!(state.annotation("age"), Some(&Validity::Valid));
        assert_eq!(state.annotations.len(), 1);
    }

    #[test]
    fn empty_or_garbage_is_neither() {
        let gate = AgeGate::default();
        let mut state = FormState::default();
        gate.on_input(&mut state, "17");
        gate.on_input(&mut state, "");
        assert!(state.annotation("age").is_none());
        gate.on_input(&mut state, "abc");
        assert!(state.annotation("age").is_none());
    }

    #[test]
    fn repeated_input_stays_single_annotation() {
        let gate = AgeGate::default();
        let mut state = FormState::default();
        gate.on_input(&mut state, "1");
        gate.on_input(&mut state, "17");
        gate.on_input(&mut state, "17");
        assert_eq!(state.annotations.len(), 1);
        assert!(state.is_invalid("age"));
    }

    #[test]
    fn parses_like_leading_integer() {
        assert_eq!(parse_leading_int("  21"), Some(21));
        assert_eq!(parse_leading_int("17 years"), Some(17));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("x1"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert!(AgeGate::default().blocks("-3"));
        assert!(!AgeGate::default().blocks(""));
    }
}
