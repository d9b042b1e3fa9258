pub mod age;
pub mod catalog;
pub mod field;
pub mod schema;
pub mod state;
pub mod validation;

pub use age::AgeGate;
pub use field::{FormField, FormFieldKind, SelectOption};
pub use schema::{FormSchema, RequiredFields};
pub use state::{FormState, Submission, Validity};
pub use validation::{FieldValidator, SubmitDecision, SubmitOutcome, validate_submit};
