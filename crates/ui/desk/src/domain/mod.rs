//! UI-free behaviour: form validation and the opportunity list filter.

pub mod forms;
pub mod listing;
