//! User intents understood by the export wizard reducer.
//!
//! Pages translate keys into these; executor results travel separately as
//! `InternalEvent`s.

use chrono::NaiveDate;
use portal::{CategoryId, ExportFormat};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Wizard opened: fresh state, category list fetched once.
    Open,
    /// Wizard closed: fresh state, catalog dropped.
    Close,
    SelectFormat(ExportFormat),
    SetDateFrom(Option<NaiveDate>),
    SetDateTo(Option<NaiveDate>),
    ToggleCategory(CategoryId),
    SelectAllCategories,
    ClearCategories,
    /// Raw user input; sanitized on the way into the state.
    SetFilename(String),
    Next,
    Back,
    ConfirmExport,
}
