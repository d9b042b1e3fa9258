//! High-level state of the desk.
//!
//! `WizardState` is the per-activation record of the export wizard. It is a
//! plain value: `Default` is the state a fresh (or reset) wizard starts in.
//! `ExportWizard` wraps it together with the data that must outlive a reset
//! (catalog, timing, request counters).
//!
//! `DeskState` aggregates everything the pages render from. It is owned by the
//! UI task; nothing in here is shared across threads.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::NaiveDate;
use portal::{
    Category, CategoryId, DashboardStats, ExportFilters, ExportFormat, ExportRequest, Filename,
    Opportunity, OpportunitySummary,
};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Wizard step. The number shown to the user is `number()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter)]
pub enum Step {
    #[default]
    Configure,
    Preview,
    Export,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Configure => 1,
            Step::Preview => 2,
            Step::Export => 3,
        }
    }

    pub fn count() -> usize {
        Step::iter().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Progress inside the Export step. Exporting and Succeeded exclude each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportPhase {
    #[default]
    Idle,
    Exporting,
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    pub step: Step,
    pub format: ExportFormat,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub selected_categories: BTreeSet<CategoryId>,
    pub filename: Filename,
    pub preview_rows: Vec<OpportunitySummary>,
    pub total_count: u64,
    pub total_volunteers: u64,
    pub preview: PreviewStatus,
    pub phase: ExportPhase,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: Step::Configure,
            format: ExportFormat::Csv,
            date_from: None,
            date_to: None,
            selected_categories: BTreeSet::new(),
            filename: Filename::default(),
            preview_rows: Vec::new(),
            total_count: 0,
            total_volunteers: 0,
            preview: PreviewStatus::Idle,
            phase: ExportPhase::Idle,
        }
    }
}

impl WizardState {
    pub fn is_exporting(&self) -> bool {
        self.phase == ExportPhase::Exporting
    }

    pub fn export_succeeded(&self) -> bool {
        self.phase == ExportPhase::Succeeded
    }

    pub fn preview_loading(&self) -> bool {
        self.preview == PreviewStatus::Loading
    }

    /// Preview -> Export needs rows and no fetch in flight.
    pub fn can_proceed_to_export(&self) -> bool {
        self.step == Step::Preview && !self.preview_loading() && !self.preview_rows.is_empty()
    }

    pub fn filters(&self) -> ExportFilters {
        ExportFilters {
            date_from: self.date_from,
            date_to: self.date_to,
            categories: self.selected_categories.clone(),
        }
    }

    pub fn export_request(&self) -> ExportRequest {
        ExportRequest {
            format: self.format,
            filters: self.filters(),
            filename: self.filename.clone(),
        }
    }

    /// Human readable summary of the active filters for the preview step.
    pub fn filter_summary(&self, catalog: &[Category]) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(from) = self.date_from {
            parts.push(format!("From: {from}"));
        }
        if let Some(to) = self.date_to {
            parts.push(format!("To: {to}"));
        }
        if !self.selected_categories.is_empty() {
            let names: Vec<&str> = catalog
                .iter()
                .filter(|c| self.selected_categories.contains(&c.id))
                .map(|c| c.name.as_str())
                .collect();
            if names.is_empty() {
                parts.push(format!("Categories: {}", self.selected_categories.len()));
            } else {
                parts.push(format!("Categories: {}", names.join(", ")));
            }
        }
        if parts.is_empty() {
            parts.push("All data (no filters)".to_string());
        }
        parts
    }
}

/// Delays of the optimistic export confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportTiming {
    /// Exporting -> Succeeded
    pub success_delay: Duration,
    /// Succeeded -> reset
    pub reset_delay: Duration,
}

impl Default for ExportTiming {
    fn default() -> Self {
        Self {
            success_delay: Duration::from_millis(1000),
            reset_delay: Duration::from_millis(2000),
        }
    }
}

/// One wizard instance.
///
/// `preview_seq` and `export_ticket` only ever grow, also across resets, so a
/// late response or timer can always be told apart from the current one.
#[derive(Debug, Clone, Default)]
pub struct ExportWizard {
    pub state: WizardState,
    pub catalog: Vec<Category>,
    pub timing: ExportTiming,
    pub active: bool,
    pub preview_seq: u64,
    pub export_ticket: u64,
    /// Last download outcome, for display only.
    pub notice: Option<String>,
}

impl ExportWizard {
    pub fn new(timing: ExportTiming) -> Self {
        Self {
            timing,
            ..Self::default()
        }
    }

    /// Back to `WizardState::default()`; in-flight previews and timers go stale.
    pub fn reset(&mut self) {
        self.state = WizardState::default();
        self.preview_seq += 1;
        self.export_ticket += 1;
    }

    pub fn next_preview_seq(&mut self) -> u64 {
        self.preview_seq += 1;
        self.preview_seq
    }

    pub fn next_export_ticket(&mut self) -> u64 {
        self.export_ticket += 1;
        self.export_ticket
    }

    pub fn all_category_ids(&self) -> BTreeSet<CategoryId> {
        self.catalog.iter().map(|c| c.id).collect()
    }
}

/// Pages of the terminal UI, in tab order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter)]
pub enum PageId {
    #[default]
    #[strum(to_string = "Opportunities")]
    Opportunities,
    #[strum(to_string = "Export")]
    Export,
    #[strum(to_string = "Sign Up")]
    Signup,
    #[strum(to_string = "New Opportunity")]
    NewOpportunity,
}

impl PageId {
    pub fn index(self) -> usize {
        PageId::iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<PageId> {
        PageId::iter().nth(index)
    }
}

/// Root state the pages render from.
#[derive(Debug, Default)]
pub struct DeskState {
    pub wizard: ExportWizard,
    pub opportunities: Vec<Opportunity>,
    pub opportunities_loaded: bool,
    pub categories: Vec<Category>,
    pub stats: Option<DashboardStats>,
    pub active_page: PageId,
    pub quit_requested: bool,
}

impl DeskState {
    pub fn new(timing: ExportTiming, start: PageId) -> Self {
        Self {
            wizard: ExportWizard::new(timing),
            active_page: start,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_state_matches_fresh_wizard() {
        let s = WizardState::default();
        assert_eq!(s.step, Step::Configure);
        assert_eq!(s.format, ExportFormat::Csv);
        assert_eq!(s.filename.as_str(), "volunteer_opportunities");
        assert!(!s.is_exporting() && !s.export_succeeded() && !s.preview_loading());
        assert_eq!(s.total_count, 0);
    }

    #[test]
    fn step_numbers_are_one_based() {
        let numbers: Vec<u8> = Step::iter().map(Step::number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(Step::count(), 3);
    }

    #[test]
    fn filter_summary_without_filters() {
        let s = WizardState::default();
        assert_eq!(s.filter_summary(&[]), vec!["All data (no filters)".to_string()]);
    }

    #[test]
    fn filter_summary_names_categories() {
        let mut s = WizardState::default();
        s.date_from = NaiveDate::from_ymd_opt(2024, 1, 1);
        s.selected_categories.insert(2);
        let catalog = vec![
            Category { id: 1, name: "Environment".into(), opportunity_count: 1 },
            Category { id: 2, name: "Community".into(), opportunity_count: 4 },
        ];
        assert_eq!(
            s.filter_summary(&catalog),
            vec!["From: 2024-01-01".to_string(), "Categories: Community".to_string()]
        );
    }

    #[test]
    fn reset_keeps_counters_growing() {
        let mut w = ExportWizard::default();
        let seq = w.next_preview_seq();
        let ticket = w.next_export_ticket();
        w.state.step = Step::Export;
        w.reset();
        assert_eq!(w.state, WizardState::default());
        assert!(w.preview_seq > seq);
        assert!(w.export_ticket > ticket);
    }

    #[test]
    fn page_ids_round_trip_index() {
        for page in PageId::iter() {
            assert_eq!(PageId::from_index(page.index()), Some(page));
        }
        assert_eq!(PageId::Signup.to_string(), "Sign Up");
    }
}
