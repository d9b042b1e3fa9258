//! Export wizard reducer.
//!
//! `reduce` folds a user `Intent` into the wizard, `apply_event` folds an
//! executor result. Both mutate only the wizard and return the side effects
//! as data; the loop hands those to the `TaskExecutor`.
//!
//! Policy:
//!   - Intents that do not fit the current step are ignored (no effect).
//!   - Preview results are applied only for the latest `preview_seq`.
//!   - Timer events are applied only for the current `export_ticket`.
//!   - A download result never drives the state machine; it is only noticed.

use portal::Filename;

use crate::core::effects::{Effect, InternalEvent, TaskKind};
use crate::core::intent_model::Intent;
use crate::core::state::{DeskState, ExportPhase, ExportWizard, PreviewStatus, Step};

pub fn reduce(wizard: &mut ExportWizard, intent: Intent) -> Vec<Effect> {
    if !wizard.active && intent != Intent::Open {
        return Vec::new();
    }
    let step = wizard.state.step;

    match intent {
        Intent::Open => {
            wizard.reset();
            wizard.active = true;
            wizard.notice = None;
            vec![Effect::async_task(TaskKind::FetchCategories)]
        }
        Intent::Close => {
            wizard.reset();
            wizard.active = false;
            wizard.catalog.clear();
            wizard.notice = None;
            Vec::new()
        }

        // --- Configure step edits ------------------------------------------------------------
        Intent::SelectFormat(format) if step == Step::Configure => {
            wizard.state.format = format;
            Vec::new()
        }
        Intent::SetDateFrom(date) if step == Step::Configure => {
            wizard.state.date_from = date;
            Vec::new()
        }
        Intent::SetDateTo(date) if step == Step::Configure => {
            wizard.state.date_to = date;
            Vec::new()
        }
        Intent::ToggleCategory(id) if step == Step::Configure => {
            let selected = &mut wizard.state.selected_categories;
            if !selected.remove(&id) {
                selected.insert(id);
            }
            Vec::new()
        }
        Intent::SelectAllCategories if step == Step::Configure => {
            wizard.state.selected_categories = wizard.all_category_ids();
            Vec::new()
        }
        Intent::ClearCategories if step == Step::Configure => {
            wizard.state.selected_categories.clear();
            Vec::new()
        }
        Intent::SetFilename(raw) if step == Step::Configure => {
            wizard.state.filename = Filename::sanitize(&raw);
            Vec::new()
        }

        // --- Navigation ----------------------------------------------------------------------
        Intent::Next => match step {
            Step::Configure => enter_preview(wizard),
            Step::Preview if wizard.state.can_proceed_to_export() => {
                wizard.state.step = Step::Export;
                wizard.state.phase = ExportPhase::Idle;
                Vec::new()
            }
            _ => Vec::new(),
        },
        Intent::Back => match step {
            Step::Preview => {
                wizard.state.step = Step::Configure;
                Vec::new()
            }
            Step::Export if wizard.state.phase == ExportPhase::Idle => enter_preview(wizard),
            _ => Vec::new(),
        },
        Intent::ConfirmExport
            if step == Step::Export && wizard.state.phase == ExportPhase::Idle =>
        {
            let request = wizard.state.export_request();
            let ticket = wizard.next_export_ticket();
            wizard.state.phase = ExportPhase::Exporting;
            wizard.notice = None;
            vec![
                Effect::log(format!("export started: {}", request.file_name())),
                Effect::async_task(TaskKind::Download(request)),
                Effect::async_task(TaskKind::ExportDelay {
                    ticket,
                    delay: wizard.timing.success_delay,
                }),
            ]
        }

        _ => Vec::new(),
    }
}

fn enter_preview(wizard: &mut ExportWizard) -> Vec<Effect> {
    wizard.state.step = Step::Preview;
    wizard.state.phase = ExportPhase::Idle;
    wizard.state.preview = PreviewStatus::Loading;
    let seq = wizard.next_preview_seq();
    vec![Effect::async_task(TaskKind::FetchPreview {
        seq,
        filters: wizard.state.filters(),
    })]
}

pub fn apply_event(wizard: &mut ExportWizard, event: &InternalEvent) -> Vec<Effect> {
    match event {
        InternalEvent::CategoriesLoaded(categories) => {
            if !wizard.active {
                return Vec::new();
            }
            wizard.catalog = categories.clone();
            vec![Effect::log(format!("{} categories loaded", categories.len()))]
        }
        InternalEvent::CategoriesFailed(error) => {
            vec![Effect::log(format!("loading categories failed: {error}"))]
        }
        InternalEvent::PreviewLoaded { seq, page } => {
            if *seq != wizard.preview_seq {
                return vec![Effect::log(format!(
                    "discarding stale preview (seq={seq}, latest={})",
                    wizard.preview_seq
                ))];
            }
            wizard.state.preview_rows = page.opportunities.clone();
            wizard.state.total_count = page.total_count;
            wizard.state.total_volunteers = page.total_volunteers;
            wizard.state.preview = PreviewStatus::Loaded;
            Vec::new()
        }
        InternalEvent::PreviewFailed { seq, error } => {
            if *seq != wizard.preview_seq {
                return vec![Effect::log(format!("discarding stale preview error (seq={seq})"))];
            }
            wizard.state.preview_rows.clear();
            wizard.state.total_count = 0;
            wizard.state.total_volunteers = 0;
            wizard.state.preview = PreviewStatus::Failed(error.clone());
            vec![Effect::log(format!("preview failed: {error}"))]
        }
        InternalEvent::ExportDelayElapsed { ticket } => {
            if *ticket != wizard.export_ticket || !wizard.state.is_exporting() {
                return Vec::new();
            }
            wizard.state.phase = ExportPhase::Succeeded;
            vec![Effect::async_task(TaskKind::ResetDelay {
                ticket: *ticket,
                delay: wizard.timing.reset_delay,
            })]
        }
        InternalEvent::ResetDelayElapsed { ticket } => {
            if *ticket != wizard.export_ticket || !wizard.state.export_succeeded() {
                return Vec::new();
            }
            wizard.reset();
            Vec::new()
        }
        InternalEvent::DownloadFinished { path } => {
            wizard.notice = Some(format!("Saved to {}", path.display()));
            vec![Effect::log(format!("export written to {}", path.display()))]
        }
        InternalEvent::DownloadFailed { error } => {
            wizard.notice = Some(format!("Download failed: {error}"));
            vec![Effect::log(format!("export download failed: {error}"))]
        }
        _ => Vec::new(),
    }
}

/// Fold an executor result into the desk: shared data first, then the wizard.
pub fn reduce_internal(desk: &mut DeskState, event: &InternalEvent) -> Vec<Effect> {
    match event {
        InternalEvent::CategoriesLoaded(categories) => {
            desk.categories = categories.clone();
        }
        InternalEvent::OpportunitiesLoaded(list) => {
            desk.opportunities = list.clone();
            desk.opportunities_loaded = true;
        }
        InternalEvent::DashboardLoaded(stats) => {
            desk.stats = Some(stats.clone());
        }
        InternalEvent::OpportunitiesFailed(error) | InternalEvent::DashboardFailed(error) => {
            return vec![Effect::log(format!("portal request failed: {error}"))];
        }
        _ => {}
    }
    apply_event(&mut desk.wizard, event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use portal::{Category, ExportFormat, OpportunitySummary, PreviewPage};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    use crate::core::state::WizardState;

    fn opened() -> ExportWizard {
        let mut w = ExportWizard::default();
        reduce(&mut w, Intent::Open);
        apply_event(
            &mut w,
            &InternalEvent::CategoriesLoaded(vec![
                Category { id: 1, name: "Environment".into(), opportunity_count: 3 },
                Category { id: 2, name: "Community".into(), opportunity_count: 0 },
            ]),
        );
        w
    }

    fn row() -> OpportunitySummary {
        OpportunitySummary {
            id: 1,
            title: "Beach Cleanup".into(),
            category: "Environment".into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            volunteer_count: 4,
        }
    }

    fn page(rows: Vec<OpportunitySummary>) -> PreviewPage {
        PreviewPage {
            total_count: rows.len() as u64,
            total_volunteers: rows.iter().map(|r| r.volunteer_count).sum(),
            opportunities: rows,
        }
    }

    fn preview_tasks(effects: &[Effect]) -> Vec<u64> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Async(TaskKind::FetchPreview { seq, .. }) => Some(*seq),
                _ => None,
            })
            .collect()
    }

    /// Configure -> Preview with rows loaded.
    fn in_preview_with_rows() -> ExportWizard {
        let mut w = opened();
        reduce(&mut w, Intent::Next);
        let seq = w.preview_seq;
        apply_event(&mut w, &InternalEvent::PreviewLoaded { seq, page: page(vec![row()]) });
        w
    }

    #[test]
    fn open_fetches_categories_once() {
        let mut w = ExportWizard::default();
        let effects = reduce(&mut w, Intent::Open);
        let fetches = effects
            .iter()
            .filter(|e| matches!(e, Effect::Async(TaskKind::FetchCategories)))
            .count();
        assert_eq!(fetches, 1);
        assert_eq!(effects.len(), 1);
        assert!(w.active);
        assert_eq!(w.state, WizardState::default());
    }

    #[test]
    fn intents_ignored_while_closed() {
        let mut w = ExportWizard::default();
        assert!(reduce(&mut w, Intent::Next).is_empty());
        assert_eq!(w.state.step, Step::Configure);
    }

    #[test]
    fn entering_preview_issues_exactly_one_fetch() {
        let mut w = opened();
        let effects = reduce(&mut w, Intent::Next);
        assert_eq!(preview_tasks(&effects), vec![w.preview_seq]);
        assert_eq!(w.state.step, Step::Preview);
        assert!(w.state.preview_loading());
    }

    #[test]
    fn preview_fetch_carries_current_filters() {
        let mut w = opened();
        reduce(&mut w, Intent::SetDateFrom(NaiveDate::from_ymd_opt(2024, 1, 1)));
        reduce(&mut w, Intent::ToggleCategory(2));
        let effects = reduce(&mut w, Intent::Next);
        let Some(Effect::Async(TaskKind::FetchPreview { filters, .. })) = effects.first() else {
            panic!("expected a preview fetch");
        };
        assert_eq!(filters.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filters.categories.iter().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn export_blocked_while_loading_or_empty() {
        let mut w = opened();
        reduce(&mut w, Intent::Next);
        reduce(&mut w, Intent::Next);
        assert_eq!(w.state.step, Step::Preview, "blocked while loading");

        let seq = w.preview_seq;
        apply_event(&mut w, &InternalEvent::PreviewLoaded { seq, page: page(vec![]) });
        reduce(&mut w, Intent::Next);
        assert_eq!(w.state.step, Step::Preview, "blocked with no rows");
    }

    #[test]
    fn stale_preview_is_discarded() {
        let mut w = opened();
        reduce(&mut w, Intent::Next);
        let first = w.preview_seq;
        reduce(&mut w, Intent::Back);
        reduce(&mut w, Intent::Next);
        let second = w.preview_seq;
        assert!(second > first);

        apply_event(&mut w, &InternalEvent::PreviewLoaded { seq: first, page: page(vec![row()]) });
        assert!(w.state.preview_rows.is_empty());
        assert!(w.state.preview_loading());

        apply_event(&mut w, &InternalEvent::PreviewLoaded { seq: second, page: page(vec![row()]) });
        assert_eq!(w.state.preview_rows.len(), 1);
        assert_eq!(w.state.total_volunteers, 4);
        assert_eq!(w.state.preview, PreviewStatus::Loaded);
    }

    #[test]
    fn failed_preview_differs_from_empty() {
        let mut w = in_preview_with_rows();
        reduce(&mut w, Intent::Back);
        reduce(&mut w, Intent::Next);
        let seq = w.preview_seq;
        apply_event(&mut w, &InternalEvent::PreviewFailed { seq, error: "timeout".into() });
        assert!(w.state.preview_rows.is_empty());
        assert_eq!(w.state.preview, PreviewStatus::Failed("timeout".into()));
        reduce(&mut w, Intent::Next);
        assert_eq!(w.state.step, Step::Preview);
    }

    #[test]
    fn back_from_export_refetches_preview() {
        let mut w = in_preview_with_rows();
        reduce(&mut w, Intent::Next);
        assert_eq!(w.state.step, Step::Export);
        let effects = reduce(&mut w, Intent::Back);
        assert_eq!(w.state.step, Step::Preview);
        assert_eq!(preview_tasks(&effects).len(), 1);
    }

    #[test]
    fn configure_edits_ignored_outside_configure() {
        let mut w = in_preview_with_rows();
        reduce(&mut w, Intent::SelectFormat(ExportFormat::Pdf));
        reduce(&mut w, Intent::SetFilename("other".into()));
        assert_eq!(w.state.format, ExportFormat::Csv);
        assert_eq!(w.state.filename.as_str(), "volunteer_opportunities");
    }

    #[test]
    fn select_all_and_clear_categories() {
        let mut w = opened();
        reduce(&mut w, Intent::SelectAllCategories);
        assert_eq!(w.state.selected_categories.len(), 2);
        reduce(&mut w, Intent::ToggleCategory(1));
        assert_eq!(w.state.selected_categories.iter().copied().collect::<Vec<_>>(), vec![2]);
        reduce(&mut w, Intent::ClearCategories);
        assert!(w.state.selected_categories.is_empty());
    }

    #[test]
    fn filename_is_sanitized_on_input() {
        let mut w = opened();
        reduce(&mut w, Intent::SetFilename("My File!@#".into()));
        assert_eq!(w.state.filename.as_str(), "My_File___");
    }

    #[test]
    fn confirm_builds_request_without_absent_filters() {
        let mut w = opened();
        reduce(&mut w, Intent::SelectFormat(ExportFormat::Json));
        reduce(&mut w, Intent::SetFilename("My File!@#".into()));
        reduce(&mut w, Intent::Next);
        let seq = w.preview_seq;
        apply_event(&mut w, &InternalEvent::PreviewLoaded { seq, page: page(vec![row()]) });
        reduce(&mut w, Intent::Next);

        let effects = reduce(&mut w, Intent::ConfirmExport);
        assert!(w.state.is_exporting());
        let request = effects
            .iter()
            .find_map(|e| match e {
                Effect::Async(TaskKind::Download(r)) => Some(r.clone()),
                _ => None,
            })
            .expect("download effect");
        let url = request.url(&"http://portal.test/".parse().unwrap()).unwrap();
        assert_eq!(url.as_str(), "http://portal.test/export/json/?filename=My_File___");
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Async(TaskKind::ExportDelay { ticket, .. }) if *ticket == w.export_ticket
        )));
    }

    #[test]
    fn timers_drive_success_and_reset() {
        let mut w = in_preview_with_rows();
        reduce(&mut w, Intent::SelectFormat(ExportFormat::Pdf));
        reduce(&mut w, Intent::Next);
        reduce(&mut w, Intent::ConfirmExport);
        let ticket = w.export_ticket;

        // a second confirm while exporting does nothing
        assert!(reduce(&mut w, Intent::ConfirmExport).is_empty());

        let effects = apply_event(&mut w, &InternalEvent::ExportDelayElapsed { ticket });
        assert!(w.state.export_succeeded());
        assert!(!w.state.is_exporting());
        assert!(matches!(
            effects.as_slice(),
            [Effect::Async(TaskKind::ResetDelay { ticket: t, .. })] if *t == ticket
        ));

        apply_event(&mut w, &InternalEvent::ResetDelayElapsed { ticket });
        assert_eq!(w.state, WizardState::default());
        assert!(w.active);
    }

    #[test]
    fn stale_timers_are_ignored_after_close() {
        let mut w = in_preview_with_rows();
        reduce(&mut w, Intent::Next);
        reduce(&mut w, Intent::ConfirmExport);
        let ticket = w.export_ticket;

        reduce(&mut w, Intent::Close);
        reduce(&mut w, Intent::Open);
        let effects = apply_event(&mut w, &InternalEvent::ExportDelayElapsed { ticket });
        assert!(effects.is_empty());
        assert_eq!(w.state, WizardState::default());
    }

    #[test]
    fn close_drops_catalog() {
        let mut w = opened();
        assert_eq!(w.catalog.len(), 2);
        reduce(&mut w, Intent::Close);
        assert!(w.catalog.is_empty());
        assert!(!w.active);
        apply_event(&mut w, &InternalEvent::CategoriesLoaded(vec![]));
        assert!(w.catalog.is_empty());
    }

    #[test]
    fn download_result_only_noticed() {
        let mut w = in_preview_with_rows();
        reduce(&mut w, Intent::Next);
        reduce(&mut w, Intent::ConfirmExport);
        apply_event(
            &mut w,
            &InternalEvent::DownloadFailed { error: "HTTP 500".into() },
        );
        assert!(w.state.is_exporting());
        assert_eq!(w.notice.as_deref(), Some("Download failed: HTTP 500"));

        apply_event(
            &mut w,
            &InternalEvent::DownloadFinished { path: PathBuf::from("/tmp/x.csv") },
        );
        assert_eq!(w.notice.as_deref(), Some("Saved to /tmp/x.csv"));
    }

    #[test]
    fn desk_keeps_categories_after_wizard_close() {
        let mut desk = DeskState::default();
        let cats = vec![Category { id: 9, name: "Health".into(), opportunity_count: 1 }];
        reduce_internal(&mut desk, &InternalEvent::CategoriesLoaded(cats.clone()));
        assert_eq!(desk.categories, cats);
        assert!(desk.wizard.catalog.is_empty());
    }
}
