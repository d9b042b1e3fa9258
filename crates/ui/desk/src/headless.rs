//! Terminal-free commands: `desk export` and `desk health`.
//!
//! The export drives the same reducer and executor as the wizard page, so
//! the rules (non-empty preview, sanitized filename, stale-result filtering)
//! are identical.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use color_eyre::{
    Result,
    eyre::{WrapErr, bail, eyre},
};
use portal::PortalApi;
use tokio::sync::mpsc;
use tracing::info;

use crate::{
    action::Action,
    cli::ExportArgs,
    core::{
        effects::InternalEvent,
        executor::TaskExecutor,
        intent_model::Intent,
        reducer::{apply_event, reduce},
        state::{ExportTiming, ExportWizard, PreviewStatus, Step},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub total_count: u64,
    pub total_volunteers: u64,
}

/// Configure, preview and confirm an export without a terminal.
///
/// Fails when the preview fails, when it is empty or when the download fails.
pub async fn export(
    api: Arc<dyn PortalApi>,
    download_dir: PathBuf,
    timing: ExportTiming,
    args: &ExportArgs,
) -> Result<ExportReport> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
    let executor = TaskExecutor::new(api, download_dir, tx);
    let mut wizard = ExportWizard::new(timing);

    let mut intents = vec![
        Intent::Open,
        Intent::SelectFormat(args.format),
        Intent::SetDateFrom(args.date_from),
        Intent::SetDateTo(args.date_to),
    ];
    // ToggleCategory ist ein Umschalter: doppelte `--category` nur einmal anwenden
    let categories: BTreeSet<_> = args.categories.iter().copied().collect();
    intents.extend(categories.into_iter().map(Intent::ToggleCategory));
    if let Some(name) = &args.filename {
        intents.push(Intent::SetFilename(name.clone()));
    }
    intents.push(Intent::Next);
    for intent in intents {
        executor.run(reduce(&mut wizard, intent));
    }

    let mut saved: Option<PathBuf> = None;
    let mut totals: Option<(u64, u64)> = None;
    let mut succeeded = false;
    loop {
        let Some(action) = rx.recv().await else {
            bail!("task executor stopped before the export finished");
        };
        let Action::Internal(event) = action else {
            continue;
        };
        executor.run(apply_event(&mut wizard, &event));

        match &event {
            InternalEvent::DownloadFinished { path } => saved = Some(path.clone()),
            InternalEvent::DownloadFailed { error } => bail!("download failed: {error}"),
            _ => {}
        }

        if totals.is_none() && wizard.state.step == Step::Preview {
            match &wizard.state.preview {
                PreviewStatus::Failed(error) => bail!("preview failed: {error}"),
                PreviewStatus::Loaded if wizard.state.preview_rows.is_empty() => {
                    bail!("nothing to export: no opportunities match the filters")
                }
                PreviewStatus::Loaded => {
                    info!(
                        rows = wizard.state.total_count,
                        volunteers = wizard.state.total_volunteers,
                        "preview loaded, confirming export"
                    );
                    executor.run(reduce(&mut wizard, Intent::Next));
                    executor.run(reduce(&mut wizard, Intent::ConfirmExport));
                    if !wizard.state.is_exporting() {
                        return Err(eyre!("export could not be started"));
                    }
                    totals = Some((wizard.state.total_count, wizard.state.total_volunteers));
                }
                _ => {}
            }
        }

        succeeded |= totals.is_some() && wizard.state.export_succeeded();
        if let (true, Some((total_count, total_volunteers))) = (succeeded, totals) {
            if let Some(path) = saved.take() {
                return Ok(ExportReport {
                    path,
                    total_count,
                    total_volunteers,
                });
            }
        }
    }
}

/// One-line portal summary; any failure is an error.
pub async fn health(api: &dyn PortalApi) -> Result<String> {
    let stats = api
        .dashboard_stats()
        .await
        .wrap_err("portal health check failed")?;
    Ok(format!(
        "ok: {} opportunities ({} upcoming), {} volunteers, {} categories",
        stats.total_opportunities,
        stats.upcoming_opportunities,
        stats.total_volunteers,
        stats.categories.len()
    ))
}
