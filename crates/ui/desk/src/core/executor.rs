/*!
Task executor.

Decouples the reducers' declarative `Effect::Async(TaskKind)` outputs from the
runtime side: HTTP calls against the portal, downloads and timers.

- Scheduling requests go through an unbounded channel to a single worker.
- The worker spawns every task as its own tokio task, so a slow request
  never holds back a timer (and vice versa).
- Results are sent back as `Action::Internal(InternalEvent)`.
- Nothing is cancelled; late results are filtered by the reducers.
*/

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use portal::PortalApi;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::action::Action;
use crate::core::effects::{Effect, InternalEvent, TaskKind};

/// Monotonic task identifier type.
pub type TaskId = u64;

/// Handle for scheduling background tasks. Cheap to clone.
#[derive(Clone)]
pub struct TaskExecutor {
    tx: mpsc::UnboundedSender<Dispatch>,
}

struct Dispatch {
    id: TaskId,
    kind: TaskKind,
}

impl TaskExecutor {
    /// Create a new executor and spawn its worker loop. Must be called inside a tokio runtime.
    pub fn new(
        api: Arc<dyn PortalApi>,
        download_dir: PathBuf,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Dispatch>();
        Worker {
            rx,
            ctx: Arc::new(TaskContext {
                api,
                download_dir,
                action_tx,
            }),
        }
        .spawn();
        Self { tx }
    }

    /// Schedule a new asynchronous task and return its id.
    pub fn spawn(&self, kind: TaskKind) -> TaskId {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.tx.send(Dispatch { id, kind }) {
            warn!("TaskExecutor channel closed; failed to schedule task: {e}");
        }
        id
    }

    /// Interpret reducer output.
    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Log(msg) => info!("[effect] {msg}"),
                Effect::Async(task) => {
                    debug!("[effect] schedule async task: {task}");
                    self.spawn(task);
                }
            }
        }
    }
}

struct TaskContext {
    api: Arc<dyn PortalApi>,
    download_dir: PathBuf,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl TaskContext {
    fn emit(&self, event: InternalEvent) {
        // receiver gone = loop is shutting down
        let _ = self.action_tx.send(Action::Internal(event));
    }

    async fn handle(&self, id: TaskId, kind: TaskKind) {
        debug!("[task:{id}] started {kind}");
        let event = match kind {
            TaskKind::FetchCategories => match self.api.categories().await {
                Ok(list) => InternalEvent::CategoriesLoaded(list),
                Err(e) => {
                    warn!("[task:{id}] loading categories failed: {e}");
                    InternalEvent::CategoriesFailed(e.to_string())
                }
            },
            TaskKind::FetchPreview { seq, filters } => {
                match self.api.export_preview(&filters).await {
                    Ok(page) => InternalEvent::PreviewLoaded { seq, page },
                    Err(e) => {
                        warn!("[task:{id}] preview seq={seq} failed: {e}");
                        InternalEvent::PreviewFailed {
                            seq,
                            error: e.to_string(),
                        }
                    }
                }
            }
            TaskKind::Download(request) => {
                match self.api.download_export(&request, &self.download_dir).await {
                    Ok(path) => {
                        info!("[task:{id}] export saved at {}", path.display());
                        InternalEvent::DownloadFinished { path }
                    }
                    Err(e) => {
                        warn!("[task:{id}] export download failed: {e}");
                        InternalEvent::DownloadFailed {
                            error: e.to_string(),
                        }
                    }
                }
            }
            TaskKind::ExportDelay { ticket, delay } => {
                tokio::time::sleep(delay).await;
                InternalEvent::ExportDelayElapsed { ticket }
            }
            TaskKind::ResetDelay { ticket, delay } => {
                tokio::time::sleep(delay).await;
                InternalEvent::ResetDelayElapsed { ticket }
            }
            TaskKind::FetchOpportunities => match self.api.opportunities().await {
                Ok(list) => InternalEvent::OpportunitiesLoaded(list),
                Err(e) => {
                    warn!("[task:{id}] loading opportunities failed: {e}");
                    InternalEvent::OpportunitiesFailed(e.to_string())
                }
            },
            TaskKind::FetchDashboard => match self.api.dashboard_stats().await {
                Ok(stats) => InternalEvent::DashboardLoaded(stats),
                Err(e) => {
                    warn!("[task:{id}] loading dashboard stats failed: {e}");
                    InternalEvent::DashboardFailed(e.to_string())
                }
            },
            TaskKind::SubmitForm { form, path, fields } => {
                match self.api.submit_form(&path, &fields).await {
                    Ok(receipt) => {
                        info!("[task:{id}] {form} form answered: {receipt:?}");
                        InternalEvent::FormSubmitted { form, receipt }
                    }
                    Err(e) => {
                        warn!("[task:{id}] posting {form} form failed: {e}");
                        InternalEvent::FormFailed {
                            form,
                            error: e.to_string(),
                        }
                    }
                }
            }
        };
        self.emit(event);
    }
}

struct Worker {
    rx: mpsc::UnboundedReceiver<Dispatch>,
    ctx: Arc<TaskContext>,
}

impl Worker {
    fn spawn(mut self) {
        tokio::spawn(async move {
            while let Some(Dispatch { id, kind }) = self.rx.recv().await {
                let ctx = Arc::clone(&self.ctx);
                tokio::spawn(async move { ctx.handle(id, kind).await });
            }
            info!("TaskExecutor worker stopped (channel closed)");
        });
    }
}
