/*!
Effect & task model.

- Reducers stay pure: they only return `Vec<Effect>`
- `TaskExecutor` interprets `Effect::Async(TaskKind)` and spawns the work
- Task results re-enter the loop as `Action::Internal(InternalEvent)`

`TaskKind` carries all input a task needs; the executor never reads UI state.
*/

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use portal::{
    Category, DashboardStats, ExportFilters, ExportRequest, FormReceipt, Opportunity, PreviewPage,
};
use strum::Display;

/// Declarative instruction emitted by a reducer.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Schedule an asynchronous task.
    Async(TaskKind),
    /// Log a message (info level).
    Log(String),
}

impl Effect {
    pub fn log<T: Into<String>>(msg: T) -> Self {
        Effect::Log(msg.into())
    }
    pub fn async_task(kind: TaskKind) -> Self {
        Effect::Async(kind)
    }
}

/// The two server-rendered forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FormKind {
    #[strum(to_string = "signup")]
    Signup,
    #[strum(to_string = "new opportunity")]
    Opportunity,
}

#[derive(Debug, Clone)]
pub enum TaskKind {
    FetchCategories,
    /// `seq` comes back with the result; only the latest one is applied.
    FetchPreview { seq: u64, filters: ExportFilters },
    Download(ExportRequest),
    /// Fires `ExportDelayElapsed { ticket }` after `delay`.
    ExportDelay { ticket: u64, delay: Duration },
    /// Fires `ResetDelayElapsed { ticket }` after `delay`.
    ResetDelay { ticket: u64, delay: Duration },
    FetchOpportunities,
    FetchDashboard,
    SubmitForm {
        form: FormKind,
        path: String,
        fields: Vec<(String, String)>,
    },
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::FetchCategories => write!(f, "FetchCategories"),
            TaskKind::FetchPreview { seq, .. } => write!(f, "FetchPreview(seq={seq})"),
            TaskKind::Download(req) => write!(f, "Download({})", req.file_name()),
            TaskKind::ExportDelay { ticket, delay } => {
                write!(f, "ExportDelay(ticket={ticket}, {}ms)", delay.as_millis())
            }
            TaskKind::ResetDelay { ticket, delay } => {
                write!(f, "ResetDelay(ticket={ticket}, {}ms)", delay.as_millis())
            }
            TaskKind::FetchOpportunities => write!(f, "FetchOpportunities"),
            TaskKind::FetchDashboard => write!(f, "FetchDashboard"),
            TaskKind::SubmitForm { form, path, .. } => write!(f, "SubmitForm({form} -> {path})"),
        }
    }
}

/// Results produced by the TaskExecutor.
#[derive(Debug, Clone)]
pub enum InternalEvent {
    CategoriesLoaded(Vec<Category>),
    CategoriesFailed(String),
    PreviewLoaded { seq: u64, page: PreviewPage },
    PreviewFailed { seq: u64, error: String },
    ExportDelayElapsed { ticket: u64 },
    ResetDelayElapsed { ticket: u64 },
    DownloadFinished { path: PathBuf },
    DownloadFailed { error: String },
    OpportunitiesLoaded(Vec<Opportunity>),
    OpportunitiesFailed(String),
    DashboardLoaded(DashboardStats),
    DashboardFailed(String),
    FormSubmitted { form: FormKind, receipt: FormReceipt },
    FormFailed { form: FormKind, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_log_effect() {
        match Effect::log("hello") {
            Effect::Log(s) => assert_eq!(s, "hello"),
            _ => panic!("expected Log variant"),
        }
    }

    #[test]
    fn task_labels_carry_correlation_ids() {
        let label = TaskKind::FetchPreview {
            seq: 7,
            filters: ExportFilters::default(),
        }
        .to_string();
        assert_eq!(label, "FetchPreview(seq=7)");

        let label = TaskKind::ExportDelay {
            ticket: 2,
            delay: Duration::from_millis(1000),
        }
        .to_string();
        assert_eq!(label, "ExportDelay(ticket=2, 1000ms)");
    }
}
