use strum::Display;

use crate::core::effects::{InternalEvent, TaskKind};
use crate::core::intent_model::Intent;
use crate::core::state::PageId;
use portal::OpportunityId;

#[derive(Debug, Clone, Display)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Error(String),
    /// Redraw after a local state change.
    Update,
    Navigate(PageId),
    /// Jump to the signup form with this opportunity preselected.
    SignupFor(OpportunityId),
    /// Export wizard intent, reduced by the loop.
    Intent(Intent),
    /// Work for the executor that is not owned by the wizard (lists, forms).
    Schedule(TaskKind),
    /// Executor result.
    Internal(InternalEvent),
    /// Short message for the status bar.
    Notice(String),
}
