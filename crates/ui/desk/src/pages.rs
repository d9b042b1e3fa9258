use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::{action::Action, core::state::DeskState, tui::EventResponse};

mod export;
mod form;
mod opportunities;

pub use export::ExportPage;
pub use form::FormPage;
pub use opportunities::OpportunitiesPage;

/// A `Page` composes `Component`s and owns their local UI state (cursor,
/// input buffers). Shared data lives in `DeskState`, which pages only read;
/// changes travel back to the loop as `Action`s.
pub trait Page {
    fn name(&self) -> &str;

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        let _ = tx;
        Ok(())
    }

    /// Called when the page becomes active.
    fn on_enter(&mut self, desk: &DeskState) -> Result<()> {
        let _ = desk;
        Ok(())
    }

    /// Called when the page is leaving / being replaced.
    fn on_exit(&mut self, desk: &DeskState) -> Result<()> {
        let _ = desk;
        Ok(())
    }

    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        desk: &DeskState,
    ) -> Result<Option<EventResponse<Action>>> {
        let _ = (key, desk);
        Ok(None)
    }

    /// Follow an action after the loop has folded it into `desk`.
    fn update(&mut self, action: &Action, desk: &DeskState) -> Result<Option<Action>> {
        let _ = (action, desk);
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, desk: &DeskState) -> Result<()>;
}

/// Send through an optional handler; a missing or closed channel is ignored.
pub(crate) fn send(tx: &Option<UnboundedSender<Action>>, action: Action) {
    if let Some(tx) = tx {
        let _ = tx.send(action);
    }
}
