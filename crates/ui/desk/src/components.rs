use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::{action::Action, tui::EventResponse};

pub mod form_view;
pub mod status_bar;

pub use form_view::FormView;
pub use status_bar::StatusBar;

/// `Component` is a visual and interactive element owned by a page (or by the
/// app itself). It receives key events, follows actions and draws itself.
pub trait Component {
    fn name(&self) -> &str;

    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        let _ = key;
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()>;
}
