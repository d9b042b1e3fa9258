use std::time::{Duration, Instant};

use color_eyre::Result;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use strum::IntoEnumIterator;

use crate::{action::Action, components::Component, core::state::PageId};

const NOTICE_TTL: Duration = Duration::from_secs(6);

/// Bottom bar: page tabs (F1..F4) on the left, the latest notice on the right.
///
/// Follows `Action::Navigate` for the active tab and `Action::Notice` /
/// `Action::Error` for messages. Notices expire on `Tick`.
pub struct StatusBar {
    active: PageId,
    notice: Option<(String, Instant, bool)>,
}

impl StatusBar {
    pub fn new(active: PageId) -> Self {
        Self {
            active,
            notice: None,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(msg, _, _)| msg.as_str())
    }

    fn tabs(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, page) in PageId::iter().enumerate() {
            let label = format!(" F{} {} ", i + 1, page);
            let style = if page == self.active {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(label, style));
        }
        spans.push(Span::styled(
            "  Ctrl+Q quit",
            Style::default().fg(Color::DarkGray),
        ));
        Line::from(spans)
    }
}

impl Component for StatusBar {
    fn name(&self) -> &str {
        "status_bar"
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Navigate(page) => self.active = *page,
            Action::Notice(msg) => self.notice = Some((msg.clone(), Instant::now(), false)),
            Action::Error(msg) => self.notice = Some((msg.clone(), Instant::now(), true)),
            Action::Tick => {
                if self
                    .notice
                    .as_ref()
                    .is_some_and(|(_, at, _)| at.elapsed() > NOTICE_TTL)
                {
                    self.notice = None;
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [left, right] =
            Layout::horizontal([Constraint::Min(40), Constraint::Fill(1)]).areas(area);
        f.render_widget(Paragraph::new(self.tabs()), left);

        if let Some((msg, _, is_error)) = &self.notice {
            let color = if *is_error { Color::Red } else { Color::Green };
            f.render_widget(
                Paragraph::new(Line::from(Span::styled(msg.clone(), Style::default().fg(color))))
                    .right_aligned(),
                right,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_navigation_and_notices() {
        let mut bar = StatusBar::new(PageId::Opportunities);
        bar.update(&Action::Navigate(PageId::Export)).unwrap();
        assert_eq!(bar.active, PageId::Export);

        bar.update(&Action::Notice("Saved".into())).unwrap();
        assert_eq!(bar.notice(), Some("Saved"));
        bar.update(&Action::Tick).unwrap();
        assert_eq!(bar.notice(), Some("Saved"));
    }
}
