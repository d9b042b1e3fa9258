use color_eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use portal::{DashboardStats, Opportunity};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tokio::sync::mpsc::UnboundedSender;
use tui_input::{Input, backend::crossterm::EventHandler};

use super::{Page, send};
use crate::{
    action::Action,
    core::{effects::TaskKind, state::DeskState},
    domain::listing::ListFilter,
    tui::EventResponse,
};

/// Opportunity cards with a search box and the dashboard summary on top.
///
/// `/` focuses the search, `Esc`/`Enter` leave it. `Enter` on a card opens
/// the signup form for it, `r` reloads from the portal.
#[derive(Default)]
pub struct OpportunitiesPage {
    tx: Option<UnboundedSender<Action>>,
    search: Input,
    filter: ListFilter,
    searching: bool,
    selected: usize,
}

impl OpportunitiesPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh(&self) {
        send(&self.tx, Action::Schedule(TaskKind::FetchOpportunities));
        send(&self.tx, Action::Schedule(TaskKind::FetchDashboard));
    }

    fn visible<'a>(&'a self, desk: &'a DeskState) -> Vec<&'a Opportunity> {
        self.filter.visible(&desk.opportunities).collect()
    }

    fn stats_line(stats: Option<&DashboardStats>) -> Line<'static> {
        match stats {
            Some(s) => Line::from(vec![
                Span::styled(
                    format!(" {} ", s.total_opportunities),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("opportunities  "),
                Span::styled(
                    format!(" {} ", s.upcoming_opportunities),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("upcoming  "),
                Span::styled(
                    format!(" {} ", s.total_volunteers),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("volunteers"),
            ]),
            None => Line::from(Span::styled(
                " loading dashboard…",
                Style::default().fg(Color::DarkGray),
            )),
        }
    }
}

impl Page for OpportunitiesPage {
    fn name(&self) -> &str {
        "opportunities"
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.tx = Some(tx);
        Ok(())
    }

    fn on_enter(&mut self, desk: &DeskState) -> Result<()> {
        if !desk.opportunities_loaded {
            self.refresh();
        }
        Ok(())
    }

    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        desk: &DeskState,
    ) -> Result<Option<EventResponse<Action>>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(None);
        }

        if self.searching {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.searching = false,
                _ => {
                    if self
                        .search
                        .handle_event(&CrosstermEvent::Key(key))
                        .is_some_and(|c| c.value)
                    {
                        self.filter.set_term(self.search.value());
                        self.selected = 0;
                    }
                }
            }
            return Ok(Some(EventResponse::Stop(Action::Update)));
        }

        let count = self.visible(desk).len();
        match key.code {
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                self.selected = (self.selected + 1).min(count - 1);
            }
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Enter => {
                if let Some(opp) = self.visible(desk).get(self.selected) {
                    return Ok(Some(EventResponse::Stop(Action::SignupFor(opp.id))));
                }
                return Ok(None);
            }
            _ => return Ok(None),
        }
        Ok(Some(EventResponse::Stop(Action::Update)))
    }

    fn update(&mut self, action: &Action, desk: &DeskState) -> Result<Option<Action>> {
        if let Action::Internal(_) = action {
            let count = self.visible(desk).len();
            self.selected = self.selected.min(count.saturating_sub(1));
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, desk: &DeskState) -> Result<()> {
        let [header, search, list] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Self::stats_line(desk.stats.as_ref()))
                .block(Block::default().borders(Borders::ALL).title(" Volunteer Hub ")),
            header,
        );

        let search_style = if self.searching {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let search_text = if self.searching || !self.search.value().is_empty() {
            self.search.value().to_string()
        } else {
            "press / to search".to_string()
        };
        frame.render_widget(
            Paragraph::new(search_text)
                .style(search_style)
                .block(Block::default().borders(Borders::ALL).title(" Search ")),
            search,
        );

        let visible = self.visible(desk);
        let items: Vec<ListItem> = visible
            .iter()
            .map(|opp| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            opp.title.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!("  [{}]", opp.category.name),
                            Style::default().fg(Color::Cyan),
                        ),
                    ]),
                    Line::from(Span::styled(
                        format!("  {} · {} volunteers", opp.date, opp.volunteer_count),
                        Style::default().fg(Color::Gray),
                    )),
                    Line::from(Span::raw(format!("  {}", opp.description))),
                ])
            })
            .collect();

        let title = if !desk.opportunities_loaded {
            " Opportunities (loading…) ".to_string()
        } else {
            format!(
                " Opportunities ({}/{}) · Enter sign up · r reload ",
                visible.len(),
                desk.opportunities.len()
            )
        };
        let mut state = ListState::default();
        if !visible.is_empty() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(
            List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(Style::default().bg(Color::DarkGray)),
            list,
            &mut state,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use portal::model::CategoryRef;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    fn opp(id: u64, title: &str, description: &str) -> Opportunity {
        Opportunity {
            id,
            title: title.into(),
            description: description.into(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            category: CategoryRef {
                id: 1,
                name: "Environment".into(),
                slug: "environment".into(),
            },
            volunteer_count: 0,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn desk() -> DeskState {
        let mut desk = DeskState::default();
        desk.opportunities = vec![
            opp(1, "Beach Cleanup", "Collect litter"),
            opp(2, "Food Bank", "Sort donations"),
            opp(3, "Park day", "Help clean the shore"),
        ];
        desk.opportunities_loaded = true;
        desk
    }

    #[test]
    fn enter_fetches_only_when_not_loaded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut page = OpportunitiesPage::new();
        page.register_action_handler(tx).unwrap();

        page.on_enter(&DeskState::default()).unwrap();
        assert!(matches!(
            rx.try_recv(),
            Ok(Action::Schedule(TaskKind::FetchOpportunities))
        ));
        assert!(matches!(
            rx.try_recv(),
            Ok(Action::Schedule(TaskKind::FetchDashboard))
        ));

        page.on_enter(&desk()).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn search_narrows_and_enter_signs_up() {
        let desk = desk();
        let mut page = OpportunitiesPage::new();
        page.handle_key_events(key(KeyCode::Char('/')), &desk).unwrap();
        for c in "CLEAN".chars() {
            page.handle_key_events(key(KeyCode::Char(c)), &desk).unwrap();
        }
        page.handle_key_events(key(KeyCode::Enter), &desk).unwrap();

        let titles: Vec<&str> = page.visible(&desk).iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, ["Beach Cleanup", "Park day"]);

        page.handle_key_events(key(KeyCode::Down), &desk).unwrap();
        let resp = page.handle_key_events(key(KeyCode::Enter), &desk).unwrap();
        assert!(matches!(
            resp,
            Some(EventResponse::Stop(Action::SignupFor(3)))
        ));
    }
}
