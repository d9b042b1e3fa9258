use chrono::NaiveDate;
use color_eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use portal::{ExportFormat, Filename};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::UnboundedSender;
use tui_input::{Input, backend::crossterm::EventHandler};

use super::{Page, send};
use crate::{
    action::Action,
    core::{
        effects::InternalEvent,
        intent_model::Intent,
        state::{DeskState, ExportPhase, PageId, PreviewStatus, Step, WizardState},
    },
    tui::EventResponse,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Focus ring of the configure step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Field {
    #[default]
    Format,
    DateFrom,
    DateTo,
    Categories,
    Filename,
}

impl Field {
    const ORDER: [Field; 5] = [
        Field::Format,
        Field::DateFrom,
        Field::DateTo,
        Field::Categories,
        Field::Filename,
    ];

    fn step(self, delta: isize) -> Field {
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        let len = Self::ORDER.len() as isize;
        Self::ORDER[(idx + delta).rem_euclid(len) as usize]
    }
}

/// Empty input means "no bound". Anything unparsable counts as empty too and
/// is flagged in the UI.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Three-step export wizard: Configure → Preview → Export.
///
/// The page owns the edit buffers only. Every edit becomes an `Intent` that
/// the loop reduces into `DeskState::wizard`; the page re-reads the state
/// when drawing.
#[derive(Default)]
pub struct ExportPage {
    tx: Option<UnboundedSender<Action>>,
    focus: Field,
    date_from: Input,
    date_to: Input,
    filename: Input,
    category_cursor: usize,
}

impl ExportPage {
    pub fn new() -> Self {
        let mut page = Self::default();
        page.reset_inputs(&WizardState::default());
        page
    }

    fn reset_inputs(&mut self, state: &WizardState) {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.format(DATE_FORMAT).to_string());
        self.focus = Field::Format;
        self.date_from = Input::new(fmt(state.date_from).unwrap_or_default());
        self.date_to = Input::new(fmt(state.date_to).unwrap_or_default());
        self.filename = Input::new(state.filename.as_str().to_string());
        self.category_cursor = 0;
    }

    fn configure_key(&mut self, key: KeyEvent, desk: &DeskState) -> Option<Action> {
        let wizard = &desk.wizard;
        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.step(1);
                return Some(Action::Update);
            }
            KeyCode::BackTab => {
                self.focus = self.focus.step(-1);
                return Some(Action::Update);
            }
            KeyCode::Enter => return Some(Action::Intent(Intent::Next)),
            _ => {}
        }

        match self.focus {
            Field::Format => {
                let formats: Vec<ExportFormat> = ExportFormat::iter().collect();
                let idx = formats
                    .iter()
                    .position(|f| *f == wizard.state.format)
                    .unwrap_or(0);
                let next = match key.code {
                    KeyCode::Left => (idx + formats.len() - 1) % formats.len(),
                    KeyCode::Right | KeyCode::Char(' ') => (idx + 1) % formats.len(),
                    _ => return None,
                };
                Some(Action::Intent(Intent::SelectFormat(formats[next])))
            }
            Field::DateFrom | Field::DateTo => {
                let input = if self.focus == Field::DateFrom {
                    &mut self.date_from
                } else {
                    &mut self.date_to
                };
                // Unbehandelte Tasten (F1–F4 …) gehen an die globale Belegung
                let change = input.handle_event(&CrosstermEvent::Key(key))?;
                if !change.value {
                    return Some(Action::Update);
                }
                let date = parse_date(input.value());
                Some(Action::Intent(if self.focus == Field::DateFrom {
                    Intent::SetDateFrom(date)
                } else {
                    Intent::SetDateTo(date)
                }))
            }
            Field::Categories => {
                let total = wizard.catalog.len();
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => {
                        if total > 0 {
                            self.category_cursor = (self.category_cursor + 1).min(total - 1);
                        }
                        Some(Action::Update)
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.category_cursor = self.category_cursor.saturating_sub(1);
                        Some(Action::Update)
                    }
                    KeyCode::Char(' ') => wizard
                        .catalog
                        .get(self.category_cursor)
                        .map(|c| Action::Intent(Intent::ToggleCategory(c.id))),
                    KeyCode::Char('a') => Some(Action::Intent(Intent::SelectAllCategories)),
                    KeyCode::Char('c') => Some(Action::Intent(Intent::ClearCategories)),
                    _ => None,
                }
            }
            Field::Filename => {
                let change = self.filename.handle_event(&CrosstermEvent::Key(key))?;
                if change.value {
                    Some(Action::Intent(Intent::SetFilename(
                        self.filename.value().to_string(),
                    )))
                } else {
                    Some(Action::Update)
                }
            }
        }
    }

    fn draw_steps(&self, frame: &mut Frame<'_>, area: Rect, current: Step) {
        let mut spans = Vec::new();
        for step in Step::iter() {
            let style = if step == current {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if step.number() < current.number() {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {} {} ", step.number(), step), style));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!("Step {} of {}", current.number(), Step::count()),
            Style::default().fg(Color::Gray),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn label(&self, field: Field, text: &str) -> Span<'static> {
        let style = if self.focus == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let marker = if self.focus == field { "▶ " } else { "  " };
        Span::styled(format!("{marker}{text:<12}"), style)
    }

    fn date_line(&self, field: Field, text: &str, input: &Input) -> Line<'static> {
        let raw = input.value();
        let bad = !raw.trim().is_empty() && parse_date(raw).is_none();
        let shown = if raw.is_empty() && self.focus != field {
            "YYYY-MM-DD (any)".to_string()
        } else {
            raw.to_string()
        };
        let style = if bad {
            Style::default().fg(Color::Red)
        } else if raw.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let mut spans = vec![self.label(field, text), Span::styled(shown, style)];
        if bad {
            spans.push(Span::styled(
                "  not a date, ignored",
                Style::default().fg(Color::Red),
            ));
        }
        Line::from(spans)
    }

    fn draw_configure(&self, frame: &mut Frame<'_>, area: Rect, desk: &DeskState) {
        let state = &desk.wizard.state;
        let [top, cats, bottom] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        let mut format_spans = vec![self.label(Field::Format, "Format")];
        for format in ExportFormat::iter() {
            let style = if format == state.format {
                Style::default().fg(Color::Black).bg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            };
            format_spans.push(Span::styled(
                format!(" {} ", format.to_string().to_uppercase()),
                style,
            ));
            format_spans.push(Span::raw(" "));
        }
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(format_spans),
                self.date_line(Field::DateFrom, "From", &self.date_from),
                self.date_line(Field::DateTo, "To", &self.date_to),
            ]),
            top,
        );

        let items: Vec<ListItem> = desk
            .wizard
            .catalog
            .iter()
            .map(|c| {
                let mark = if state.selected_categories.contains(&c.id) {
                    "[x]"
                } else {
                    "[ ]"
                };
                ListItem::new(format!("{mark} {} ({})", c.name, c.opportunity_count))
            })
            .collect();
        let title = if desk.wizard.catalog.is_empty() {
            " Categories (none loaded, all data) ".to_string()
        } else {
            format!(
                " Categories {}/{} · Space toggle · a all · c clear ",
                state.selected_categories.len(),
                desk.wizard.catalog.len()
            )
        };
        let border = if self.focus == Field::Categories {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let mut list_state = ListState::default();
        if self.focus == Field::Categories && !items.is_empty() {
            list_state.select(Some(self.category_cursor));
        }
        frame.render_stateful_widget(
            List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border)
                        .title(title),
                )
                .highlight_style(Style::default().bg(Color::DarkGray)),
            cats,
            &mut list_state,
        );

        let shown = if self.filename.value().is_empty() {
            Filename::DEFAULT
        } else {
            self.filename.value()
        };
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(vec![
                    self.label(Field::Filename, "File name"),
                    Span::raw(format!("{shown}.{}", state.format.extension())),
                ]),
                Line::from(Span::styled(
                    "  Tab next field · Enter / Ctrl+N preview · Esc leave",
                    Style::default().fg(Color::DarkGray),
                )),
            ]),
            bottom,
        );
    }

    fn draw_preview(&self, frame: &mut Frame<'_>, area: Rect, desk: &DeskState) {
        let state = &desk.wizard.state;
        let [summary, body, hint] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let mut lines = vec![Line::from(Span::styled(
            state.filter_summary(&desk.wizard.catalog).join(" · "),
            Style::default().fg(Color::Cyan),
        ))];
        match &state.preview {
            PreviewStatus::Loaded => lines.push(Line::from(format!(
                "{} opportunities · {} volunteers",
                state.total_count, state.total_volunteers
            ))),
            PreviewStatus::Failed(err) => lines.push(Line::from(Span::styled(
                format!("Preview failed: {err}"),
                Style::default().fg(Color::Red),
            ))),
            _ => {}
        }
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }),
            summary,
        );

        match &state.preview {
            PreviewStatus::Loading | PreviewStatus::Idle => frame.render_widget(
                Paragraph::new("Loading preview…").style(Style::default().fg(Color::DarkGray)),
                body,
            ),
            PreviewStatus::Failed(_) => {}
            PreviewStatus::Loaded if state.preview_rows.is_empty() => frame.render_widget(
                Paragraph::new("No opportunities match these filters.")
                    .style(Style::default().fg(Color::Yellow)),
                body,
            ),
            PreviewStatus::Loaded => {
                let rows = state.preview_rows.iter().map(|r| {
                    Row::new(vec![
                        r.title.clone(),
                        r.category.clone(),
                        r.date.to_string(),
                        r.volunteer_count.to_string(),
                    ])
                });
                let table = Table::new(
                    rows,
                    [
                        Constraint::Fill(3),
                        Constraint::Fill(2),
                        Constraint::Length(10),
                        Constraint::Length(10),
                    ],
                )
                .header(
                    Row::new(vec!["Title", "Category", "Date", "Volunteers"])
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                )
                .block(Block::default().borders(Borders::TOP));
                frame.render_widget(table, body);
            }
        }

        let next = if state.can_proceed_to_export() {
            Span::raw("Enter continue")
        } else {
            Span::styled("Enter continue (nothing to export)", Style::default().fg(Color::DarkGray))
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                next,
                Span::styled(" · Ctrl+B back", Style::default().fg(Color::DarkGray)),
            ])),
            hint,
        );
    }

    fn draw_export(&self, frame: &mut Frame<'_>, area: Rect, desk: &DeskState) {
        let state = &desk.wizard.state;
        let request = state.export_request();
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Format     ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!(
                    "{} ({})",
                    state.format.to_string().to_uppercase(),
                    state.format.blurb()
                )),
            ]),
            Line::from(vec![
                Span::styled("File       ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(request.file_name()),
            ]),
            Line::from(vec![
                Span::styled("Rows       ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(state.total_count.to_string()),
            ]),
            Line::raw(""),
        ];
        lines.push(match state.phase {
            ExportPhase::Idle => Line::from(Span::styled(
                "[ Enter Export ]   Ctrl+B back",
                Style::default().fg(Color::Green),
            )),
            ExportPhase::Exporting => Line::from(Span::styled(
                "⟳ Exporting…",
                Style::default().fg(Color::Yellow),
            )),
            ExportPhase::Succeeded => Line::from(Span::styled(
                "✓ Export complete",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
        });
        if let Some(notice) = &desk.wizard.notice {
            lines.push(Line::from(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
    }
}

impl Page for ExportPage {
    fn name(&self) -> &str {
        "export"
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.tx = Some(tx);
        Ok(())
    }

    fn on_enter(&mut self, _desk: &DeskState) -> Result<()> {
        self.reset_inputs(&WizardState::default());
        send(&self.tx, Action::Intent(Intent::Open));
        Ok(())
    }

    fn on_exit(&mut self, _desk: &DeskState) -> Result<()> {
        send(&self.tx, Action::Intent(Intent::Close));
        Ok(())
    }

    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        desk: &DeskState,
    ) -> Result<Option<EventResponse<Action>>> {
        if !desk.wizard.active {
            return Ok(None);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(match key.code {
                KeyCode::Char('n') => Some(EventResponse::Stop(Action::Intent(Intent::Next))),
                KeyCode::Char('b') => Some(EventResponse::Stop(Action::Intent(Intent::Back))),
                _ => None,
            });
        }
        if key.code == KeyCode::Esc {
            return Ok(Some(EventResponse::Stop(Action::Navigate(
                PageId::Opportunities,
            ))));
        }

        let action = match desk.wizard.state.step {
            Step::Configure => self.configure_key(key, desk),
            Step::Preview => match key.code {
                KeyCode::Enter => Some(Action::Intent(Intent::Next)),
                _ => None,
            },
            Step::Export => match key.code {
                KeyCode::Enter => Some(Action::Intent(Intent::ConfirmExport)),
                _ => None,
            },
        };
        Ok(action.map(EventResponse::Stop))
    }

    fn update(&mut self, action: &Action, desk: &DeskState) -> Result<Option<Action>> {
        match action {
            Action::Intent(Intent::SetFilename(_)) => {
                // Eingabe auf den bereinigten Wert zurücksetzen
                let sanitized = desk.wizard.state.filename.as_str();
                if self.filename.value() != sanitized {
                    self.filename = Input::new(sanitized.to_string());
                }
            }
            Action::Internal(InternalEvent::ResetDelayElapsed { .. })
                if desk.wizard.state.step == Step::Configure =>
            {
                self.reset_inputs(&desk.wizard.state);
            }
            Action::Internal(InternalEvent::CategoriesLoaded(list)) => {
                self.category_cursor = self.category_cursor.min(list.len().saturating_sub(1));
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, desk: &DeskState) -> Result<()> {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Export Volunteer Data ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [steps, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
        let step = desk.wizard.state.step;
        self.draw_steps(frame, steps, step);
        match step {
            Step::Configure => self.draw_configure(frame, body, desk),
            Step::Preview => self.draw_preview(frame, body, desk),
            Step::Export => self.draw_export(frame, body, desk),
        }
        Ok(())
    }
}
