use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use portal::{FormReceipt, OpportunityId};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::{Page, send};
use crate::{
    action::Action,
    components::{Component, FormView},
    core::{
        effects::{FormKind, InternalEvent, TaskKind},
        state::DeskState,
    },
    domain::forms::{FieldValidator, FormSchema, catalog},
    tui::EventResponse,
};

const REJECTED: &str = "The portal rejected the submission. Check the fields and try again.";

/// Page around one of the two portal forms.
///
/// `Ctrl+S` submits. Select options are rebuilt whenever the backing list
/// (opportunities or categories) is reloaded; entered values survive.
pub struct FormPage {
    kind: FormKind,
    tx: Option<UnboundedSender<Action>>,
    view: FormView,
}

impl FormPage {
    pub fn signup(validator: FieldValidator) -> Self {
        Self::new(FormKind::Signup, validator)
    }

    pub fn opportunity(validator: FieldValidator) -> Self {
        Self::new(FormKind::Opportunity, validator)
    }

    fn new(kind: FormKind, validator: FieldValidator) -> Self {
        let desk = DeskState::default();
        Self {
            kind,
            tx: None,
            view: FormView::new(Self::schema_for(kind, &desk), validator),
        }
    }

    pub fn view(&self) -> &FormView {
        &self.view
    }

    fn schema_for(kind: FormKind, desk: &DeskState) -> FormSchema {
        match kind {
            FormKind::Signup => catalog::signup_form(&desk.opportunities),
            FormKind::Opportunity => catalog::opportunity_form(&desk.categories),
        }
    }

    fn rebuild(&mut self, desk: &DeskState) {
        self.view.set_schema(Self::schema_for(self.kind, desk));
    }

    fn preselect(&mut self, id: OpportunityId) {
        if self.kind == FormKind::Signup {
            self.view.set_value("opportunity", &id.to_string());
        }
    }

    fn on_receipt(&mut self, receipt: &FormReceipt) -> Option<Action> {
        match receipt {
            FormReceipt::Accepted { location } => {
                debug!("{} form accepted, redirect to {location:?}", self.kind);
                self.view.finish(None);
                self.view.reset();
                send(&self.tx, Action::Schedule(TaskKind::FetchOpportunities));
                send(&self.tx, Action::Schedule(TaskKind::FetchDashboard));
                Some(Action::Notice(match self.kind {
                    FormKind::Signup => "Thanks for signing up!".to_string(),
                    FormKind::Opportunity => "Opportunity created.".to_string(),
                }))
            }
            FormReceipt::Rejected => {
                self.view.finish(Some(REJECTED.to_string()));
                Some(Action::Error(REJECTED.to_string()))
            }
        }
    }

    fn draw_preview(&self, frame: &mut Frame<'_>, area: Rect, desk: &DeskState) {
        let selected = self.view.selected_option("opportunity");
        let lines = match catalog::preview_title(selected) {
            None => vec![Line::from(Span::styled(
                "Select an opportunity to see its details.",
                Style::default().fg(Color::DarkGray),
            ))],
            Some(title) => {
                let mut lines = vec![Line::from(Span::styled(
                    title.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ))];
                let details = selected
                    .and_then(|o| o.value.parse::<OpportunityId>().ok())
                    .and_then(|id| desk.opportunities.iter().find(|o| o.id == id));
                if let Some(opp) = details {
                    lines.push(Line::from(Span::styled(
                        format!("{} · {}", opp.date, opp.category.name),
                        Style::default().fg(Color::Cyan),
                    )));
                    lines.push(Line::raw(""));
                    lines.push(Line::raw(opp.description.clone()));
                    lines.push(Line::raw(""));
                    lines.push(Line::from(Span::styled(
                        format!("{} volunteers signed up", opp.volunteer_count),
                        Style::default().fg(Color::Gray),
                    )));
                }
                lines
            }
        };
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Opportunity ")),
            area,
        );
    }
}

impl Page for FormPage {
    fn name(&self) -> &str {
        match self.kind {
            FormKind::Signup => "signup",
            FormKind::Opportunity => "new_opportunity",
        }
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.tx = Some(tx);
        Ok(())
    }

    fn on_enter(&mut self, desk: &DeskState) -> Result<()> {
        self.rebuild(desk);
        match self.kind {
            FormKind::Signup if !desk.opportunities_loaded => {
                send(&self.tx, Action::Schedule(TaskKind::FetchOpportunities));
            }
            FormKind::Opportunity if desk.categories.is_empty() => {
                send(&self.tx, Action::Schedule(TaskKind::FetchCategories));
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_key_events(
        &mut self,
        key: KeyEvent,
        _desk: &DeskState,
    ) -> Result<Option<EventResponse<Action>>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            let action = match self.view.submit() {
                Some(fields) => Action::Schedule(TaskKind::SubmitForm {
                    form: self.kind,
                    path: self.view.schema().submit_path.clone(),
                    fields,
                }),
                None => Action::Update,
            };
            return Ok(Some(EventResponse::Stop(action)));
        }
        self.view.handle_key_events(key)
    }

    fn update(&mut self, action: &Action, desk: &DeskState) -> Result<Option<Action>> {
        match action {
            Action::SignupFor(id) => {
                self.rebuild(desk);
                self.preselect(*id);
            }
            Action::Internal(InternalEvent::OpportunitiesLoaded(_))
                if self.kind == FormKind::Signup =>
            {
                self.rebuild(desk);
            }
            Action::Internal(InternalEvent::CategoriesLoaded(_))
                if self.kind == FormKind::Opportunity =>
            {
                self.rebuild(desk);
            }
            Action::Internal(InternalEvent::FormSubmitted { form, receipt }) if *form == self.kind => {
                return Ok(self.on_receipt(receipt));
            }
            Action::Internal(InternalEvent::FormFailed { form, error }) if *form == self.kind => {
                let msg = format!("Could not reach the portal: {error}");
                self.view.finish(Some(msg.clone()));
                return Ok(Some(Action::Error(msg)));
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect, desk: &DeskState) -> Result<()> {
        if self.kind == FormKind::Signup {
            let [form, preview] =
                Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).areas(area);
            self.view.draw(frame, form)?;
            self.draw_preview(frame, preview, desk);
        } else {
            self.view.draw(frame, area)?;
        }
        Ok(())
    }
}
