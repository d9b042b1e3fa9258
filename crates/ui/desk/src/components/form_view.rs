use color_eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    action::Action,
    components::Component,
    domain::forms::{
        FieldValidator, FormField, FormFieldKind, FormSchema, FormState, SelectOption,
        SubmitDecision, Validity,
    },
    tui::EventResponse,
};

/// Interactive multi-field form.
///
/// Responsibilities:
/// - Focus management (Tab / arrows); leaving a field counts as blur
/// - Editing: the focused text field receives typed keys directly,
///   selects cycle with Left / Right
/// - Dispatching blur / input / submit to the `FieldValidator`
///
/// Ctrl- and function-key combinations are left to the owning page.
pub struct FormView {
    schema: FormSchema,
    state: FormState,
    validator: FieldValidator,
    focused: usize,
    input: Input,
}

impl FormView {
    pub fn new(schema: FormSchema, validator: FieldValidator) -> Self {
        let mut view = Self {
            schema,
            state: FormState::default(),
            validator,
            focused: 0,
            input: Input::default(),
        };
        view.sync_input();
        view
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn focused_key(&self) -> Option<&str> {
        self.current_field().map(|f| f.key.as_str())
    }

    /// Swap the schema (e.g. fresh select options) and keep entered values.
    pub fn set_schema(&mut self, schema: FormSchema) {
        self.schema = schema;
        self.focused = self.focused.min(self.schema.field_count().saturating_sub(1));
        self.sync_input();
    }

    pub fn set_value(&mut self, key: &str, value: &str) {
        self.validator.on_input(&mut self.state, key, value);
        self.sync_input();
    }

    /// Option currently chosen in a select field.
    pub fn selected_option(&self, key: &str) -> Option<&SelectOption> {
        let field = self.schema.field_by_key(key)?;
        let value = self.state.get_value(key).unwrap_or("");
        field.options().iter().find(|o| o.value == value)
    }

    /// Run the submit checks. Returns the fields to post when allowed.
    pub fn submit(&mut self) -> Option<Vec<(String, String)>> {
        match self.validator.submit(&self.schema, &mut self.state) {
            SubmitDecision::Proceed => Some(
                self.state
                    .ordered_values(self.schema.fields.iter().map(|f| f.key.as_str())),
            ),
            SubmitDecision::Blocked(outcome) => {
                if let Some(idx) = outcome
                    .first_invalid
                    .as_deref()
                    .and_then(|k| self.schema.position(k))
                {
                    self.focused = idx;
                    self.sync_input();
                }
                None
            }
            SubmitDecision::Ignored => None,
        }
    }

    /// Server answered. `rejection` is shown above the submit control.
    pub fn finish(&mut self, rejection: Option<String>) {
        self.validator.finish(&mut self.state, rejection);
    }

    /// Empty the form after an accepted submission.
    pub fn reset(&mut self) {
        self.state = FormState::default();
        self.focused = 0;
        self.sync_input();
    }

    fn current_field(&self) -> Option<&FormField> {
        self.schema.fields.get(self.focused)
    }

    fn sync_input(&mut self) {
        let value = self
            .current_field()
            .map(|f| self.state.get_value(&f.key).unwrap_or("").to_string())
            .unwrap_or_default();
        self.input = Input::new(value);
    }

    fn focus_to(&mut self, idx: usize) {
        if let Some(key) = self.focused_key().map(str::to_string) {
            self.validator.on_blur(&mut self.state, &key);
        }
        self.focused = idx;
        self.sync_input();
    }

    fn focus_next(&mut self) {
        let total = self.schema.field_count();
        if total == 0 {
            return;
        }
        self.focus_to((self.focused + 1) % total);
    }

    fn focus_prev(&mut self) {
        let total = self.schema.field_count();
        if total == 0 {
            return;
        }
        self.focus_to((self.focused + total - 1) % total);
    }

    fn cycle_select(&mut self, dir: i32) {
        let Some(field) = self.current_field() else {
            return;
        };
        let options = field.options();
        if options.is_empty() {
            return;
        }
        let key = field.key.clone();
        let current = self.state.get_value(&key).unwrap_or("");
        let idx = options.iter().position(|o| o.value == current).unwrap_or(0) as i32;
        let next = (idx + dir).rem_euclid(options.len() as i32) as usize;
        let value = options[next].value.clone();
        self.validator.on_input(&mut self.state, &key, &value);
    }

    fn display_value(&self, field: &FormField) -> String {
        match &field.kind {
            FormFieldKind::Select { .. } => self
                .selected_option(&field.key)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| SelectOption::PLACEHOLDER.to_string()),
            _ => self.state.get_value(&field.key).unwrap_or("").to_string(),
        }
    }

    fn field_lines(&self, idx: usize, field: &FormField) -> Vec<Line<'static>> {
        let focused = idx == self.focused;
        let required = self.validator.required.contains(&field.key);
        let mut lines = Vec::new();

        let marker = if focused { "▶ " } else { "  " };
        let mut label = vec![
            Span::styled(marker, Style::default().fg(Color::Cyan)),
            Span::styled(
                field.label.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ];
        if required {
            label.push(Span::styled(" *", Style::default().fg(Color::Red)));
        }
        lines.push(Line::from(label));

        let (mark, color) = match self.state.annotation(&field.key) {
            Some(Validity::Valid) => ("✓", Color::Green),
            Some(Validity::Invalid(_)) => ("✗", Color::Red),
            None => (" ", Color::Gray),
        };
        let value = if focused && field.is_textual() {
            let (head, tail) = split_at_char(self.input.value(), self.input.cursor());
            format!("{head}▏{tail}")
        } else if focused {
            format!("◀ {} ▶", self.display_value(field))
        } else {
            self.display_value(field)
        };
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("[{mark}] "), Style::default().fg(color)),
            Span::styled(
                value,
                if focused {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                },
            ),
        ]));

        if let Some(msg) = self.state.error(&field.key) {
            lines.push(Line::from(Span::styled(
                format!("    {msg}"),
                Style::default().fg(Color::Red),
            )));
        } else if let Some(help) = &field.help {
            lines.push(Line::from(Span::styled(
                format!("    {help}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::raw(""));
        lines
    }
}

fn split_at_char(s: &str, cursor: usize) -> (&str, &str) {
    let byte = s
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s.split_at(byte)
}

impl Component for FormView {
    fn name(&self) -> &str {
        "form"
    }

    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) || matches!(key.code, KeyCode::F(_)) {
            return Ok(None);
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Enter => self.focus_next(),
            _ => {
                let Some(field) = self.current_field() else {
                    return Ok(None);
                };
                if field.is_textual() {
                    let key_name = field.key.clone();
                    if let Some(change) = self.input.handle_event(&CrosstermEvent::Key(key)) {
                        if change.value {
                            let value = self.input.value().to_string();
                            self.validator.on_input(&mut self.state, &key_name, &value);
                        }
                    }
                } else {
                    match key.code {
                        KeyCode::Left => self.cycle_select(-1),
                        KeyCode::Right | KeyCode::Char(' ') => self.cycle_select(1),
                        _ => return Ok(None),
                    }
                }
            }
        }
        Ok(Some(EventResponse::Stop(Action::Update)))
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let mut lines: Vec<Line> = Vec::new();

        if let Some(desc) = &self.schema.description {
            lines.push(Line::from(Span::styled(
                desc.clone(),
                Style::default().fg(Color::Gray),
            )));
            lines.push(Line::raw(""));
        }

        for (idx, field) in self.schema.fields.iter().enumerate() {
            lines.extend(self.field_lines(idx, field));
        }

        for err in &self.state.global_errors {
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }

        let submit = if self.state.is_submitting() {
            Span::styled(
                format!("⟳ {}", self.schema.busy_label),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Span::styled(
                "[ Ctrl+S Submit ]",
                Style::default().fg(Color::Black).bg(Color::Green),
            )
        };
        lines.push(Line::from(submit));

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.schema.title));
        f.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forms::{AgeGate, catalog};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(view: &mut FormView, text: &str) {
        for c in text.chars() {
            view.handle_key_events(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn signup_view() -> FormView {
        let validator =
            FieldValidator::new(catalog::signup_required()).with_age_gate(AgeGate::default());
        FormView::new(catalog::signup_form(&[]), validator)
    }

    #[test]
    fn typing_edits_focused_field_and_blur_marks_valid() {
        let mut view = signup_view();
        type_text(&mut view, "Ada");
        assert_eq!(view.state().get_value("name"), Some("Ada"));
        assert!(view.state().annotation("name").is_none());

        view.handle_key_events(key(KeyCode::Tab)).unwrap();
        assert!(view.state().is_valid("name"));
        assert_eq!(view.focused_key(), Some("age"));
    }

    #[test]
    fn age_feedback_is_live() {
        let mut view = signup_view();
        view.handle_key_events(key(KeyCode::Tab)).unwrap();
        type_text(&mut view, "17");
        assert!(view.state().is_invalid("age"));
        view.handle_key_events(key(KeyCode::Backspace)).unwrap();
        type_text(&mut view, "8");
        assert!(view.state().is_valid("age"));
    }

    #[test]
    fn blocked_submit_focuses_first_invalid() {
        let mut view = signup_view();
        type_text(&mut view, "Ada");
        assert!(view.submit().is_none());
        assert_eq!(view.focused_key(), Some("age"));
        assert_eq!(view.state().error("age"), Some("Age is required."));
    }

    #[test]
    fn control_keys_are_left_to_the_page() {
        let mut view = signup_view();
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(view.handle_key_events(ctrl_s).unwrap().is_none());
        assert_eq!(view.state().get_value("name"), None);
    }

    #[test]
    fn allowed_submit_returns_fields_in_order() {
        let mut view = signup_view();
        view.set_value("name", "Ada");
        view.set_value("age", "30");
        view.set_value("expertise", "First aid");
        view.set_value("opportunity", "4");
        let fields = view.submit().expect("valid form");
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["name", "age", "expertise", "opportunity"]);
        assert!(view.state().is_submitting());
        assert!(view.submit().is_none());

        view.finish(None);
        view.reset();
        assert!(view.state().values.is_empty());
    }

    #[test]
    fn splits_at_char_boundary() {
        assert_eq!(split_at_char("äbc", 1), ("ä", "bc"));
        assert_eq!(split_at_char("ab", 5), ("ab", ""));
    }
}
