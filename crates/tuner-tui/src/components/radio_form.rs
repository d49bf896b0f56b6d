//! RadioForm: modal Name/Uri editor for creating or updating a radio.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};
use tuner_proto::command::Command;
use tuner_proto::model::Radio;

use crate::{
    action::Action,
    components::picker::centered,
    theme::{style_input, style_muted, C_ACCENT, C_SECONDARY},
    widgets::pane_chrome::pane_chrome,
};

const LABEL_WIDTH: u16 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Uri,
}

pub struct RadioForm {
    /// `None` when creating.
    id: Option<String>,
    name: Input,
    uri: Input,
    field: Field,
    error: Option<&'static str>,
}

impl RadioForm {
    pub fn new(id: Option<String>, radio: &Radio) -> Self {
        Self {
            id,
            name: Input::new(radio.name.clone()),
            uri: Input::new(radio.uri.clone()),
            field: Field::Name,
            error: None,
        }
    }

    fn submit(&mut self) -> Vec<Action> {
        let name = self.name.value().trim();
        let uri = self.uri.value().trim();
        if uri.is_empty() {
            self.error = Some("uri is required");
            self.field = Field::Uri;
            return Vec::new();
        }
        let radio = Radio::new(name, uri);
        vec![
            Action::Send(Command::SaveRadio {
                id: self.id.clone(),
                radio,
            }),
            Action::CloseRadioForm,
        ]
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Esc => vec![Action::CloseRadioForm],
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.field = match self.field {
                    Field::Name => Field::Uri,
                    Field::Uri => Field::Name,
                };
                Vec::new()
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => self.submit(),
            KeyCode::Enter => match self.field {
                Field::Name => {
                    self.field = Field::Uri;
                    Vec::new()
                }
                Field::Uri => self.submit(),
            },
            _ => {
                self.error = None;
                let input = match self.field {
                    Field::Name => &mut self.name,
                    Field::Uri => &mut self.uri,
                };
                input.handle_event(&Event::Key(key));
                Vec::new()
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let title = if self.id.is_some() { "Edit radio" } else { "New radio" };
        let popup = centered(area, 64, 6);
        let block = pane_chrome(title, None, true, None);
        let inner = block.inner(popup);
        frame.render_widget(Clear, popup);
        frame.render_widget(block, popup);

        let [name_row, uri_row, _, hint_row] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.draw_field(frame, name_row, "Name", &self.name, self.field == Field::Name);
        self.draw_field(frame, uri_row, "Uri", &self.uri, self.field == Field::Uri);

        let hint = match self.error {
            Some(err) => Span::styled(err, Style::default().fg(C_ACCENT)),
            None => Span::styled("Enter next/save  Tab switch  Esc cancel", style_muted()),
        };
        frame.render_widget(Paragraph::new(Line::from(hint)), hint_row);
    }

    fn draw_field(&self, frame: &mut Frame, area: Rect, label: &str, input: &Input, active: bool) {
        let [label_area, value_area] =
            Layout::horizontal([Constraint::Length(LABEL_WIDTH), Constraint::Min(1)]).areas(area);
        frame.render_widget(
            Paragraph::new(Span::styled(label, Style::default().fg(C_SECONDARY))),
            label_area,
        );

        let scroll = input.visual_scroll(value_area.width.saturating_sub(1) as usize);
        let style = if active { style_input() } else { style_muted() };
        frame.render_widget(
            Paragraph::new(input.value()).style(style).scroll((0, scroll as u16)),
            value_area,
        );
        if active {
            let cursor_x = value_area.x + (input.visual_cursor().saturating_sub(scroll)) as u16;
            frame.set_cursor_position((
                cursor_x.min(value_area.x + value_area.width.saturating_sub(1)),
                value_area.y,
            ));
        }
    }
}
