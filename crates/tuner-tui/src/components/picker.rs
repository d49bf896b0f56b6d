//! Picker: modal list of choices for one selection (receiver → server,
//! receiver → radio, server → radio).
//!
//! The picker stores only its target and cursor.  Choices and their active
//! markers are re-read from the current view on every draw, so a snapshot
//! landing while the picker is open shows up immediately.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem},
    Frame,
};
use tuner_proto::command::Command;
use tuner_proto::model::OFF;
use tuner_proto::view::{Choice, ListView, Marker};

use crate::{
    action::{Action, PickerTarget},
    app_state::AppState,
    theme::{style_selected_focused, C_ACTIVE, C_MUTED, C_PRIMARY, C_SECONDARY},
    widgets::{pane_chrome::pane_chrome, selection::Selection},
};

pub struct Picker {
    target: PickerTarget,
    selection: Selection,
}

impl Picker {
    /// Open with the cursor on the currently active choice.
    pub fn new(target: PickerTarget, state: &AppState) -> Self {
        let mut picker = Self {
            target,
            selection: Selection::new(),
        };
        if let Some(choices) = picker.choices(state.view()) {
            if let Some(active) = choices.iter().find(|c| c.is_active()) {
                picker.selection.select_id(&active.id);
            }
        }
        picker
    }

    /// `None` once the row the picker belongs to is gone.
    pub fn choices(&self, view: &ListView) -> Option<Vec<Choice>> {
        match &self.target {
            PickerTarget::ReceiverServer { receiver } => {
                view.receiver(receiver).map(|row| row.servers.clone())
            }
            PickerTarget::ReceiverRadio { receiver } => view.receiver(receiver).map(|row| {
                let off = Choice {
                    id: OFF.to_string(),
                    label: OFF.to_string(),
                    marker: if row.radio_id == OFF {
                        Marker::Active
                    } else {
                        Marker::PowerOff
                    },
                };
                std::iter::once(off).chain(row.radios.iter().cloned()).collect()
            }),
            PickerTarget::ServerRadio { server } => {
                view.server(server).map(|row| row.radios.clone())
            }
        }
    }

    fn title(&self, view: &ListView) -> String {
        match &self.target {
            PickerTarget::ReceiverServer { receiver } => format!(
                "Server for {}",
                view.receiver(receiver).map_or(receiver.as_str(), |r| r.name.as_str())
            ),
            PickerTarget::ReceiverRadio { receiver } => format!(
                "Radio for {}",
                view.receiver(receiver).map_or(receiver.as_str(), |r| r.name.as_str())
            ),
            PickerTarget::ServerRadio { server } => format!(
                "Radio on {}",
                view.server(server).map_or(server.as_str(), |s| s.name.as_str())
            ),
        }
    }

    pub fn command_for(&self, choice_id: &str) -> Command {
        match &self.target {
            PickerTarget::ReceiverServer { receiver } => Command::TuneReceiverServer {
                receiver: receiver.clone(),
                server: choice_id.to_string(),
            },
            PickerTarget::ReceiverRadio { receiver } => Command::TuneReceiverRadio {
                receiver: receiver.clone(),
                radio: choice_id.to_string(),
            },
            PickerTarget::ServerRadio { server } => Command::TuneServerRadio {
                server: server.clone(),
                radio: choice_id.to_string(),
            },
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        let Some(choices) = self.choices(state.view()) else {
            return vec![Action::ClosePicker];
        };
        let ids: Vec<&str> = choices.iter().map(|c| c.id.as_str()).collect();
        if self.selection.handle_key(key, &ids) {
            return Vec::new();
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => vec![Action::ClosePicker],
            KeyCode::Enter => match self.selection.sync(&ids).map(|i| ids[i]) {
                Some(id) => vec![Action::Send(self.command_for(id)), Action::ClosePicker],
                None => vec![Action::ClosePicker],
            },
            _ => Vec::new(),
        }
    }

    /// Returns `false` when the picker has nothing left to show.
    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) -> bool {
        let view = state.view();
        let Some(choices) = self.choices(view) else {
            return false;
        };
        let selected = self
            .selection
            .sync(&choices.iter().map(|c| c.id.as_str()).collect::<Vec<_>>());

        let height = (choices.len() as u16).saturating_add(2).min(area.height);
        let popup = centered(area, 48, height);
        let title = self.title(view);

        let items: Vec<ListItem> = choices
            .iter()
            .enumerate()
            .map(|(i, choice)| render_choice(choice, Some(i) == selected))
            .collect();
        let list = List::new(items)
            .block(pane_chrome(&title, None, true, None))
            .highlight_style(style_selected_focused());

        frame.render_widget(Clear, popup);
        frame.render_stateful_widget(list, popup, self.selection.list_state());
        true
    }
}

fn render_choice(choice: &Choice, is_selected: bool) -> ListItem<'static> {
    let (glyph, glyph_color) = match choice.marker {
        Marker::Active => ("●", C_ACTIVE),
        Marker::Inactive => ("○", C_MUTED),
        Marker::PowerOff => ("⏻", C_MUTED),
    };
    let label_style = if choice.is_active() || is_selected {
        Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(C_SECONDARY)
    };
    ListItem::new(Line::from(vec![
        Span::styled(format!(" {glyph} "), Style::default().fg(glyph_color)),
        Span::styled(choice.label.clone(), label_style),
    ]))
}

pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    popup
}
