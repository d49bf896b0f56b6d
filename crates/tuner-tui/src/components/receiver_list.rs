//! ReceiverList: left pane.  One row per receiver with its volume and the
//! server · radio it resolves to.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};
use tuner_proto::command::Command;
use tuner_proto::model::OFF;
use tuner_proto::view::ReceiverRow;

use crate::{
    action::{Action, ComponentId, PickerTarget},
    app_state::AppState,
    component::Component,
    theme::{
        style_muted, style_selected, style_selected_focused, C_HOST, C_MUTED, C_PRIMARY,
        C_RADIO, C_SECONDARY, C_VOLUME,
    },
    widgets::{
        fit_width,
        pane_chrome::{pane_chrome, Badge},
        selection::Selection,
    },
};

const NAME_WIDTH: usize = 18;

pub struct ReceiverList {
    selection: Selection,
}

impl ReceiverList {
    pub fn new() -> Self {
        Self {
            selection: Selection::new(),
        }
    }

    fn render_row(row: &ReceiverRow, is_selected: bool) -> ListItem<'static> {
        let name_style = if is_selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };

        let mut spans = vec![
            Span::styled(fit_width(&row.name, NAME_WIDTH), name_style),
            Span::styled(format!("{:>5} ", row.volume), Style::default().fg(C_VOLUME)),
        ];
        if row.server_id == OFF {
            spans.push(Span::styled("⏻ off", style_muted()));
        } else {
            spans.push(Span::styled(row.server_label.clone(), Style::default().fg(C_HOST)));
            spans.push(Span::styled(" · ", Style::default().fg(C_MUTED)));
            let radio_style = if row.radio_id == OFF {
                style_muted()
            } else {
                Style::default().fg(C_RADIO)
            };
            spans.push(Span::styled(row.radio_label.clone(), radio_style));
        }
        ListItem::new(Line::from(spans))
    }
}

impl Component for ReceiverList {
    fn id(&self) -> ComponentId {
        ComponentId::Receivers
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        let view = state.view();
        let ids: Vec<&str> = view.receivers.iter().map(|r| r.id.as_str()).collect();
        if self.selection.handle_key(key, &ids) {
            return Vec::new();
        }
        let Some(row) = self.selection.selected_id().and_then(|id| view.receiver(id)) else {
            return Vec::new();
        };

        match key.code {
            KeyCode::Enter | KeyCode::Char('s') => vec![Action::OpenPicker(
                PickerTarget::ReceiverServer {
                    receiver: row.id.clone(),
                },
            )],
            KeyCode::Char('r') => vec![Action::OpenPicker(PickerTarget::ReceiverRadio {
                receiver: row.id.clone(),
            })],
            KeyCode::Char('o') => vec![Action::Send(Command::TuneReceiverServer {
                receiver: row.id.clone(),
                server: OFF.to_string(),
            })],
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => vec![Action::Send(
                Command::set_volume(row.id.clone(), row.volume.saturating_add(state.volume_step)),
            )],
            KeyCode::Char('-') | KeyCode::Left => vec![Action::Send(Command::set_volume(
                row.id.clone(),
                row.volume.saturating_sub(state.volume_step),
            ))],
            _ => Vec::new(),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let rows = &state.view().receivers;
        let selected = self.selection.sync(
            &rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        );

        let badge = Badge {
            text: rows.len().to_string(),
            color: C_MUTED,
        };
        let block = pane_chrome("Receivers", Some('1'), focused, Some(badge));

        let items: Vec<ListItem> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| Self::render_row(row, Some(i) == selected))
            .collect();
        let highlight = if focused {
            style_selected_focused()
        } else {
            style_selected()
        };
        let list = List::new(items).block(block).highlight_style(highlight);
        frame.render_stateful_widget(list, area, self.selection.list_state());
    }

    fn key_hints(&self) -> &'static str {
        "↑↓ select  Enter/s server  r radio  o off  +/- volume"
    }
}
