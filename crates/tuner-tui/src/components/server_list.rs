//! ServerList: every dynamic server, internal ones flagged, with the radio
//! it plays.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};
use tuner_proto::model::OFF;
use tuner_proto::view::ServerRow;

use crate::{
    action::{Action, ComponentId, PickerTarget},
    app_state::AppState,
    component::Component,
    theme::{
        style_muted, style_selected, style_selected_focused, C_HOST, C_MUTED, C_PENDING,
        C_PRIMARY, C_RADIO, C_SECONDARY,
    },
    widgets::{
        fit_width,
        pane_chrome::{pane_chrome, Badge},
        selection::Selection,
    },
};

const NAME_WIDTH: usize = 16;
const ADDR_WIDTH: usize = 22;

pub struct ServerList {
    selection: Selection,
}

impl ServerList {
    pub fn new() -> Self {
        Self {
            selection: Selection::new(),
        }
    }

    fn render_row(row: &ServerRow, is_selected: bool) -> ListItem<'static> {
        let name_style = if is_selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        let address = format!("{}:{}", row.host, row.port);

        let mut spans = vec![
            Span::styled(fit_width(&row.name, NAME_WIDTH), name_style),
            Span::styled(fit_width(&address, ADDR_WIDTH), Style::default().fg(C_HOST)),
        ];
        if row.internal {
            spans.push(Span::styled("int ", Style::default().fg(C_PENDING)));
        }
        let radio_style = if row.radio_id == OFF {
            style_muted()
        } else {
            Style::default().fg(C_RADIO)
        };
        spans.push(Span::styled(row.radio_label.clone(), radio_style));
        ListItem::new(Line::from(spans))
    }
}

impl Component for ServerList {
    fn id(&self) -> ComponentId {
        ComponentId::Servers
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        let view = state.view();
        let ids: Vec<&str> = view.servers.iter().map(|s| s.id.as_str()).collect();
        if self.selection.handle_key(key, &ids) {
            return Vec::new();
        }
        let Some(row) = self.selection.selected_id().and_then(|id| view.server(id)) else {
            return Vec::new();
        };

        match key.code {
            KeyCode::Enter | KeyCode::Char('r') => {
                vec![Action::OpenPicker(PickerTarget::ServerRadio {
                    server: row.id.clone(),
                })]
            }
            _ => Vec::new(),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let rows = &state.view().servers;
        let selected = self.selection.sync(
            &rows.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        );

        let badge = Badge {
            text: rows.len().to_string(),
            color: C_MUTED,
        };
        let block = pane_chrome("Servers", Some('2'), focused, Some(badge));

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
        "↑↓ select  Enter/r radio"
    }
}
