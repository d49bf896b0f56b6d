//! RadioList: the relay's radio catalogue.  Add, edit and delete go
//! through overlays owned by the App.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};
use tuner_proto::command::Command;
use tuner_proto::model::Radio;
use tuner_proto::view::RadioRow;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_muted, style_selected, style_selected_focused, C_MUTED, C_PRIMARY, C_SECONDARY},
    widgets::{
        fit_width,
        pane_chrome::{pane_chrome, Badge},
        selection::Selection,
    },
};

const NAME_WIDTH: usize = 22;

pub struct RadioList {
    selection: Selection,
}

impl RadioList {
    pub fn new() -> Self {
        Self {
            selection: Selection::new(),
        }
    }

    fn render_row(row: &RadioRow, is_selected: bool) -> ListItem<'static> {
        let name_style = if is_selected {
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        ListItem::new(Line::from(vec![
            Span::styled(fit_width(&row.name, NAME_WIDTH), name_style),
            Span::styled(row.uri.clone(), style_muted()),
        ]))
    }
}

impl Component for RadioList {
    fn id(&self) -> ComponentId {
        ComponentId::Radios
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        let view = state.view();
        let ids: Vec<&str> = view.radios.iter().map(|r| r.id.as_str()).collect();
        if self.selection.handle_key(key, &ids) {
            return Vec::new();
        }
        if key.code == KeyCode::Char('a') {
            return vec![Action::OpenRadioForm(None, Radio::default())];
        }

        let Some(row) = self.selection.selected_id().and_then(|id| view.radio(id)) else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Enter | KeyCode::Char('e') => vec![Action::OpenRadioForm(
                Some(row.id.clone()),
                Radio::new(row.name.clone(), row.uri.clone()),
            )],
            KeyCode::Char('d') | KeyCode::Delete => vec![Action::Confirm(
                format!("Delete radio \"{}\"?", row.name),
                Command::DeleteRadio { id: row.id.clone() },
            )],
            _ => Vec::new(),
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let rows = &state.view().radios;
        let selected = self.selection.sync(
            &rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        );

        let badge = Badge {
            text: rows.len().to_string(),
            color: C_MUTED,
        };
        let block = pane_chrome("Radios", Some('3'), focused, Some(badge));

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
        "↑↓ select  a add  Enter/e edit  d delete"
    }
}
