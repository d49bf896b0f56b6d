//! Cursor over a list whose rows are rebuilt on every reconcile.
//!
//! The cursor follows the selected row's id, so a re-sort or a new row
//! above it does not move the highlight to a different entity.  When the
//! selected row disappears the cursor stays at the same position.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::widgets::ListState;

#[derive(Debug, Default)]
pub struct Selection {
    id: Option<String>,
    index: usize,
    state: ListState,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-anchor on the current rows.  Returns the selected position.
    pub fn sync<S: AsRef<str>>(&mut self, ids: &[S]) -> Option<usize> {
        if ids.is_empty() {
            self.id = None;
            self.index = 0;
            self.state.select(None);
            return None;
        }
        if let Some(pos) = self
            .id
            .as_deref()
            .and_then(|id| ids.iter().position(|x| x.as_ref() == id))
        {
            self.index = pos;
        } else {
            self.index = self.index.min(ids.len() - 1);
        }
        self.id = Some(ids[self.index].as_ref().to_string());
        self.state.select(Some(self.index));
        Some(self.index)
    }

    /// Navigation keys (arrows, j/k, Home/End, g/G).  Returns `false` for
    /// any other key.
    pub fn handle_key<S: AsRef<str>>(&mut self, key: KeyEvent, ids: &[S]) -> bool {
        if ids.is_empty() {
            return matches!(
                key.code,
                KeyCode::Up | KeyCode::Down | KeyCode::Home | KeyCode::End
            );
        }
        let last = ids.len() - 1;
        let current = self.sync(ids).unwrap_or(0);
        let target = match key.code {
            KeyCode::Up | KeyCode::Char('k') => current.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => (current + 1).min(last),
            KeyCode::PageUp => current.saturating_sub(10),
            KeyCode::PageDown => (current + 10).min(last),
            KeyCode::Home | KeyCode::Char('g') => 0,
            KeyCode::End | KeyCode::Char('G') => last,
            _ => return false,
        };
        self.index = target;
        self.id = Some(ids[target].as_ref().to_string());
        self.state.select(Some(target));
        true
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Point the cursor at `id` before the next sync.
    pub fn select_id(&mut self, id: &str) {
        self.id = Some(id.to_string());
    }

    pub fn list_state(&mut self) -> &mut ListState {
        &mut self.state
    }
}
