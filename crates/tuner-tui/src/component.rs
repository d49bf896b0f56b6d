//! Component trait: the interface every pane implements.
//!
//! - Components own their cursor state and render themselves.
//! - Components receive `AppState` (read-only) for the rows they show.
//! - Components produce `Vec<Action>`; they never send commands directly.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;

pub trait Component {
    fn id(&self) -> ComponentId;

    /// Only called when this component has focus.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState);

    /// Key hints for the footer while focused.
    fn key_hints(&self) -> &'static str {
        ""
    }
}
