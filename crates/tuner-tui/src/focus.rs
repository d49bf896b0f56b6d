//! Keyboard focus over the panes, in `ComponentId::ALL` order.

use crate::action::ComponentId;

const PANES: usize = ComponentId::ALL.len();

#[derive(Debug, Default)]
pub struct FocusRing {
    index: usize,
}

impl FocusRing {
    pub fn focused(&self) -> ComponentId {
        ComponentId::ALL[self.index]
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.focused() == id
    }

    pub fn advance(&mut self) {
        self.rotate(1);
    }

    pub fn retreat(&mut self) {
        self.rotate(PANES - 1);
    }

    pub fn focus(&mut self, id: ComponentId) {
        if let Some(index) = ComponentId::ALL.iter().position(|&pane| pane == id) {
            self.index = index;
        }
    }

    fn rotate(&mut self, by: usize) {
        self.index = (self.index + by) % PANES;
    }
}
