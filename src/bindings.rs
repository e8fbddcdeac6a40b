use crossterm::event::KeyCode;
use std::collections::HashMap;

/// UI controls that can be clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    SendButton,
    Input,
}

/// Something the user does that may map to a widget action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Key(KeyCode),
    Click(Control),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    Send,
}

/// Trigger-to-action table. One action per trigger.
#[derive(Debug, Default)]
pub struct Bindings {
    table: HashMap<Trigger, WidgetAction>,
}

impl Bindings {
    pub fn bind(&mut self, trigger: Trigger, action: WidgetAction) {
        if let Some(previous) = self.table.insert(trigger, action) {
            log::debug!("rebound {:?} (was {:?})", trigger, previous);
        }
    }

    pub fn action_for(&self, trigger: &Trigger) -> Option<WidgetAction> {
        self.table.get(trigger).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
