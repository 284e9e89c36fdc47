use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{
    DialogAction, GlobalAction, ManagersAction, NavAction, PackagesAction,
};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;

/// Maps key events to the actions of each binding group.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    fn global(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::ScrollLogUp => &kb.scroll_log_up,
            GlobalAction::ScrollLogDown => &kb.scroll_log_down,
        }
    }

    fn nav(&self, action: NavAction) -> &KeyBinding {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => &kb.up,
            NavAction::Down => &kb.down,
            NavAction::PageUp => &kb.page_up,
            NavAction::PageDown => &kb.page_down,
            NavAction::Home => &kb.home,
            NavAction::End => &kb.end,
        }
    }

    fn managers(&self, action: ManagersAction) -> &KeyBinding {
        let kb = &self.keybindings.managers;
        match action {
            ManagersAction::Toggle => &kb.toggle,
            ManagersAction::Select => &kb.select,
            ManagersAction::Refresh => &kb.refresh,
            ManagersAction::RefreshAll => &kb.refresh_all,
            ManagersAction::Update => &kb.update,
        }
    }

    fn packages(&self, action: PackagesAction) -> &KeyBinding {
        let kb = &self.keybindings.packages;
        match action {
            PackagesAction::Toggle => &kb.toggle,
            PackagesAction::Back => &kb.back,
            PackagesAction::Update => &kb.update,
            PackagesAction::UpdateAll => &kb.update_all,
        }
    }

    fn dialog(&self, action: DialogAction) -> &KeyBinding {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => &kb.confirm,
            DialogAction::Cancel => &kb.cancel,
        }
    }

    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global(action).matches(event)
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        self.global(action).display()
    }

    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        self.nav(action).matches(event)
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        self.nav(action).display()
    }

    pub fn matches_managers(&self, event: &KeyEvent, action: ManagersAction) -> bool {
        self.managers(action).matches(event)
    }

    pub fn display_managers(&self, action: ManagersAction) -> String {
        self.managers(action).display()
    }

    pub fn matches_packages(&self, event: &KeyEvent, action: PackagesAction) -> bool {
        self.packages(action).matches(event)
    }

    pub fn display_packages(&self, action: PackagesAction) -> String {
        self.packages(action).display()
    }

    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        self.dialog(action).matches(event)
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        self.dialog(action).display()
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}
