use crossterm::event::KeyCode;

use crate::config::key::{Key, KeyBinding};
use crate::config::keybindings::{
    DialogKeybindings, GlobalKeybindings, ManagersKeybindings, NavigationKeybindings,
    PackagesKeybindings,
};

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            scroll_log_up: Key::with_ctrl(KeyCode::Char('k')).into(),
            scroll_log_down: Key::with_ctrl(KeyCode::Char('j')).into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple(vec![Key::new(KeyCode::Char('k')), Key::new(KeyCode::Up)]),
            down: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('j')),
                Key::new(KeyCode::Down),
            ]),
            page_up: Key::new(KeyCode::PageUp).into(),
            page_down: Key::new(KeyCode::PageDown).into(),
            home: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('g')),
                Key::new(KeyCode::Home),
            ]),
            end: KeyBinding::multiple(vec![Key::new(KeyCode::Char('G')), Key::new(KeyCode::End)]),
        }
    }
}

impl Default for ManagersKeybindings {
    fn default() -> Self {
        Self {
            toggle: Key::new(KeyCode::Char(' ')).into(),
            select: KeyBinding::multiple(vec![
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Right),
                Key::new(KeyCode::Char('l')),
            ]),
            refresh: Key::new(KeyCode::Char('r')).into(),
            refresh_all: Key::new(KeyCode::Char('R')).into(),
            update: Key::new(KeyCode::Char('u')).into(),
        }
    }
}

impl Default for PackagesKeybindings {
    fn default() -> Self {
        Self {
            toggle: Key::new(KeyCode::Char(' ')).into(),
            back: KeyBinding::multiple(vec![
                Key::new(KeyCode::Backspace),
                Key::new(KeyCode::Left),
                Key::new(KeyCode::Char('h')),
            ]),
            update: Key::new(KeyCode::Char('u')).into(),
            update_all: Key::new(KeyCode::Char('a')).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            confirm: Key::new(KeyCode::Enter).into(),
            cancel: Key::new(KeyCode::Esc).into(),
        }
    }
}
