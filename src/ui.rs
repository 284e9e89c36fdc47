pub mod components;
pub mod widgets;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

pub use color_eyre::Result;

use crate::Theme;

pub use components::{
    ConfirmDialog, ConfirmEvent, List, ListEvent, ListRow, RowContext, TextInput, TextInputEvent,
};
pub use widgets::Spinner;

/// Result of handling an input event.
///
/// - `Ignored` - the handler didn't recognize this input
/// - `Consumed` - the input was handled but produced no output
/// - `Event(E)` - the input was handled and produced an output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult<E> {
    Ignored,
    Consumed,
    Event(E),
}

impl<E> EventResult<E> {
    pub const fn is_consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

impl<E> EventResult<E> {
    /// Keep whether the input was consumed, dropping any payload.
    pub fn map_discard<T>(self) -> EventResult<T> {
        match self {
            Self::Ignored => EventResult::Ignored,
            Self::Consumed | Self::Event(_) => EventResult::Consumed,
        }
    }
}

impl<E> From<E> for EventResult<E> {
    fn from(event: E) -> Self {
        Self::Event(event)
    }
}

/// Interactive UI building block.
///
/// Components handle input and emit generic outputs. They know nothing
/// about package managers.
pub trait Component {
    type Output;

    /// Handle a key event.
    ///
    /// Returns `Ignored` when the key is not for this component so the
    /// parent can try it.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        _ = key;
        Ok(EventResult::Ignored)
    }

    /// Called on each tick for animations.
    fn handle_tick(&mut self) {}

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);
}

/// A key shown in the help line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    pub key: String,
    pub description: String,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }
}
