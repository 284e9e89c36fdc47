//! The stateful panes of the dashboard.
//!
//! Every pane sees every message through [`Pane::update`] and only sees keys
//! while it holds the focus.

mod managers;
mod output;
mod packages;

use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};

pub use managers::ManagersPane;
pub use output::OutputPane;
pub use packages::PackagesPane;

use crate::Theme;
use crate::effect::Effect;
use crate::message::Message;
use crate::ui::{Component, Keybinding};

pub trait Pane: Component<Output = Effect> {
    /// Fold a message into the pane's state, returning any follow-up work.
    fn update(&mut self, message: &Message) -> Effect;

    fn set_focused(&mut self, focused: bool);

    /// Keys shown in the help line while the pane has focus.
    fn keybindings(&self) -> Vec<Keybinding>;
}

fn pane_block(title: String, focused: bool, theme: &Theme) -> Block<'static> {
    let border = if focused {
        theme.border_focused()
    } else {
        theme.border()
    };
    Block::default()
        .title(title)
        .title_style(Style::default().fg(theme.title()).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
}
