use ratatui::style::Style;
use ratatui::text::Span;
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;

/// Busy indicator drawn inline in list rows.
#[derive(Default)]
pub struct Spinner {
    state: ThrobberState,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.state.calc_next();
    }

    /// The current animation frame as a one-character span.
    pub fn symbol(&self, theme: &Theme) -> Span<'static> {
        Throbber::default()
            .throbber_set(BRAILLE_SIX)
            .use_type(Spin)
            .throbber_style(Style::default().fg(theme.warning()))
            .to_symbol_span(&self.state)
    }
}
