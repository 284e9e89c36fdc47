use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::ui::{Component, EventResult, Result};

/// Longest line of a dialog message before it is wrapped.
pub const MAX_LINE_WIDTH: usize = 50;
const DIALOG_WIDTH: u16 = 60;

pub enum ConfirmEvent {
    Confirmed,
    Cancelled,
}

pub struct ConfirmDialog {
    title: String,
    message: String,
    resolver: Arc<KeyResolver>,
}

impl ConfirmDialog {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            title: "Confirm".to_string(),
            message: String::new(),
            resolver,
        }
    }

    pub fn set_message(&mut self, message: &str) {
        self.message = wrap_text(message, MAX_LINE_WIDTH);
    }

    #[cfg(test)]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Component for ConfirmDialog {
    type Output = ConfirmEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_dialog(&key, DialogAction::Confirm) {
            return Ok(ConfirmEvent::Confirmed.into());
        }
        if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            return Ok(ConfirmEvent::Cancelled.into());
        }
        // Nothing behind a dialog may see the key.
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let message_lines = u16::try_from(self.message.lines().count()).unwrap_or(u16::MAX);
        let popup_area = area.centered(
            Constraint::Length(DIALOG_WIDTH),
            Constraint::Length(message_lines.saturating_add(4)),
        );
        frame.render_widget(Clear, popup_area);

        let key_style = Style::default().fg(theme.key()).add_modifier(Modifier::BOLD);
        let mut lines: Vec<Line> = self
            .message
            .lines()
            .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(theme.text()))))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}]", self.resolver.display_dialog(DialogAction::Confirm)),
                key_style,
            ),
            Span::styled(" OK", Style::default().fg(theme.success())),
            Span::raw("    "),
            Span::styled(
                format!("[{}]", self.resolver.display_dialog(DialogAction::Cancel)),
                key_style,
            ),
            Span::styled(" Cancel", Style::default().fg(theme.hint())),
        ]));

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(theme.title()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(theme.border_focused()))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center);

        frame.render_widget(paragraph, popup_area);
    }
}

/// Greedy word wrap. Explicit line breaks in `input` are kept; a word longer
/// than `width` gets a line of its own.
pub fn wrap_text(input: &str, width: usize) -> String {
    let mut wrapped = Vec::new();
    for paragraph in input.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !line.is_empty() {
                wrapped.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        wrapped.push(line);
    }
    wrapped.join("\n")
}
