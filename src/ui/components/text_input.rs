use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::ui::{Component, EventResult, Result};

const MASK: char = '*';

pub enum TextInputEvent {
    Submitted(String),
    Cancelled,
}

/// Single-line input. The cursor counts chars, not bytes.
///
/// Submit and cancel follow the dialog keybindings.
pub struct TextInput {
    label: String,
    value: Vec<char>,
    cursor: usize,
    max_len: Option<usize>,
    masked: bool,
    resolver: Arc<KeyResolver>,
}

impl TextInput {
    pub fn new(label: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            label: label.into(),
            value: Vec::new(),
            cursor: 0,
            max_len: None,
            masked: false,
            resolver,
        }
    }

    pub const fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub const fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    pub fn reset(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn insert_char(&mut self, c: char) {
        if self.max_len.is_some_and(|max| self.value.len() >= max) {
            return;
        }
        self.value.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.value.remove(self.cursor);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    fn display(&self) -> Vec<char> {
        if self.masked {
            vec![MASK; self.value.len()]
        } else {
            self.value.clone()
        }
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_dialog(&key, DialogAction::Confirm) {
            return Ok(TextInputEvent::Submitted(self.value()).into());
        }
        if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            return Ok(TextInputEvent::Cancelled.into());
        }

        match (key.code, key.modifiers) {
            (KeyCode::Backspace, _) => self.delete_char_before_cursor(),
            (KeyCode::Delete, _) => self.delete_char_at_cursor(),
            (KeyCode::Left, _) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, _) => self.cursor = usize::min(self.cursor + 1, self.value.len()),
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => self.cursor = 0,
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.value.len();
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.reset(),
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => self.insert_char(c),
            _ => {}
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Length(60), Constraint::Length(5));
        frame.render_widget(Clear, popup_area);

        let display = self.display();
        let before: String = display[..self.cursor].iter().collect();
        let under = display.get(self.cursor).copied().unwrap_or(' ');
        let after: String = display.iter().skip(self.cursor + 1).collect();

        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);
        let key_style = Style::default().fg(theme.key()).add_modifier(Modifier::BOLD);

        let lines = vec![
            Line::from(vec![
                Span::styled(before, input_style),
                Span::styled(under.to_string(), cursor_style),
                Span::styled(after, input_style),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    format!("[{}]", self.resolver.display_dialog(DialogAction::Confirm)),
                    key_style,
                ),
                Span::styled(" OK  ", Style::default().fg(theme.success())),
                Span::styled(
                    format!("[{}]", self.resolver.display_dialog(DialogAction::Cancel)),
                    key_style,
                ),
                Span::styled(" Cancel", Style::default().fg(theme.hint())),
            ]),
        ];

        let block = Block::default()
            .title(format!(" {} ", self.label))
            .title_style(Style::default().fg(theme.title()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()))
            .style(Style::default().bg(theme.base()));

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}
