use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{List as RatatuiList, ListItem, ListState};

use crate::Theme;
use crate::config::{KeyResolver, NavAction};
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 5;

pub enum ListEvent {
    /// The cursor moved to this index.
    Changed(usize),
}

/// Per-frame view state handed to every row.
#[derive(Clone, Default)]
pub struct RowContext {
    pub focused: bool,
    pub spinner: Span<'static>,
}

pub trait ListRow {
    fn render_row(&self, context: &RowContext, theme: &Theme) -> ListItem<'static>;
}

/// Cursor-driven list. Rows are owned by the list; the owner mutates them
/// through [`List::items_mut`] and replaces them wholesale on refresh.
pub struct List<T: ListRow> {
    items: Vec<T>,
    state: ListState,
    context: RowContext,
    resolver: Arc<KeyResolver>,
}

impl<T: ListRow> List<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            items,
            state,
            context: RowContext::default(),
            resolver,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [T] {
        &mut self.items
    }

    #[cfg(test)]
    pub fn selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn selected_mut(&mut self) -> Option<&mut T> {
        self.state.selected().and_then(|i| self.items.get_mut(i))
    }

    /// Replace all rows, keeping the cursor within bounds.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;

        if self.items.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.items.len() {
                self.state.select(Some(self.items.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Snapshot used by the next [`Component::render`] call.
    pub fn set_context(&mut self, context: RowContext) {
        self.context = context;
    }

    fn moved(&self, before: Option<usize>) -> EventResult<ListEvent> {
        match self.state.selected() {
            Some(selected) if Some(selected) != before => ListEvent::Changed(selected).into(),
            _ => EventResult::Consumed,
        }
    }
}

impl<T: ListRow> Component for List<T> {
    type Output = ListEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.items.is_empty() {
            return Ok(EventResult::Ignored);
        }
        let before = self.state.selected();
        let last = self.items.len() - 1;

        let target = if self.resolver.matches_nav(&key, NavAction::Down) {
            before.map_or(0, |i| usize::min(i + 1, last))
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            before.map_or(0, |i| i.saturating_sub(1))
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            0
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            last
        } else if self.resolver.matches_nav(&key, NavAction::PageDown) {
            before.map_or(0, |i| usize::min(i + PAGE_STEP, last))
        } else if self.resolver.matches_nav(&key, NavAction::PageUp) {
            before.map_or(0, |i| i.saturating_sub(PAGE_STEP))
        } else {
            return Ok(EventResult::Ignored);
        };

        self.state.select(Some(target));
        Ok(self.moved(before))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|row| row.render_row(&self.context, theme))
            .collect();

        let highlight = if self.context.focused {
            Style::default()
                .bg(theme.selection_bg())
                .fg(theme.selection_fg())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(theme.selection_bg())
        };

        let list = RatatuiList::new(items)
            .highlight_style(highlight)
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row(&'static str);

    impl ListRow for Row {
        fn render_row(&self, _context: &RowContext, _theme: &Theme) -> ListItem<'static> {
            ListItem::new(self.0)
        }
    }

    fn list(names: &[&'static str]) -> List<Row> {
        List::new(
            names.iter().copied().map(Row).collect(),
            Arc::new(KeyResolver::default()),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_reports_changes() {
        let mut list = list(&["apt", "gem", "npm"]);

        let moved = list.handle_key(key(KeyCode::Char('j'))).unwrap();
        assert!(matches!(moved, EventResult::Event(ListEvent::Changed(1))));

        let end = list.handle_key(key(KeyCode::End)).unwrap();
        assert!(matches!(end, EventResult::Event(ListEvent::Changed(2))));

        let stuck = list.handle_key(key(KeyCode::Down)).unwrap();
        assert!(stuck.is_consumed());
        assert!(!matches!(stuck, EventResult::Event(_)));
    }

    #[test]
    fn test_unrelated_keys_are_ignored() {
        let mut list = list(&["apt"]);
        assert!(!list.handle_key(key(KeyCode::Char('u'))).unwrap().is_consumed());
    }

    #[test]
    fn test_set_items_clamps_cursor() {
        let mut list = list(&["a", "b", "c"]);
        list.handle_key(key(KeyCode::End)).unwrap();

        list.set_items(vec![Row("x")]);
        assert_eq!(list.selected(), Some(&Row("x")));

        list.set_items(Vec::new());
        assert_eq!(list.selected_index(), None);
    }
}
