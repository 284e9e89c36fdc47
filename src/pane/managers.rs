use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::ListItem;

use crate::Theme;
use crate::config::{KeyResolver, ManagersAction};
use crate::effect::{Effect, OperationKind};
use crate::message::Message;
use crate::model::{ManagerEntry, ManagerId};
use crate::pane::{Pane, pane_block};
use crate::ui::{
    Component, EventResult, Keybinding, List, ListEvent, ListRow, Result, RowContext, Spinner,
};

struct ManagerRow {
    id: ManagerId,
    icon: char,
    loading: bool,
    pending: usize,
    selected: bool,
}

impl ListRow for ManagerRow {
    fn render_row(&self, context: &RowContext, theme: &Theme) -> ListItem<'static> {
        let text = if context.focused {
            theme.text()
        } else {
            theme.muted()
        };
        let check = if self.selected { "[x] " } else { "[ ] " };
        let status = if self.loading {
            context.spinner.clone()
        } else if self.pending == 0 {
            Span::styled("✓", Style::default().fg(theme.success()))
        } else {
            Span::styled(
                format!("[{}]", self.pending),
                Style::default().fg(theme.warning()),
            )
        };

        ListItem::new(Line::from(vec![
            Span::styled(check, Style::default().fg(theme.key())),
            Span::styled(format!("{} {} ", self.icon, self.id), Style::default().fg(text)),
            status,
        ]))
    }
}

/// Left-hand list of package managers with their pending update counts.
pub struct ManagersPane {
    list: List<ManagerRow>,
    spinner: Spinner,
    focused: bool,
    resolver: Arc<KeyResolver>,
}

impl ManagersPane {
    pub fn new(managers: &[ManagerEntry], resolver: Arc<KeyResolver>) -> Self {
        let rows = managers
            .iter()
            .map(|entry| ManagerRow {
                id: entry.id.clone(),
                icon: entry.icon,
                loading: false,
                pending: 0,
                selected: false,
            })
            .collect();
        Self {
            list: List::new(rows, Arc::clone(&resolver)),
            spinner: Spinner::new(),
            focused: true,
            resolver,
        }
    }

    /// The manager under the cursor.
    pub fn current(&self) -> Option<&ManagerId> {
        self.list.selected().map(|row| &row.id)
    }

    fn row_mut(&mut self, manager: &ManagerId) -> Option<&mut ManagerRow> {
        self.list.items_mut().iter_mut().find(|row| &row.id == manager)
    }

    fn refresh_all(&self) -> Effect {
        Effect::Batch(
            self.list
                .items()
                .iter()
                .map(|row| Effect::refresh(row.id.clone()))
                .collect(),
        )
    }

    /// Ask once, then update every package of the selected managers, or of
    /// the current one when nothing is selected.
    fn request_update(&mut self) -> Option<Effect> {
        let selected: Vec<ManagerId> = self
            .list
            .items()
            .iter()
            .filter(|row| row.selected)
            .map(|row| row.id.clone())
            .collect();

        if selected.is_empty() {
            let current = self.current()?.clone();
            return Some(Effect::Emit(Message::confirm(
                format!("All {current} package will be updated"),
                Effect::Emit(Message::UpdateAll(current)),
            )));
        }

        for row in self.list.items_mut() {
            row.selected = false;
        }
        let message = format!(
            "All packages of selected {} managers will be updated",
            selected.len()
        );
        let updates = selected
            .into_iter()
            .map(|manager| Effect::Emit(Message::UpdateAll(manager)))
            .collect();
        Some(Effect::Emit(Message::confirm(
            message,
            Effect::Sequence(updates),
        )))
    }
}

impl Component for ManagersPane {
    type Output = Effect;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        match self.list.handle_key(key)? {
            EventResult::Event(ListEvent::Changed(_)) => {
                return Ok(self
                    .current()
                    .map(|id| Effect::Emit(Message::ManagerSelected(id.clone())))
                    .map_or(EventResult::Consumed, EventResult::Event));
            }
            EventResult::Consumed => return Ok(EventResult::Consumed),
            EventResult::Ignored => {}
        }

        if self.resolver.matches_managers(&key, ManagersAction::Toggle) {
            if let Some(row) = self.list.selected_mut() {
                row.selected = !row.selected;
            }
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_managers(&key, ManagersAction::Select)
            && let Some(id) = self.current()
        {
            return Ok(Effect::Emit(Message::FocusPackages(id.clone())).into());
        }
        if self.resolver.matches_managers(&key, ManagersAction::Refresh)
            && let Some(id) = self.current()
        {
            return Ok(Effect::refresh(id.clone()).into());
        }
        if self.resolver.matches_managers(&key, ManagersAction::RefreshAll) {
            return Ok(self.refresh_all().into());
        }
        if self.resolver.matches_managers(&key, ManagersAction::Update)
            && let Some(effect) = self.request_update()
        {
            return Ok(effect.into());
        }

        Ok(EventResult::Ignored)
    }

    fn handle_tick(&mut self) {
        self.spinner.tick();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = pane_block(" Managers ".to_string(), self.focused, theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.list.set_context(RowContext {
            focused: self.focused,
            spinner: self.spinner.symbol(theme),
        });
        self.list.render(frame, inner, theme);
    }
}

impl Pane for ManagersPane {
    fn update(&mut self, message: &Message) -> Effect {
        match message {
            Message::RefreshStarted(manager) => {
                if let Some(row) = self.row_mut(manager) {
                    row.loading = true;
                }
            }
            Message::RefreshFinished { manager, updates } => {
                if let Some(row) = self.row_mut(manager) {
                    row.loading = false;
                    row.pending = updates.len();
                }
            }
            Message::OperationSuspended(continuation)
                if continuation.kind == OperationKind::Refresh =>
            {
                if let Some(row) = self.row_mut(&continuation.manager) {
                    row.loading = false;
                }
            }
            _ => {}
        }
        Effect::none()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::new(self.resolver.display_managers(ManagersAction::Select), "Open"),
            Keybinding::new(self.resolver.display_managers(ManagersAction::Toggle), "Select"),
            Keybinding::new(self.resolver.display_managers(ManagersAction::Update), "Update"),
            Keybinding::new(self.resolver.display_managers(ManagersAction::Refresh), "Refresh"),
            Keybinding::new(
                self.resolver.display_managers(ManagersAction::RefreshAll),
                "Refresh all",
            ),
        ]
    }
}
