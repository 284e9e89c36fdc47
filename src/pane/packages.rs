use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{ListItem, Paragraph};

use crate::Theme;
use crate::config::{KeyResolver, PackagesAction};
use crate::effect::{Effect, OperationKind};
use crate::message::Message;
use crate::model::{ManagerId, PackageItem};
use crate::pane::{Pane, pane_block};
use crate::ui::{Component, EventResult, Keybinding, List, ListRow, Result, RowContext, Spinner};

impl ListRow for PackageItem {
    fn render_row(&self, context: &RowContext, theme: &Theme) -> ListItem<'static> {
        let (name, versions) = if context.focused {
            (theme.text(), theme.muted())
        } else {
            (theme.muted(), theme.dimmed())
        };
        let check = if self.selected { "[x] " } else { "[ ] " };

        let mut spans = vec![
            Span::styled(check, Style::default().fg(theme.key())),
            Span::styled(
                self.name.clone(),
                Style::default().fg(name).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" ({} -> {})", self.old_version, self.new_version),
                Style::default().fg(versions),
            ),
        ];
        if self.updating {
            spans.push(Span::raw(" "));
            spans.push(context.spinner.clone());
        }
        ListItem::new(Line::from(spans))
    }
}

/// Pending updates of one manager.
pub struct PackagesPane {
    manager: ManagerId,
    list: List<PackageItem>,
    loading: bool,
    spinner: Spinner,
    focused: bool,
    resolver: Arc<KeyResolver>,
}

impl PackagesPane {
    pub fn new(manager: ManagerId, resolver: Arc<KeyResolver>) -> Self {
        Self {
            manager,
            list: List::new(Vec::new(), Arc::clone(&resolver)),
            loading: false,
            spinner: Spinner::new(),
            focused: false,
            resolver,
        }
    }

    pub const fn manager(&self) -> &ManagerId {
        &self.manager
    }

    pub fn items(&self) -> &[PackageItem] {
        self.list.items()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    fn set_updating(&mut self, packages: &[String], updating: bool) {
        for item in self.list.items_mut() {
            if packages.contains(&item.name) {
                item.updating = updating;
            }
        }
    }

    fn idle_names(&self) -> Vec<String> {
        self.list
            .items()
            .iter()
            .filter(|item| !item.updating)
            .map(|item| item.name.clone())
            .collect()
    }

    /// Selected packages in one call, otherwise the one under the cursor.
    fn request_update(&mut self) -> Option<Effect> {
        let selected: Vec<String> = self
            .list
            .items()
            .iter()
            .filter(|item| item.selected && !item.updating)
            .map(|item| item.name.clone())
            .collect();

        if selected.is_empty() {
            let item = self.list.selected().filter(|item| !item.updating)?;
            return Some(Effect::Emit(Message::confirm(
                format!("Package {} will be updated", item.name),
                Effect::update_one(self.manager.clone(), item.name.clone()),
            )));
        }

        for item in self.list.items_mut() {
            item.selected = false;
        }
        Some(Effect::Emit(Message::confirm(
            format!("Selected {} packages will be updated", selected.len()),
            Effect::update_many(self.manager.clone(), selected),
        )))
    }

    fn request_update_all(&self) -> Option<Effect> {
        let names = self.idle_names();
        if names.is_empty() {
            return None;
        }
        Some(Effect::Emit(Message::confirm(
            format!("All {} packages will be updated", names.len()),
            Effect::update_many(self.manager.clone(), names),
        )))
    }
}

impl Component for PackagesPane {
    type Output = Effect;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let result = self.list.handle_key(key)?;
        if result.is_consumed() {
            return Ok(EventResult::Consumed);
        }

        if self.resolver.matches_packages(&key, PackagesAction::Back) {
            return Ok(Effect::Emit(Message::FocusManagers).into());
        }
        if self.resolver.matches_packages(&key, PackagesAction::Toggle) {
            if let Some(item) = self.list.selected_mut() {
                item.selected = !item.selected;
            }
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_packages(&key, PackagesAction::Update) {
            return Ok(self
                .request_update()
                .map_or(EventResult::Consumed, EventResult::Event));
        }
        if self.resolver.matches_packages(&key, PackagesAction::UpdateAll) {
            return Ok(self
                .request_update_all()
                .map_or(EventResult::Consumed, EventResult::Event));
        }

        Ok(EventResult::Ignored)
    }

    fn handle_tick(&mut self) {
        self.spinner.tick();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let title = format!(" {} ({}) ", self.manager, self.items().len());
        let block = pane_block(title, self.focused, theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.is_loading() {
            let line = Line::from(vec![
                self.spinner.symbol(theme),
                Span::styled(" Loading packages...", Style::default().fg(theme.muted())),
            ]);
            frame.render_widget(Paragraph::new(line), inner);
            return;
        }
        if self.list.items().is_empty() {
            let line = Span::styled("No updates available", Style::default().fg(theme.muted()));
            frame.render_widget(Paragraph::new(line), inner);
            return;
        }

        self.list.set_context(RowContext {
            focused: self.focused,
            spinner: self.spinner.symbol(theme),
        });
        self.list.render(frame, inner, theme);
    }
}

impl Pane for PackagesPane {
    fn update(&mut self, message: &Message) -> Effect {
        match message {
            Message::RefreshStarted(manager) if manager == &self.manager => {
                self.loading = true;
            }
            Message::RefreshFinished { manager, updates } if manager == &self.manager => {
                self.loading = false;
                self.list
                    .set_items(updates.iter().cloned().map(PackageItem::from).collect());
            }
            Message::UpdateStarted { manager, packages } if manager == &self.manager => {
                self.set_updating(packages, true);
            }
            Message::UpdateFinished { manager, packages } if manager == &self.manager => {
                self.set_updating(packages, false);
            }
            Message::OperationSuspended(continuation) if continuation.manager == self.manager => {
                match continuation.kind {
                    OperationKind::Refresh => self.loading = false,
                    OperationKind::UpdateOne | OperationKind::UpdateMany => {
                        self.set_updating(&continuation.packages, false);
                    }
                }
            }
            // Already confirmed by the managers pane.
            Message::UpdateAll(manager) if manager == &self.manager => {
                let names = self.idle_names();
                if !names.is_empty() {
                    return Effect::update_many(self.manager.clone(), names);
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
            Keybinding::new(self.resolver.display_packages(PackagesAction::Toggle), "Select"),
            Keybinding::new(self.resolver.display_packages(PackagesAction::Update), "Update"),
            Keybinding::new(
                self.resolver.display_packages(PackagesAction::UpdateAll),
                "Update all",
            ),
            Keybinding::new(self.resolver.display_packages(PackagesAction::Back), "Back"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::backend::PackageUpdate;
    use crate::effect::Operation;

    fn pane_with(names: &[&str]) -> PackagesPane {
        let mut pane = PackagesPane::new("apt".into(), Arc::new(KeyResolver::default()));
        pane.update(&Message::RefreshFinished {
            manager: "apt".into(),
            updates: names
                .iter()
                .map(|name| PackageUpdate::new(*name, "1.0", "1.1"))
                .collect(),
        });
        pane
    }

    fn press(pane: &mut PackagesPane, code: KeyCode) -> EventResult<Effect> {
        pane.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn confirmation(result: EventResult<Effect>) -> (String, Effect) {
        match result {
            EventResult::Event(Effect::Emit(Message::ShowConfirm {
                message,
                on_confirm,
            })) => (message, *on_confirm),
            _ => panic!("expected a confirmation"),
        }
    }

    fn run_of(effect: &Effect) -> &Operation {
        match effect {
            Effect::Sequence(steps) => match steps.as_slice() {
                [_, Effect::Run(op)] => op,
                _ => panic!("unexpected steps"),
            },
            _ => panic!("expected a started operation"),
        }
    }

    #[test]
    fn test_refresh_replaces_items_and_clears_flags() {
        let mut pane = pane_with(&["curl", "git"]);
        press(&mut pane, KeyCode::Char(' '));
        pane.update(&Message::UpdateStarted {
            manager: "apt".into(),
            packages: vec!["git".to_string()],
        });
        pane.update(&Message::RefreshStarted("apt".into()));
        assert!(pane.is_loading());

        pane.update(&Message::RefreshFinished {
            manager: "apt".into(),
            updates: vec![
                PackageUpdate::new("curl", "1.0", "1.1"),
                PackageUpdate::new("git", "1.0", "1.1"),
            ],
        });

        assert!(!pane.is_loading());
        let expected: Vec<PackageItem> = ["curl", "git"]
            .into_iter()
            .map(|name| PackageUpdate::new(name, "1.0", "1.1").into())
            .collect();
        assert_eq!(pane.items(), expected.as_slice());
    }

    #[test]
    fn test_other_managers_are_ignored() {
        let mut pane = pane_with(&["curl"]);
        pane.update(&Message::RefreshFinished {
            manager: "npm".into(),
            updates: Vec::new(),
        });
        assert_eq!(pane.items().len(), 1);
    }

    #[test]
    fn test_update_current_package() {
        let mut pane = pane_with(&["curl", "git"]);
        let (message, effect) = confirmation(press(&mut pane, KeyCode::Char('u')));

        assert_eq!(message, "Are you sure?\nPackage curl will be updated");
        let op = run_of(&effect);
        assert_eq!(op.kind, OperationKind::UpdateOne);
        assert_eq!(op.packages, vec!["curl"]);
    }

    #[test]
    fn test_update_selected_packages() {
        let mut pane = pane_with(&["curl", "git", "vim"]);
        press(&mut pane, KeyCode::Char(' '));
        press(&mut pane, KeyCode::End);
        press(&mut pane, KeyCode::Char(' '));

        let (message, effect) = confirmation(press(&mut pane, KeyCode::Char('u')));

        assert_eq!(message, "Are you sure?\nSelected 2 packages will be updated");
        assert_eq!(run_of(&effect).packages, vec!["curl", "vim"]);
        assert!(pane.items().iter().all(|item| !item.selected));
    }

    #[test]
    fn test_update_lifecycle_is_idempotent() {
        let mut pane = pane_with(&["curl"]);
        let started = Message::UpdateStarted {
            manager: "apt".into(),
            packages: vec!["curl".to_string()],
        };
        let finished = Message::UpdateFinished {
            manager: "apt".into(),
            packages: vec!["curl".to_string()],
        };

        pane.update(&started);
        assert!(pane.items()[0].updating);
        // An updating package cannot be queued twice.
        assert!(!matches!(press(&mut pane, KeyCode::Char('u')), EventResult::Event(_)));

        pane.update(&finished);
        pane.update(&finished);
        assert!(!pane.items()[0].updating);
    }

    #[test]
    fn test_update_all_from_managers_skips_confirmation() {
        let mut pane = pane_with(&["curl", "git"]);
        let effect = pane.update(&Message::UpdateAll("apt".into()));

        let op = run_of(&effect);
        assert_eq!(op.kind, OperationKind::UpdateMany);
        assert_eq!(op.packages, vec!["curl", "git"]);

        assert!(pane.update(&Message::UpdateAll("npm".into())).is_none());
    }

    #[test]
    fn test_suspension_clears_updating() {
        let mut pane = pane_with(&["curl"]);
        let op = Operation::update_one("apt".into(), "curl".to_string());
        pane.update(&op.started());
        pane.update(&Message::OperationSuspended(op.continuation()));

        assert!(!pane.items()[0].updating);
    }

    #[test]
    fn test_suspended_refresh_stops_loading() {
        let mut pane = pane_with(&["curl"]);
        let op = Operation::refresh("apt".into());
        pane.update(&op.started());
        assert!(pane.is_loading());

        pane.update(&Message::OperationSuspended(op.continuation()));
        assert!(!pane.is_loading());
        assert_eq!(pane.items().len(), 1);
    }

    #[test]
    fn test_back_returns_to_managers() {
        let mut pane = pane_with(&[]);
        assert!(matches!(
            press(&mut pane, KeyCode::Char('h')),
            EventResult::Event(Effect::Emit(Message::FocusManagers))
        ));
    }
}
