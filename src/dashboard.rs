//! Owns every pane and the dialogs, and is the single place messages are
//! folded into state.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::debug;

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver, NavAction};
use crate::dialog::ModalStack;
use crate::effect::Effect;
use crate::focus::{FocusRouter, FocusTarget};
use crate::log_ring::LogRing;
use crate::message::Message;
use crate::model::{ManagerEntry, ManagerId};
use crate::pane::{ManagersPane, OutputPane, PackagesPane, Pane};
use crate::ui::{Component, EventResult, Keybinding, Result};

pub struct Dashboard {
    focus: FocusRouter,
    managers: ManagersPane,
    packages: Vec<PackagesPane>,
    /// Manager whose packages are shown on the right.
    shown: Option<ManagerId>,
    dialogs: ModalStack,
    output: OutputPane,
    resolver: Arc<KeyResolver>,
    should_quit: bool,
}

impl Dashboard {
    pub fn new(managers: &[ManagerEntry], ring: LogRing, resolver: Arc<KeyResolver>) -> Self {
        Self {
            focus: FocusRouter::new(),
            managers: ManagersPane::new(managers, Arc::clone(&resolver)),
            packages: managers
                .iter()
                .map(|entry| PackagesPane::new(entry.id.clone(), Arc::clone(&resolver)))
                .collect(),
            shown: managers.first().map(|entry| entry.id.clone()),
            dialogs: ModalStack::new(Arc::clone(&resolver)),
            output: OutputPane::new(ring),
            resolver,
            should_quit: false,
        }
    }

    /// Refresh every manager, one after another.
    pub fn init(&self) -> Effect {
        Effect::Sequence(
            self.packages
                .iter()
                .map(|pane| Effect::refresh(pane.manager().clone()))
                .collect(),
        )
    }

    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Fold one message into the state.
    ///
    /// Keys go to whoever held the focus when the message arrived. Every
    /// other message is seen by every pane and the dialogs, in a fixed order.
    pub fn dispatch(&mut self, message: Message) -> Result<Vec<Effect>> {
        let focus = self.focus.current().clone();
        let mut effects = Vec::new();

        match &message {
            Message::Key(key) => {
                if let Some(effect) = self.handle_key(*key, &focus)? {
                    effects.push(effect);
                }
                return Ok(effects);
            }
            Message::Quit => self.should_quit = true,
            Message::Tick => self.tick(),
            Message::FocusManagers => {
                self.focus.request(FocusTarget::ManagersPane);
            }
            Message::FocusPackages(manager) => {
                if self.focus.request(FocusTarget::PackagesPane(manager.clone())) {
                    self.shown = Some(manager.clone());
                }
            }
            Message::ManagerSelected(manager) => self.shown = Some(manager.clone()),
            _ => {}
        }

        effects.push(self.managers.update(&message));
        for pane in &mut self.packages {
            effects.push(pane.update(&message));
        }
        self.dialogs.update(&message, &mut self.focus);
        effects.push(self.output.update(&message));

        effects.retain(|effect| !effect.is_none());
        Ok(effects)
    }

    fn handle_key(&mut self, key: KeyEvent, focus: &FocusTarget) -> Result<Option<Effect>> {
        if self.resolver.matches_global(&key, GlobalAction::Quit)
            && focus != &FocusTarget::PasswordDialog
        {
            return Ok(Some(Effect::Emit(Message::Quit)));
        }
        if self.resolver.matches_global(&key, GlobalAction::ScrollLogUp) {
            self.output.scroll_up();
            return Ok(None);
        }
        if self.resolver.matches_global(&key, GlobalAction::ScrollLogDown) {
            self.output.scroll_down();
            return Ok(None);
        }

        let result = match focus {
            FocusTarget::ConfirmDialog | FocusTarget::PasswordDialog => {
                self.dialogs.handle_key(key, &mut self.focus)?
            }
            FocusTarget::ManagersPane => self.managers.handle_key(key)?,
            FocusTarget::PackagesPane(manager) => match self.packages_pane_mut(manager) {
                Some(pane) => pane.handle_key(key)?,
                None => EventResult::Ignored,
            },
        };

        Ok(match result {
            EventResult::Event(effect) => Some(effect),
            EventResult::Ignored => {
                debug!("Unhandled key {:?} for {focus:?}", key.code);
                None
            }
            EventResult::Consumed => None,
        })
    }

    fn tick(&mut self) {
        self.managers.handle_tick();
        for pane in &mut self.packages {
            pane.handle_tick();
        }
    }

    fn packages_pane_mut(&mut self, manager: &ManagerId) -> Option<&mut PackagesPane> {
        self.packages
            .iter_mut()
            .find(|pane| pane.manager() == manager)
    }

    pub fn render(&mut self, frame: &mut Frame, theme: &Theme) {
        let [main, help] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .areas(frame.area());
        let [left, right] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .areas(main);
        let [packages, output] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .areas(right);

        self.managers
            .set_focused(self.focus.is_focused(&FocusTarget::ManagersPane));
        self.managers.render(frame, left, theme);

        let shown = self.shown.clone();
        for pane in &mut self.packages {
            let target = FocusTarget::PackagesPane(pane.manager().clone());
            pane.set_focused(self.focus.is_focused(&target));
            if shown.as_ref() == Some(pane.manager()) {
                pane.render(frame, packages, theme);
            }
        }

        self.output.render(frame, output, theme);
        self.dialogs.render(frame, right, theme);
        self.render_help(frame, help, theme);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let key_style = Style::default().fg(theme.key()).add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(theme.hint());

        let spans: Vec<Span> = self
            .keybindings()
            .into_iter()
            .flat_map(|binding| {
                [
                    Span::styled(binding.key, key_style),
                    Span::styled(format!(" {}  ", binding.description), desc_style),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Keys of the focused component followed by the global ones.
    pub fn keybindings(&self) -> Vec<Keybinding> {
        let mut bindings = match self.focus.current() {
            FocusTarget::ConfirmDialog | FocusTarget::PasswordDialog => self.dialogs.keybindings(),
            FocusTarget::ManagersPane => self.managers.keybindings(),
            FocusTarget::PackagesPane(manager) => self
                .packages
                .iter()
                .find(|pane| pane.manager() == manager)
                .map(Pane::keybindings)
                .unwrap_or_default(),
        };
        if !self.focus.current().is_dialog() {
            bindings.push(Keybinding::new(
                format!(
                    "{}/{}",
                    self.resolver.display_nav(NavAction::Up),
                    self.resolver.display_nav(NavAction::Down)
                ),
                "Navigate",
            ));
        }
        bindings.push(Keybinding::new(
            format!(
                "{}/{}",
                self.resolver.display_global(GlobalAction::ScrollLogUp),
                self.resolver.display_global(GlobalAction::ScrollLogDown)
            ),
            "Scroll log",
        ));
        bindings.push(Keybinding::new(
            self.resolver.display_global(GlobalAction::Quit),
            "Quit",
        ));
        bindings
    }
}
