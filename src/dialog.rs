//! Confirmation and password prompts layered over the panes.
//!
//! At most one dialog is visible. While it is, it owns the focus and every
//! key. Show requests for the visible dialog queue their callbacks; a
//! request for the other dialog waits until the visible one closes.

use std::collections::VecDeque;
use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::Theme;
use crate::backend::Credential;
use crate::config::{DialogAction, KeyResolver};
use crate::effect::{Continuation, Effect};
use crate::focus::{FocusRouter, FocusTarget};
use crate::message::Message;
use crate::ui::{
    Component, ConfirmDialog, ConfirmEvent, EventResult, Keybinding, Result, TextInput,
    TextInputEvent,
};

const PASSWORD_TITLE: &str = "Enter your password to proceed";
const PASSWORD_MAX_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Confirm,
    Password,
}

impl DialogKind {
    const fn focus_target(self) -> FocusTarget {
        match self {
            Self::Confirm => FocusTarget::ConfirmDialog,
            Self::Password => FocusTarget::PasswordDialog,
        }
    }
}

#[derive(Debug)]
enum ShowRequest {
    Confirm { message: String, on_confirm: Effect },
    Password(Continuation),
}

impl ShowRequest {
    const fn kind(&self) -> DialogKind {
        match self {
            Self::Confirm { .. } => DialogKind::Confirm,
            Self::Password(_) => DialogKind::Password,
        }
    }
}

pub struct ModalStack {
    confirm: ConfirmDialog,
    on_confirm: Vec<Effect>,
    password: TextInput,
    suspended: Vec<Continuation>,
    visible: Option<DialogKind>,
    saved_focus: Option<FocusTarget>,
    deferred: VecDeque<ShowRequest>,
    resolver: Arc<KeyResolver>,
}

impl ModalStack {
    pub fn new(resolver: Arc<KeyResolver>) -> Self {
        Self {
            confirm: ConfirmDialog::new(Arc::clone(&resolver)),
            on_confirm: Vec::new(),
            password: TextInput::new(PASSWORD_TITLE, Arc::clone(&resolver))
                .masked()
                .with_max_len(PASSWORD_MAX_LEN),
            suspended: Vec::new(),
            visible: None,
            saved_focus: None,
            deferred: VecDeque::new(),
            resolver,
        }
    }

    #[cfg(test)]
    pub const fn visible(&self) -> Option<DialogKind> {
        self.visible
    }

    /// Callbacks waiting on the visible dialog.
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.on_confirm.len() + self.suspended.len()
    }

    pub fn update(&mut self, message: &Message, focus: &mut FocusRouter) {
        let request = match message {
            Message::ShowConfirm {
                message,
                on_confirm,
            } => ShowRequest::Confirm {
                message: message.clone(),
                on_confirm: on_confirm.as_ref().clone(),
            },
            Message::ShowPassword(continuation) => ShowRequest::Password(continuation.clone()),
            _ => return,
        };
        self.show(request, focus);
    }

    fn show(&mut self, request: ShowRequest, focus: &mut FocusRouter) {
        let kind = request.kind();
        match self.visible {
            None => {
                self.saved_focus = Some(focus.current().clone());
                focus.set_focus(kind.focus_target());
                self.visible = Some(kind);
            }
            Some(visible) if visible == kind => {}
            Some(_) => {
                tracing::debug!("Deferring {kind:?} dialog");
                self.deferred.push_back(request);
                return;
            }
        }

        match request {
            ShowRequest::Confirm {
                message,
                on_confirm,
            } => {
                self.confirm.set_message(&message);
                self.on_confirm.push(on_confirm);
            }
            ShowRequest::Password(continuation) => self.suspended.push(continuation),
        }
    }

    /// Route a key to the visible dialog. The returned effect runs every
    /// queued callback together.
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        focus: &mut FocusRouter,
    ) -> Result<EventResult<Effect>> {
        let effect = match self.visible {
            None => return Ok(EventResult::Ignored),
            Some(DialogKind::Confirm) => match self.confirm.handle_key(key)? {
                EventResult::Event(ConfirmEvent::Confirmed) => {
                    Effect::Batch(std::mem::take(&mut self.on_confirm))
                }
                EventResult::Event(ConfirmEvent::Cancelled) => {
                    self.on_confirm.clear();
                    Effect::none()
                }
                other => return Ok(other.map_discard()),
            },
            Some(DialogKind::Password) => match self.password.handle_key(key)? {
                EventResult::Event(TextInputEvent::Submitted(secret)) => {
                    let credential = Credential::new(secret);
                    Effect::Batch(
                        self.suspended
                            .drain(..)
                            .map(|continuation| continuation.resume(credential.clone()))
                            .collect(),
                    )
                }
                EventResult::Event(TextInputEvent::Cancelled) => {
                    tracing::info!("Password entry cancelled");
                    self.suspended.clear();
                    Effect::none()
                }
                other => return Ok(other.map_discard()),
            },
        };

        self.close(focus);
        Ok(effect.into())
    }

    fn close(&mut self, focus: &mut FocusRouter) {
        self.visible = None;
        self.password.reset();
        if let Some(saved) = self.saved_focus.take() {
            focus.set_focus(saved);
        }

        if let Some(request) = self.deferred.pop_front() {
            let kind = request.kind();
            self.show(request, focus);
            // Requests of the same kind join it right away.
            let (same, other): (VecDeque<_>, VecDeque<_>) = std::mem::take(&mut self.deferred)
                .into_iter()
                .partition(|request| request.kind() == kind);
            self.deferred = other;
            for request in same {
                self.show(request, focus);
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match self.visible {
            Some(DialogKind::Confirm) => self.confirm.render(frame, area, theme),
            Some(DialogKind::Password) => self.password.render(frame, area, theme),
            None => {}
        }
    }

    pub fn keybindings(&self) -> Vec<Keybinding> {
        if self.visible.is_none() {
            return Vec::new();
        }
        vec![
            Keybinding::new(self.resolver.display_dialog(DialogAction::Confirm), "OK"),
            Keybinding::new(self.resolver.display_dialog(DialogAction::Cancel), "Cancel"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::effect::{Operation, OperationKind};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn stack() -> (ModalStack, FocusRouter) {
        let mut focus = FocusRouter::new();
        focus.request(FocusTarget::PackagesPane("apt".into()));
        (ModalStack::new(Arc::new(KeyResolver::default())), focus)
    }

    fn confirm(stack: &mut ModalStack, focus: &mut FocusRouter, package: &str) {
        let message = Message::confirm(
            format!("Package {package} will be updated"),
            Effect::update_one("apt".into(), package.to_string()),
        );
        stack.update(&message, focus);
    }

    fn password(stack: &mut ModalStack, focus: &mut FocusRouter, package: &str) {
        let continuation = Operation::update_one("apt".into(), package.to_string()).continuation();
        stack.update(&Message::ShowPassword(continuation), focus);
    }

    fn operations(effect: &Effect) -> Vec<&Operation> {
        match effect {
            Effect::Run(op) => vec![op],
            Effect::Sequence(effects) | Effect::Batch(effects) => {
                effects.iter().flat_map(operations).collect()
            }
            Effect::Emit(_) => Vec::new(),
        }
    }

    fn take_effect(result: EventResult<Effect>) -> Effect {
        match result {
            EventResult::Event(effect) => effect,
            _ => panic!("dialog should have closed"),
        }
    }

    #[test]
    fn test_all_callbacks_fire_on_confirm() {
        let (mut stack, mut focus) = stack();
        for package in ["curl", "git", "vim"] {
            confirm(&mut stack, &mut focus, package);
        }
        assert_eq!(stack.visible(), Some(DialogKind::Confirm));
        assert_eq!(stack.pending(), 3);
        assert!(stack.confirm.message().ends_with("Package vim will be updated"));

        let effect = take_effect(stack.handle_key(key(KeyCode::Enter), &mut focus).unwrap());
        let packages: Vec<_> = operations(&effect)
            .iter()
            .flat_map(|op| op.packages.clone())
            .collect();

        assert!(matches!(effect, Effect::Batch(_)));
        assert_eq!(packages, vec!["curl", "git", "vim"]);
        assert_eq!(stack.pending(), 0);
        assert_eq!(stack.visible(), None);
    }

    #[test]
    fn test_no_callback_fires_on_cancel() {
        let (mut stack, mut focus) = stack();
        confirm(&mut stack, &mut focus, "curl");
        confirm(&mut stack, &mut focus, "git");

        let effect = take_effect(stack.handle_key(key(KeyCode::Esc), &mut focus).unwrap());

        assert!(effect.is_none());
        assert_eq!(stack.pending(), 0);
    }

    #[test]
    fn test_focus_restored_after_close() {
        let (mut stack, mut focus) = stack();
        confirm(&mut stack, &mut focus, "curl");
        assert_eq!(focus.current(), &FocusTarget::ConfirmDialog);

        // A pane cannot steal focus from the dialog.
        assert!(!focus.request(FocusTarget::ManagersPane));
        confirm(&mut stack, &mut focus, "git");

        stack.handle_key(key(KeyCode::Esc), &mut focus).unwrap();
        assert_eq!(focus.current(), &FocusTarget::PackagesPane("apt".into()));
    }

    #[test]
    fn test_unbound_keys_are_swallowed() {
        let (mut stack, mut focus) = stack();
        confirm(&mut stack, &mut focus, "curl");

        let result = stack.handle_key(key(KeyCode::Char('q')), &mut focus).unwrap();
        assert!(result.is_consumed());
        assert!(!matches!(result, EventResult::Event(_)));
        assert_eq!(stack.visible(), Some(DialogKind::Confirm));
    }

    #[test]
    fn test_one_password_resumes_every_operation() {
        let (mut stack, mut focus) = stack();
        password(&mut stack, &mut focus, "curl");
        password(&mut stack, &mut focus, "git");
        assert_eq!(focus.current(), &FocusTarget::PasswordDialog);

        for c in "secret".chars() {
            stack.handle_key(key(KeyCode::Char(c)), &mut focus).unwrap();
        }
        let effect = take_effect(stack.handle_key(key(KeyCode::Enter), &mut focus).unwrap());
        let ops = operations(&effect);

        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| op.kind == OperationKind::UpdateOne));
        assert!(
            ops.iter()
                .all(|op| op.credential == Some(Credential::new("secret")))
        );
        assert_eq!(focus.current(), &FocusTarget::PackagesPane("apt".into()));
    }

    #[test]
    fn test_password_cleared_on_close() {
        let (mut stack, mut focus) = stack();
        password(&mut stack, &mut focus, "curl");
        stack.handle_key(key(KeyCode::Char('x')), &mut focus).unwrap();
        stack.handle_key(key(KeyCode::Esc), &mut focus).unwrap();

        assert_eq!(stack.password.value(), "");
        assert_eq!(stack.pending(), 0);
    }

    #[test]
    fn test_other_kind_waits_for_close() {
        let (mut stack, mut focus) = stack();
        confirm(&mut stack, &mut focus, "curl");
        password(&mut stack, &mut focus, "git");
        password(&mut stack, &mut focus, "vim");
        assert_eq!(stack.visible(), Some(DialogKind::Confirm));
        assert_eq!(stack.pending(), 1);

        stack.handle_key(key(KeyCode::Enter), &mut focus).unwrap();

        assert_eq!(stack.visible(), Some(DialogKind::Password));
        assert_eq!(stack.pending(), 2);
        assert_eq!(focus.current(), &FocusTarget::PasswordDialog);

        stack.handle_key(key(KeyCode::Esc), &mut focus).unwrap();
        assert_eq!(focus.current(), &FocusTarget::PackagesPane("apt".into()));
    }

    #[test]
    fn test_rebound_confirm_submits_password() {
        let mut keybindings = crate::config::keybindings::KeybindingsConfig::default();
        keybindings.dialog.confirm = crate::config::key::Key::new(KeyCode::Tab).into();
        let resolver = Arc::new(KeyResolver::new(Arc::new(keybindings)));
        let mut stack = ModalStack::new(Arc::clone(&resolver));
        let mut focus = FocusRouter::new();

        password(&mut stack, &mut focus, "curl");
        stack.handle_key(key(KeyCode::Char('s')), &mut focus).unwrap();
        assert!(stack.handle_key(key(KeyCode::Enter), &mut focus).unwrap().is_consumed());
        assert_eq!(stack.visible(), Some(DialogKind::Password));

        let effect = take_effect(stack.handle_key(key(KeyCode::Tab), &mut focus).unwrap());
        assert_eq!(operations(&effect)[0].credential, Some(Credential::new("s")));
        assert_eq!(stack.keybindings()[0].key, "tab");
    }
}
