//! Exclusive ownership of keyboard input.

use crate::model::ManagerId;

/// The single pane or dialog entitled to consume key input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    ManagersPane,
    PackagesPane(ManagerId),
    ConfirmDialog,
    PasswordDialog,
}

impl FocusTarget {
    pub const fn is_dialog(&self) -> bool {
        matches!(self, Self::ConfirmDialog | Self::PasswordDialog)
    }
}

/// Holds exactly one [`FocusTarget`].
///
/// Panes ask for focus through [`FocusRouter::request`], which is refused
/// while a dialog owns the input. Only the modal stack moves focus onto
/// and off a dialog, through [`FocusRouter::set_focus`].
#[derive(Debug)]
pub struct FocusRouter {
    current: FocusTarget,
}

impl FocusRouter {
    pub const fn new() -> Self {
        Self {
            current: FocusTarget::ManagersPane,
        }
    }

    pub const fn current(&self) -> &FocusTarget {
        &self.current
    }

    pub fn is_focused(&self, target: &FocusTarget) -> bool {
        &self.current == target
    }

    pub(crate) fn set_focus(&mut self, target: FocusTarget) {
        self.current = target;
    }

    /// Move focus between panes. Returns whether focus changed hands.
    pub fn request(&mut self, target: FocusTarget) -> bool {
        if self.current.is_dialog() || target.is_dialog() {
            return false;
        }
        self.current = target;
        true
    }
}

impl Default for FocusRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_managers() {
        let router = FocusRouter::new();
        assert!(router.is_focused(&FocusTarget::ManagersPane));
    }

    #[test]
    fn test_packages_panes_are_mutually_exclusive() {
        let mut router = FocusRouter::new();
        assert!(router.request(FocusTarget::PackagesPane("apt".into())));
        assert!(router.request(FocusTarget::PackagesPane("npm".into())));

        assert!(router.is_focused(&FocusTarget::PackagesPane("npm".into())));
        assert!(!router.is_focused(&FocusTarget::PackagesPane("apt".into())));
        assert!(!router.is_focused(&FocusTarget::ManagersPane));
    }

    #[test]
    fn test_requests_refused_while_dialog_open() {
        let mut router = FocusRouter::new();
        router.set_focus(FocusTarget::PasswordDialog);

        assert!(!router.request(FocusTarget::ManagersPane));
        assert_eq!(router.current(), &FocusTarget::PasswordDialog);
    }

    #[test]
    fn test_dialogs_cannot_be_requested() {
        let mut router = FocusRouter::new();
        assert!(!router.request(FocusTarget::ConfirmDialog));
        assert_eq!(router.current(), &FocusTarget::ManagersPane);
    }
}
