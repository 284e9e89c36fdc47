use crossterm::event::KeyEvent;

use crate::backend::PackageUpdate;
use crate::effect::{Continuation, Effect};
use crate::model::ManagerId;

/// Events driving the dashboard. Every message is handled to completion
/// before the next one is taken from the queue.
#[derive(Debug, Clone)]
pub enum Message {
    Key(KeyEvent),
    Tick,
    Quit,

    // Focus requests
    FocusManagers,
    FocusPackages(ManagerId),
    ManagerSelected(ManagerId),

    // Dialogs
    ShowConfirm {
        message: String,
        on_confirm: Box<Effect>,
    },
    ShowPassword(Continuation),

    // Backend lifecycle
    RefreshStarted(ManagerId),
    RefreshFinished {
        manager: ManagerId,
        updates: Vec<PackageUpdate>,
    },
    UpdateStarted {
        manager: ManagerId,
        packages: Vec<String>,
    },
    /// Sent whether or not the update succeeded; failures are logged by the executor.
    UpdateFinished {
        manager: ManagerId,
        packages: Vec<String>,
    },
    /// The operation is parked until a password is entered; in-flight flags are cleared.
    OperationSuspended(Continuation),
    /// Update every pending package of a manager without asking again.
    UpdateAll(ManagerId),
}

impl Message {
    /// Ask for confirmation before running `on_confirm`.
    pub fn confirm(message: impl AsRef<str>, on_confirm: Effect) -> Self {
        Self::ShowConfirm {
            message: format!("Are you sure?\n{}", message.as_ref()),
            on_confirm: Box::new(on_confirm),
        }
    }
}
