//! Descriptions of work the event loop schedules on behalf of components.
//!
//! Components never run backend calls themselves. They return [`Effect`]s,
//! which the [`EffectRunner`](crate::executor::EffectRunner) turns into
//! follow-up [`Message`]s.

use crate::backend::Credential;
use crate::message::Message;
use crate::model::ManagerId;

#[derive(Debug, Clone)]
pub enum Effect {
    /// Deliver a message right away.
    Emit(Message),
    /// Run members one after another; each completes before the next starts.
    Sequence(Vec<Effect>),
    /// Run members concurrently; their messages may interleave.
    Batch(Vec<Effect>),
    /// Call a backend off the event loop.
    Run(Operation),
}

impl Effect {
    pub const fn none() -> Self {
        Self::Batch(Vec::new())
    }

    pub fn is_none(&self) -> bool {
        match self {
            Self::Sequence(effects) | Self::Batch(effects) => effects.iter().all(Self::is_none),
            Self::Emit(_) | Self::Run(_) => false,
        }
    }

    /// Mark the manager as loading, then list its updates.
    pub fn refresh(manager: ManagerId) -> Self {
        Operation::refresh(manager).start()
    }

    /// Mark `package` as updating, then update it.
    pub fn update_one(manager: ManagerId, package: String) -> Self {
        Operation::update_one(manager, package).start()
    }

    /// Mark `packages` as updating, then update them in one backend call.
    pub fn update_many(manager: ManagerId, packages: Vec<String>) -> Self {
        Operation::update_many(manager, packages).start()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Refresh,
    UpdateOne,
    UpdateMany,
}

/// A single backend call, optionally carrying the credential it should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub manager: ManagerId,
    pub packages: Vec<String>,
    pub credential: Option<Credential>,
}

impl Operation {
    pub const fn refresh(manager: ManagerId) -> Self {
        Self {
            kind: OperationKind::Refresh,
            manager,
            packages: Vec::new(),
            credential: None,
        }
    }

    pub fn update_one(manager: ManagerId, package: String) -> Self {
        Self {
            kind: OperationKind::UpdateOne,
            manager,
            packages: vec![package],
            credential: None,
        }
    }

    pub const fn update_many(manager: ManagerId, packages: Vec<String>) -> Self {
        Self {
            kind: OperationKind::UpdateMany,
            manager,
            packages,
            credential: None,
        }
    }

    /// The message that marks this operation as in flight.
    pub fn started(&self) -> Message {
        match self.kind {
            OperationKind::Refresh => Message::RefreshStarted(self.manager.clone()),
            OperationKind::UpdateOne | OperationKind::UpdateMany => Message::UpdateStarted {
                manager: self.manager.clone(),
                packages: self.packages.clone(),
            },
        }
    }

    /// Emit the start message, then run the operation.
    pub fn start(self) -> Effect {
        Effect::Sequence(vec![Effect::Emit(self.started()), Effect::Run(self)])
    }

    /// Everything needed to re-issue this operation once a credential is known.
    pub fn continuation(&self) -> Continuation {
        Continuation {
            kind: self.kind,
            manager: self.manager.clone(),
            packages: self.packages.clone(),
        }
    }
}

/// An operation suspended until the password dialog returns a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub kind: OperationKind,
    pub manager: ManagerId,
    pub packages: Vec<String>,
}

impl Continuation {
    /// Re-issue the suspended operation with `credential`.
    pub fn resume(self, credential: Credential) -> Effect {
        Operation {
            kind: self.kind,
            manager: self.manager,
            packages: self.packages,
            credential: Some(credential),
        }
        .start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_carries_credential() {
        let suspended = Operation::update_one("apt".into(), "curl".to_string()).continuation();

        let Effect::Sequence(steps) = suspended.resume(Credential::new("secret")) else {
            panic!("resume should start the operation");
        };
        let [Effect::Emit(Message::UpdateStarted { packages, .. }), Effect::Run(op)] =
            steps.as_slice()
        else {
            panic!("unexpected steps: {steps:?}");
        };
        assert_eq!(packages, &vec!["curl".to_string()]);
        assert_eq!(op.kind, OperationKind::UpdateOne);
        assert_eq!(op.credential, Some(Credential::new("secret")));
    }

    #[test]
    fn test_none_is_empty() {
        assert!(Effect::none().is_none());
        assert!(Effect::Sequence(vec![Effect::none()]).is_none());
        assert!(!Effect::refresh("npm".into()).is_none());
    }
}
