//! Runs backend operations outside the event loop.
//!
//! [`Executor`] turns one [`Operation`] into the [`Effect`] that follows it;
//! [`EffectRunner`] drives effects on tokio tasks and feeds the resulting
//! messages back into the loop's channel.

mod bulk;

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

pub use bulk::{BulkFailure, fan_out};

use crate::backend::{Backend, BackendError, PackageUpdate};
use crate::effect::{Effect, Operation, OperationKind};
use crate::message::Message;
use crate::model::{ManagerEntry, ManagerId};

pub struct Executor {
    backends: HashMap<ManagerId, Arc<dyn Backend>>,
    dry_run: bool,
}

impl Executor {
    pub fn new(managers: &[ManagerEntry], dry_run: bool) -> Self {
        let backends = managers
            .iter()
            .map(|entry| (entry.id.clone(), Arc::clone(&entry.backend)))
            .collect();
        Self { backends, dry_run }
    }

    /// Call the backend and describe what happens next.
    ///
    /// A `CredentialRequired` answer to a call made without a credential
    /// suspends the operation and asks for a password. The same answer to a
    /// call that already carried one is final.
    pub async fn execute(&self, op: Operation) -> Effect {
        let Some(backend) = self.backends.get(&op.manager) else {
            error!("[{}] No such package manager", op.manager);
            return Effect::none();
        };
        let credential = op.credential.as_ref();

        match op.kind {
            OperationKind::Refresh => {
                let result = backend.list_updates(credential).await;
                Self::after_refresh(op, result)
            }
            OperationKind::UpdateOne => {
                let result = match op.packages.first() {
                    Some(package) => backend.apply_one(package, credential, self.dry_run).await,
                    None => Ok(()),
                };
                Self::after_update(op, result)
            }
            OperationKind::UpdateMany => {
                let result = backend
                    .apply_many(&op.packages, credential, self.dry_run)
                    .await;
                Self::after_update(op, result)
            }
        }
    }

    pub async fn dispose(&self) {
        for backend in self.backends.values() {
            backend.dispose().await;
        }
    }

    fn after_refresh(op: Operation, result: Result<Vec<PackageUpdate>, BackendError>) -> Effect {
        let updates = match result {
            Ok(updates) => {
                debug!("[{}] {} updates available", op.manager, updates.len());
                updates
            }
            Err(BackendError::CredentialRequired) if op.credential.is_none() => {
                return Self::suspend(&op);
            }
            Err(BackendError::CredentialRequired) => {
                error!("[{}] Error fetching packages: password was rejected", op.manager);
                Vec::new()
            }
            Err(err) => {
                error!("[{}] Error fetching packages: {err}", op.manager);
                Vec::new()
            }
        };
        Effect::Emit(Message::RefreshFinished {
            manager: op.manager,
            updates,
        })
    }

    fn after_update(op: Operation, result: Result<(), BackendError>) -> Effect {
        let reconcile = match result {
            Ok(()) => true,
            Err(BackendError::CredentialRequired) if op.credential.is_none() => {
                return Self::suspend(&op);
            }
            Err(BackendError::CredentialRequired) => {
                error!("[{}] Error updating packages: password was rejected", op.manager);
                false
            }
            Err(err) => {
                // Part of a bulk update may have gone through, so the list is re-read.
                error!("[{}] Error updating packages: {err}", op.manager);
                true
            }
        };

        let finished = Effect::Emit(Message::UpdateFinished {
            manager: op.manager.clone(),
            packages: op.packages,
        });
        if reconcile {
            Effect::Sequence(vec![finished, Effect::refresh(op.manager)])
        } else {
            finished
        }
    }

    fn suspend(op: &Operation) -> Effect {
        let continuation = op.continuation();
        Effect::Sequence(vec![
            Effect::Emit(Message::OperationSuspended(continuation.clone())),
            Effect::Emit(Message::ShowPassword(continuation)),
        ])
    }
}

/// Schedules effects and sends their messages to the event loop.
#[derive(Clone)]
pub struct EffectRunner {
    executor: Arc<Executor>,
    tx: UnboundedSender<Message>,
}

impl EffectRunner {
    pub const fn new(executor: Arc<Executor>, tx: UnboundedSender<Message>) -> Self {
        Self { executor, tx }
    }

    /// Immediate messages are queued right away, anything else runs on a task.
    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::Emit(message) => self.send(message),
            effect if effect.is_none() => {}
            effect => {
                let runner = self.clone();
                tokio::spawn(async move { runner.drive(effect).await });
            }
        }
    }

    fn drive(&self, effect: Effect) -> BoxFuture<'_, ()> {
        async move {
            match effect {
                Effect::Emit(message) => self.send(message),
                Effect::Sequence(effects) => {
                    for effect in effects {
                        self.drive(effect).await;
                    }
                }
                Effect::Batch(effects) => {
                    join_all(effects.into_iter().map(|effect| self.drive(effect))).await;
                }
                Effect::Run(op) => {
                    let next = self.executor.execute(op).await;
                    self.drive(next).await;
                }
            }
        }
        .boxed()
    }

    fn send(&self, message: Message) {
        if self.tx.send(message).is_err() {
            debug!("Event loop closed, dropping message");
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::backend::Credential;
    use crate::backend::mock::MockBackend;

    fn executor(backend: MockBackend) -> (Executor, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let entry = ManagerEntry {
            id: "apt".into(),
            icon: 'a',
            backend: Arc::clone(&backend) as Arc<dyn Backend>,
        };
        (Executor::new(&[entry], false), backend)
    }

    fn curl() -> PackageUpdate {
        PackageUpdate::new("curl", "7.68.0", "7.85.0")
    }

    #[tokio::test]
    async fn test_failed_refresh_reports_no_updates() {
        let (executor, _) = executor(MockBackend::new(vec![curl()]).failing("exit status: 100"));

        let next = executor.execute(Operation::refresh("apt".into())).await;

        let Effect::Emit(Message::RefreshFinished { manager, updates }) = next else {
            panic!("unexpected effect: {next:?}");
        };
        assert_eq!(manager, ManagerId::from("apt"));
        assert!(updates.is_empty());
    }

    #[tokio::test]
    async fn test_credential_required_suspends_operation() {
        let (executor, _) = executor(MockBackend::new(vec![curl()]).with_password("secret"));
        let op = Operation::update_one("apt".into(), "curl".to_string());
        let expected = op.continuation();

        let next = executor.execute(op).await;

        let Effect::Sequence(steps) = next else {
            panic!("unexpected effect: {next:?}");
        };
        assert!(matches!(
            steps.as_slice(),
            [
                Effect::Emit(Message::OperationSuspended(a)),
                Effect::Emit(Message::ShowPassword(b)),
            ] if *a == expected && *b == expected
        ));
    }

    #[tokio::test]
    async fn test_rejected_credential_is_terminal() {
        let (executor, backend) = executor(MockBackend::new(vec![curl()]).with_password("secret"));
        let mut op = Operation::update_one("apt".into(), "curl".to_string());
        op.credential = Some(Credential::new("wrong"));

        let next = executor.execute(op).await;

        // Terminal: the pane is released but no refresh follows.
        assert!(matches!(next, Effect::Emit(Message::UpdateFinished { .. })));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_update_reconciles() {
        let (executor, _) = executor(MockBackend::new(vec![curl()]));

        let next = executor
            .execute(Operation::update_many("apt".into(), vec!["curl".to_string()]))
            .await;

        let Effect::Sequence(steps) = next else {
            panic!("unexpected effect: {next:?}");
        };
        assert!(matches!(
            &steps[0],
            Effect::Emit(Message::UpdateFinished { .. })
        ));
        assert!(matches!(&steps[1], Effect::Sequence(_)));
    }

    #[tokio::test]
    async fn test_failed_update_still_reconciles() {
        let (executor, _) = executor(MockBackend::new(vec![curl()]).failing("exit status: 1"));

        let next = executor
            .execute(Operation::update_one("apt".into(), "curl".to_string()))
            .await;

        let Effect::Sequence(steps) = next else {
            panic!("unexpected effect: {next:?}");
        };
        assert!(matches!(
            steps.as_slice(),
            [Effect::Emit(Message::UpdateFinished { .. }), Effect::Sequence(_)]
        ));
    }

    #[tokio::test]
    async fn test_refresh_needing_password_suspends() {
        let (executor, _) = executor(
            MockBackend::new(vec![curl()])
                .with_password("secret")
                .password_for_list(),
        );
        let op = Operation::refresh("apt".into());
        let expected = op.continuation();

        let next = executor.execute(op).await;

        let Effect::Sequence(steps) = next else {
            panic!("unexpected effect: {next:?}");
        };
        assert!(matches!(
            steps.as_slice(),
            [
                Effect::Emit(Message::OperationSuspended(a)),
                Effect::Emit(Message::ShowPassword(b)),
            ] if *a == expected && *b == expected && a.kind == OperationKind::Refresh
        ));
    }

    #[tokio::test]
    async fn test_rejected_refresh_credential_reports_no_updates() {
        let (executor, backend) = executor(
            MockBackend::new(vec![curl()])
                .with_password("secret")
                .password_for_list(),
        );
        let mut op = Operation::refresh("apt".into());
        op.credential = Some(Credential::new("wrong"));

        let next = executor.execute(op).await;

        let Effect::Emit(Message::RefreshFinished { updates, .. }) = next else {
            panic!("unexpected effect: {next:?}");
        };
        assert!(updates.is_empty());
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_manager_is_ignored() {
        let (executor, _) = executor(MockBackend::default());
        assert!(
            executor
                .execute(Operation::refresh("pacman".into()))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_runner_preserves_sequence_order() {
        let (executor, _) = executor(MockBackend::new(vec![curl()]));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = EffectRunner::new(Arc::new(executor), tx);

        runner.run(Effect::update_one("apt".into(), "curl".to_string()));

        let mut kinds = Vec::new();
        while kinds.len() < 4 {
            let message = rx.recv().await.unwrap();
            kinds.push(match message {
                Message::UpdateStarted { .. } => "update-started",
                Message::UpdateFinished { .. } => "update-finished",
                Message::RefreshStarted(_) => "refresh-started",
                Message::RefreshFinished { updates, .. } => {
                    assert!(updates.is_empty());
                    "refresh-finished"
                }
                other => panic!("unexpected message: {other:?}"),
            });
        }
        assert_eq!(
            kinds,
            ["update-started", "update-finished", "refresh-started", "refresh-finished"]
        );
    }
}
