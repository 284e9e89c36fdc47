//! Package-manager adapters.
//!
//! A [`Backend`] knows how to list and apply updates for one package manager.
//! The rest of the application only consumes this trait and the
//! [`BackendError::CredentialRequired`] signal; everything about command
//! syntax and output parsing stays inside the individual adapters.

mod apt;
mod demo;
mod docker;
mod gem;
mod homebrew;
#[cfg(test)]
pub mod mock;
mod npm;
mod process;

use std::fmt;

use async_trait::async_trait;

pub use apt::Apt;
pub use demo::Demo;
pub use docker::Docker;
pub use gem::Gem;
pub use homebrew::Homebrew;
pub use npm::Npm;

use crate::executor::BulkFailure;

/// One pending update reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUpdate {
    pub name: String,
    pub old_version: String,
    pub new_version: String,
}

impl PackageUpdate {
    pub fn new(
        name: impl Into<String>,
        old_version: impl Into<String>,
        new_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            old_version: old_version.into(),
            new_version: new_version.into(),
        }
    }
}

/// Secret supplied through the password dialog.
///
/// The value never shows up in `Debug` output, so messages carrying it can be
/// logged safely.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The operation needs elevated privileges; ask the user and retry.
    #[error("password is required")]
    CredentialRequired,

    #[error("`{command}` failed: {status}")]
    Command { command: String, status: String },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Bulk(#[from] BulkFailure),
}

/// Adapter for a single package manager.
///
/// Implementations are shared between the startup code and every running
/// operation, so they must be cheap to call concurrently.
#[async_trait]
pub trait Backend: Send + Sync {
    /// List the packages that have a newer version available.
    async fn list_updates(
        &self,
        credential: Option<&Credential>,
    ) -> Result<Vec<PackageUpdate>, BackendError>;

    /// Update a single package.
    async fn apply_one(
        &self,
        package: &str,
        credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError>;

    /// Update several packages in one go.
    async fn apply_many(
        &self,
        packages: &[String],
        credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError>;

    /// Whether the package manager exists on this host.
    async fn is_available(&self) -> bool;

    /// Release long-lived resources before the process exits.
    async fn dispose(&self) {}
}

/// Whether `program` can be found on `PATH`.
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}
