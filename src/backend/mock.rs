use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::backend::{Backend, BackendError, Credential, PackageUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: &'static str,
    pub packages: Vec<String>,
    pub credential: Option<String>,
}

/// Scripted backend for tests. Records every call it receives.
#[derive(Default)]
pub struct MockBackend {
    updates: Mutex<Vec<PackageUpdate>>,
    password: Option<String>,
    password_for_list: bool,
    failure: Option<String>,
    unavailable: bool,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub fn new(updates: Vec<PackageUpdate>) -> Self {
        Self {
            updates: Mutex::new(updates),
            ..Self::default()
        }
    }

    /// Updates fail with `CredentialRequired` unless given `password`.
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_string());
        self
    }

    /// Listing needs the password too, like `sudo apt update`.
    pub const fn password_for_list(mut self) -> Self {
        self.password_for_list = true;
        self
    }

    pub fn failing(mut self, status: &str) -> Self {
        self.failure = Some(status.to_string());
        self
    }

    pub const fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check(
        &self,
        op: &'static str,
        packages: &[String],
        credential: Option<&Credential>,
    ) -> Result<(), BackendError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Call {
                op,
                packages: packages.to_vec(),
                credential: credential.map(|c| c.expose().to_string()),
            });

        if let Some(password) = &self.password
            && (op != "list" || self.password_for_list)
            && credential.map(Credential::expose) != Some(password.as_str())
        {
            return Err(BackendError::CredentialRequired);
        }
        if let Some(status) = &self.failure {
            return Err(BackendError::Command {
                command: op.to_string(),
                status: status.clone(),
            });
        }
        Ok(())
    }

    fn remove(&self, packages: &[String]) {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|update| !packages.contains(&update.name));
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn list_updates(
        &self,
        credential: Option<&Credential>,
    ) -> Result<Vec<PackageUpdate>, BackendError> {
        self.check("list", &[], credential)?;
        Ok(self
            .updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn apply_one(
        &self,
        package: &str,
        credential: Option<&Credential>,
        _dry_run: bool,
    ) -> Result<(), BackendError> {
        let packages = [package.to_string()];
        self.check("one", &packages, credential)?;
        self.remove(&packages);
        Ok(())
    }

    async fn apply_many(
        &self,
        packages: &[String],
        credential: Option<&Credential>,
        _dry_run: bool,
    ) -> Result<(), BackendError> {
        self.check("many", packages, credential)?;
        self.remove(packages);
        Ok(())
    }

    async fn is_available(&self) -> bool {
        !self.unavailable
    }
}
