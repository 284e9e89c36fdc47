use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::backend::{Backend, BackendError, Credential, PackageUpdate};

const LIST_DELAY: Duration = Duration::from_millis(800);
const UPDATE_DELAY: Duration = Duration::from_millis(1200);

/// In-memory backend with canned packages, used for `--demo` and screenshots.
///
/// Updating a package removes it, so the next refresh shows it as done.
pub struct Demo {
    name: &'static str,
    packages: Mutex<Vec<PackageUpdate>>,
}

impl Demo {
    pub fn new(name: &'static str, packages: Vec<PackageUpdate>) -> Self {
        Self {
            name,
            packages: Mutex::new(packages),
        }
    }

    pub fn apt() -> Self {
        Self::new(
            "apt",
            vec![
                PackageUpdate::new("curl", "7.68.0", "7.85.0"),
                PackageUpdate::new("git", "2.25.1", "2.39.0"),
            ],
        )
    }

    pub fn homebrew() -> Self {
        Self::new(
            "homebrew",
            vec![
                PackageUpdate::new("node", "18.12.1", "20.5.0"),
                PackageUpdate::new("python", "3.10.4", "3.11.4"),
                PackageUpdate::new("ffmpeg", "5.1.2", "6.0"),
                PackageUpdate::new("terraform", "1.3.6", "1.5.4"),
                PackageUpdate::new("wget", "1.21.3", "1.21.4"),
            ],
        )
    }

    pub fn npm() -> Self {
        Self::new(
            "npm",
            vec![
                PackageUpdate::new("react", "17.0.2", "18.2.0"),
                PackageUpdate::new("express", "4.17.1", "4.18.2"),
                PackageUpdate::new("lodash", "4.17.20", "4.17.21"),
            ],
        )
    }

    fn remove(&self, names: &[&str]) {
        self.packages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|update| !names.contains(&update.name.as_str()));
    }
}

#[async_trait]
impl Backend for Demo {
    async fn list_updates(
        &self,
        _credential: Option<&Credential>,
    ) -> Result<Vec<PackageUpdate>, BackendError> {
        tokio::time::sleep(LIST_DELAY).await;
        Ok(self
            .packages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn apply_one(
        &self,
        package: &str,
        _credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        info!("[{}] updating {package}", self.name);
        tokio::time::sleep(UPDATE_DELAY).await;
        if !dry_run {
            self.remove(&[package]);
        }
        Ok(())
    }

    async fn apply_many(
        &self,
        packages: &[String],
        _credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        info!("[{}] updating {}", self.name, packages.join(" "));
        tokio::time::sleep(UPDATE_DELAY).await;
        if !dry_run {
            let names: Vec<&str> = packages.iter().map(String::as_str).collect();
            self.remove(&names);
        }
        Ok(())
    }

    async fn is_available(&self) -> bool {
        true
    }
}
