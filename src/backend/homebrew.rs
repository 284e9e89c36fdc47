use async_trait::async_trait;

use crate::backend::process::{self, args};
use crate::backend::{Backend, BackendError, Credential, PackageUpdate, command_exists};

pub struct Homebrew;

impl Homebrew {
    fn upgrade_args(packages: &[String], dry_run: bool) -> Vec<String> {
        let mut cmd = args(["upgrade"]);
        if dry_run {
            cmd.push("--dry-run".to_string());
        }
        cmd.extend_from_slice(packages);
        cmd
    }
}

#[async_trait]
impl Backend for Homebrew {
    async fn list_updates(
        &self,
        _credential: Option<&Credential>,
    ) -> Result<Vec<PackageUpdate>, BackendError> {
        process::capture("brew", &args(["update"]), false).await?;
        let output = process::capture("brew", &args(["outdated", "--verbose"]), false).await?;
        Ok(output.lines().filter_map(parse_line).collect())
    }

    async fn apply_one(
        &self,
        package: &str,
        _credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        process::checked("brew", &Self::upgrade_args(&[package.to_string()], dry_run)).await
    }

    async fn apply_many(
        &self,
        packages: &[String],
        _credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        process::checked("brew", &Self::upgrade_args(packages, dry_run)).await
    }

    async fn is_available(&self) -> bool {
        command_exists("brew")
    }
}

/// Parse `name (installed[, installed…]) < latest`.
fn parse_line(line: &str) -> Option<PackageUpdate> {
    let (name, rest) = line.trim().split_once(" (")?;
    let (installed, latest) = rest.split_once(") < ")?;
    let latest = latest.split_whitespace().next()?;
    if name.contains(char::is_whitespace) {
        return None;
    }
    Some(PackageUpdate::new(name, installed, latest))
}
