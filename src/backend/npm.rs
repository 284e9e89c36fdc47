use async_trait::async_trait;

use crate::backend::process::{self, args};
use crate::backend::{Backend, BackendError, Credential, PackageUpdate, command_exists};

/// Globally installed npm packages.
pub struct Npm;

impl Npm {
    fn update_args(packages: &[String], dry_run: bool) -> Vec<String> {
        let mut cmd = args(["update", "-g"]);
        if dry_run {
            cmd.push("--dry-run".to_string());
        }
        cmd.extend_from_slice(packages);
        cmd
    }
}

#[async_trait]
impl Backend for Npm {
    async fn list_updates(
        &self,
        _credential: Option<&Credential>,
    ) -> Result<Vec<PackageUpdate>, BackendError> {
        // `npm outdated` exits with 1 whenever something is outdated.
        let output = process::capture("npm", &args(["outdated", "-g"]), true).await?;
        Ok(output.lines().filter_map(parse_line).collect())
    }

    async fn apply_one(
        &self,
        package: &str,
        _credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        process::checked("npm", &Self::update_args(&[package.to_string()], dry_run)).await
    }

    async fn apply_many(
        &self,
        packages: &[String],
        _credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        process::checked("npm", &Self::update_args(packages, dry_run)).await
    }

    async fn is_available(&self) -> bool {
        command_exists("npm")
    }
}

/// Parse a row of `npm outdated -g`:
/// `Package Current Wanted Latest Location global`.
///
/// The wanted version is what `npm update` installs, so it is reported as the new one.
fn parse_line(line: &str) -> Option<PackageUpdate> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 || !fields[5..].contains(&"global") {
        return None;
    }
    Some(PackageUpdate::new(fields[0], fields[1], fields[2]))
}
