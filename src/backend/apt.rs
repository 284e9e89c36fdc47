use async_trait::async_trait;

use crate::backend::process::{self, args};
use crate::backend::{Backend, BackendError, Credential, PackageUpdate, command_exists};

/// Debian/Ubuntu system packages. Every mutating call goes through `sudo -S`.
pub struct Apt;

impl Apt {
    fn install_args(packages: &[String], dry_run: bool) -> Vec<String> {
        let mut cmd = args(["apt", "install", "--only-upgrade"]);
        if dry_run {
            cmd.push("--dry-run".to_string());
        }
        cmd.extend_from_slice(packages);
        cmd
    }
}

#[async_trait]
impl Backend for Apt {
    async fn list_updates(
        &self,
        credential: Option<&Credential>,
    ) -> Result<Vec<PackageUpdate>, BackendError> {
        process::sudo(&args(["apt", "update"]), credential).await?;
        let output = process::capture("apt", &args(["list", "--upgradable"]), false).await?;
        Ok(output.lines().filter_map(parse_line).collect())
    }

    async fn apply_one(
        &self,
        package: &str,
        credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        process::sudo(&Self::install_args(&[package.to_string()], dry_run), credential).await
    }

    async fn apply_many(
        &self,
        packages: &[String],
        credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        process::sudo(&Self::install_args(packages, dry_run), credential).await
    }

    async fn is_available(&self) -> bool {
        command_exists("apt")
    }
}

/// Parse one row of `apt list --upgradable`:
/// `name/suite new-version arch [upgradable from: old-version]`.
///
/// The bracketed part is localized, so the old version is taken as the first
/// bracketed word that contains a digit.
fn parse_line(line: &str) -> Option<PackageUpdate> {
    let (head, bracket) = line.split_once('[')?;
    let mut fields = head.split_whitespace();
    let (name, _suite) = fields.next()?.split_once('/')?;
    let new_version = fields.next()?;
    let _arch = fields.next()?;

    let old_version = bracket
        .trim_end()
        .trim_end_matches(']')
        .split_whitespace()
        .find(|word| word.chars().any(|c| c.is_ascii_digit()))?;

    Some(PackageUpdate::new(name, old_version, new_version))
}
