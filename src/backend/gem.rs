use async_trait::async_trait;
use tracing::info;

use crate::backend::process::{self, args};
use crate::backend::{Backend, BackendError, Credential, PackageUpdate, command_exists};

/// Ruby gems. `gem update` has no dry-run flag, so dry runs only log the command.
pub struct Gem;

impl Gem {
    async fn update(packages: &[String], dry_run: bool) -> Result<(), BackendError> {
        let mut cmd = args(["update"]);
        cmd.extend_from_slice(packages);
        if dry_run {
            info!("[dry-run] {}", process::display("gem", &cmd));
            return Ok(());
        }
        process::checked("gem", &cmd).await
    }
}

#[async_trait]
impl Backend for Gem {
    async fn list_updates(
        &self,
        _credential: Option<&Credential>,
    ) -> Result<Vec<PackageUpdate>, BackendError> {
        let output = process::capture("gem", &args(["outdated"]), false).await?;
        Ok(output.lines().filter_map(parse_line).collect())
    }

    async fn apply_one(
        &self,
        package: &str,
        _credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        Self::update(&[package.to_string()], dry_run).await
    }

    async fn apply_many(
        &self,
        packages: &[String],
        _credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        Self::update(packages, dry_run).await
    }

    async fn is_available(&self) -> bool {
        command_exists("gem")
    }
}

/// Parse `name (installed < latest)`.
fn parse_line(line: &str) -> Option<PackageUpdate> {
    let (name, rest) = line.trim().split_once(" (")?;
    let (installed, latest) = rest.trim_end_matches(')').split_once(" < ")?;
    Some(PackageUpdate::new(name, installed.trim(), latest.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outdated_row() {
        assert_eq!(
            parse_line("rake (13.0.6 < 13.2.1)"),
            Some(PackageUpdate::new("rake", "13.0.6", "13.2.1"))
        );
    }

    #[test]
    fn test_skip_unrelated_line() {
        assert_eq!(parse_line("Updating installed gems"), None);
    }
}
