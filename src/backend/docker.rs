use async_trait::async_trait;
use tracing::{info, warn};

use crate::backend::process::{self, args};
use crate::backend::{Backend, BackendError, Credential, PackageUpdate, command_exists};
use crate::executor::fan_out;

const SHORT_DIGEST_LEN: usize = 7;

/// Locally pulled `:latest` container images whose registry digest moved on.
///
/// Updating pulls every requested image concurrently; failures are collected
/// per image and reported together.
pub struct Docker;

impl Docker {
    async fn local_digest(image: &str) -> Option<String> {
        let format = "{{if .RepoDigests}}{{index .RepoDigests 0}}{{end}}";
        let output = process::capture(
            "docker",
            &args(["image", "inspect", "--format", format, image]),
            false,
        )
        .await
        .ok()?;
        let digest = output.trim();
        (!digest.is_empty()).then(|| digest.to_string())
    }

    async fn remote_digest(image: &str) -> Result<String, BackendError> {
        let output = process::capture(
            "docker",
            &args([
                "buildx",
                "imagetools",
                "inspect",
                image,
                "--format",
                "{{.Manifest.Digest}}",
            ]),
            false,
        )
        .await?;
        Ok(output.trim().to_string())
    }
}

#[async_trait]
impl Backend for Docker {
    async fn list_updates(
        &self,
        _credential: Option<&Credential>,
    ) -> Result<Vec<PackageUpdate>, BackendError> {
        let listing = process::capture(
            "docker",
            &args(["image", "ls", "--format", "{{.Repository}}:{{.Tag}}"]),
            false,
        )
        .await?;

        let mut updates = Vec::new();
        for image in listing.lines().map(str::trim) {
            if !image.ends_with(":latest") || image.starts_with("<none>") {
                continue;
            }
            // Images built locally have no repo digest and nothing to compare against.
            let Some(local) = Self::local_digest(image).await else {
                continue;
            };
            let remote = match Self::remote_digest(image).await {
                Ok(remote) => remote,
                Err(err) => {
                    warn!("Error getting manifest for image {image}: {err}");
                    continue;
                }
            };
            match diff_digests(image, &local, &remote) {
                Ok(Some(update)) => updates.push(update),
                Ok(None) => {}
                Err(err) => warn!("{err}"),
            }
        }
        Ok(updates)
    }

    async fn apply_one(
        &self,
        package: &str,
        credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        self.apply_many(&[package.to_string()], credential, dry_run)
            .await
    }

    async fn apply_many(
        &self,
        packages: &[String],
        _credential: Option<&Credential>,
        dry_run: bool,
    ) -> Result<(), BackendError> {
        fan_out(packages, |image| pull(image, dry_run)).await?;
        Ok(())
    }

    async fn is_available(&self) -> bool {
        command_exists("docker")
            && process::capture("docker", &args(["info"]), false)
                .await
                .is_ok()
    }

    async fn dispose(&self) {
        info!("Closed docker backend");
    }
}

async fn pull(image: String, dry_run: bool) -> Result<(), BackendError> {
    if dry_run {
        info!("[dry-run] Pulling image: {image}");
        return Ok(());
    }
    process::checked("docker", &args(["pull", image.as_str()])).await
}

/// Compare a local `repo@sha256:…` digest with a remote `sha256:…` digest.
///
/// Returns `None` when both point at the same manifest.
fn diff_digests(
    image: &str,
    local: &str,
    remote: &str,
) -> Result<Option<PackageUpdate>, BackendError> {
    let local_short = local
        .split_once("@sha256:")
        .map(|(_, hash)| hash)
        .and_then(short_hash)
        .ok_or_else(|| BackendError::Parse(format!("invalid local digest provided: {local}")))?;
    let remote_short = remote
        .strip_prefix("sha256:")
        .and_then(short_hash)
        .ok_or_else(|| BackendError::Parse(format!("invalid remote digest provided: {remote}")))?;

    if local_short == remote_short {
        return Ok(None);
    }
    Ok(Some(PackageUpdate::new(image, local_short, remote_short)))
}

fn short_hash(hash: &str) -> Option<&str> {
    let short = hash.get(..SHORT_DIGEST_LEN)?;
    short
        .chars()
        .all(|c| c.is_ascii_hexdigit())
        .then_some(short)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCAL: &str = "ghcr.io/open-telemetry/demo@sha256:bdc9d2a52e796649d74a8c2566897d7a45441a11bc6bc68b54a5c4c06c563eb5";

    #[test]
    fn test_diff_reports_moved_digest() {
        let remote = "sha256:51cff8aaa53c0af334e4cd8fce3e698a3d5114dbd530f983f62c8e0c41ad3f8a";
        assert_eq!(
            diff_digests("demo:latest", LOCAL, remote).unwrap(),
            Some(PackageUpdate::new("demo:latest", "bdc9d2a", "51cff8a"))
        );
    }

    #[test]
    fn test_diff_same_digest_is_up_to_date() {
        let remote = "sha256:bdc9d2a52e796649d74a8c2566897d7a45441a11bc6bc68b54a5c4c06c563eb5";
        assert_eq!(diff_digests("demo:latest", LOCAL, remote).unwrap(), None);
    }

    #[test]
    fn test_diff_rejects_malformed_digest() {
        assert!(diff_digests("demo:latest", "demo:latest", "sha256:abc").is_err());
    }

    #[tokio::test]
    async fn test_dry_run_pull_succeeds_without_docker() {
        let images = vec!["alpine:latest".to_string(), "redis:latest".to_string()];
        assert!(Docker.apply_many(&images, None, true).await.is_ok());
    }
}
