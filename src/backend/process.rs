//! Subprocess helpers shared by the command-line backends.

use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::info;

use crate::backend::{BackendError, Credential};

/// Output marker `sudo -S` prints when stdin held no usable password.
pub const SUDO_NO_PASSWORD: &str = "no password was provided";

/// Collected result of a finished command.
pub struct Outcome {
    pub status: ExitStatus,
    pub lines: Vec<String>,
}

impl Outcome {
    pub fn mentions(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

pub fn display(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command, forwarding every stdout/stderr line to the log as it arrives.
///
/// When `stdin` is given its value is written followed by a newline, which is
/// how `sudo -S` receives the password.
pub async fn stream(
    program: &str,
    args: &[String],
    stdin: Option<&str>,
) -> Result<Outcome, BackendError> {
    let command_line = display(program, args);
    info!("Running {command_line}");

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| BackendError::Spawn {
            command: command_line.clone(),
            source,
        })?;

    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        // sudo may exit without reading; a broken pipe here is not an error.
        let _ = pipe.write_all(format!("{input}\n").as_bytes()).await;
        drop(pipe);
    }

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (mut lines, err_lines) = tokio::join!(forward(stdout), forward(stderr));
    lines.extend(err_lines);

    let status = child.wait().await.map_err(|source| BackendError::Spawn {
        command: command_line,
        source,
    })?;

    Ok(Outcome { status, lines })
}

/// Run a command under `sudo -S`, mapping a missing password to
/// [`BackendError::CredentialRequired`].
pub async fn sudo(args: &[String], credential: Option<&Credential>) -> Result<(), BackendError> {
    let mut full = vec!["-S".to_string()];
    full.extend_from_slice(args);
    let outcome = stream("sudo", &full, Some(credential.map_or("", Credential::expose))).await?;

    if outcome.status.success() {
        return Ok(());
    }
    if outcome.mentions(SUDO_NO_PASSWORD) {
        return Err(BackendError::CredentialRequired);
    }
    Err(BackendError::Command {
        command: display("sudo", &full),
        status: outcome.status.to_string(),
    })
}

/// Run a command and fail on a non-zero exit status.
pub async fn checked(program: &str, args: &[String]) -> Result<(), BackendError> {
    let outcome = stream(program, args, None).await?;
    if outcome.status.success() {
        Ok(())
    } else {
        Err(BackendError::Command {
            command: display(program, args),
            status: outcome.status.to_string(),
        })
    }
}

/// Run a command quietly and return its stdout.
///
/// With `allow_failure` the output is returned even for a non-zero exit, for
/// tools that signal "updates available" through their exit code.
pub async fn capture(
    program: &str,
    args: &[String],
    allow_failure: bool,
) -> Result<String, BackendError> {
    let command_line = display(program, args);
    info!("Running {command_line}");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| BackendError::Spawn {
            command: command_line.clone(),
            source,
        })?;

    if !output.status.success() && !allow_failure {
        return Err(BackendError::Command {
            command: command_line,
            status: output.status.to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

async fn forward<R: AsyncRead + Unpin>(reader: Option<R>) -> Vec<String> {
    let Some(reader) = reader else {
        return Vec::new();
    };
    let mut collected = Vec::new();
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        info!("{line}");
        collected.push(line);
    }
    collected
}

pub fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_program_and_args() {
        assert_eq!(
            display("sudo", &args(["-S", "apt", "update"])),
            "sudo -S apt update"
        );
        assert_eq!(display("brew", &[]), "brew");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stream_collects_both_pipes() {
        let outcome = stream("sh", &args(["-c", "echo out; echo err 1>&2"]), None)
            .await
            .unwrap();
        assert!(outcome.status.success());
        assert!(outcome.mentions("out"));
        assert!(outcome.mentions("err"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_checked_reports_failure() {
        let err = checked("sh", &args(["-c", "exit 3"])).await.unwrap_err();
        assert!(matches!(err, BackendError::Command { .. }));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let err = capture("lazypkg-definitely-not-a-command", &[], false)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Spawn { .. }));
    }
}
