//! External command execution
//!
//! Runs one shell command in a working directory and hands back its standard
//! output. Anything written to standard error counts as a failure, even when
//! the command exits successfully.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum ExecError {
    /// The command could not be started at all
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited with a non-zero status
    #[error("Command '{command}' exited with {status}: {}", .stderr.trim_end())]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The command wrote to its error stream
    #[error("Command '{command}' reported: {stderr}")]
    Stderr { command: String, stderr: String },
}

pub type ExecResult<T> = Result<T, ExecError>;

/// Run `command` through the platform shell inside `working_directory`.
///
/// No timeout is applied; a command that never exits stalls the caller.
pub async fn execute(command: &str, working_directory: impl AsRef<Path>) -> ExecResult<String> {
    let working_directory = working_directory.as_ref();
    tracing::debug!("Running '{}' in {}", command, working_directory.display());

    let output = shell(command)
        .current_dir(working_directory)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| ExecError::Spawn {
            command: command.to_string(),
            source,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(ExecError::Failed {
            command: command.to_string(),
            status: output.status,
            stderr,
        });
    }

    if !stderr.is_empty() {
        return Err(ExecError::Stderr {
            command: command.to_string(),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}
