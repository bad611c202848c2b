//! Execution of the per-version test script

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::matrix::error::ExecError;

/// One test command execution against one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub version: String,
    pub script: String,
    /// Variables added to the inherited environment
    pub env: Vec<(String, String)>,
}

/// Trait for running a test script and reporting its exit code
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run to completion; a non-zero exit code is a result, not an error
    async fn execute(&self, invocation: &Invocation) -> Result<i32, ExecError>;
}

/// Runs scripts with `bash -c`, streaming output to the terminal
pub struct ShellExecutor {
    shell: String,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new("bash")
    }
}

impl ShellExecutor {
    pub fn new(shell: &str) -> Self {
        Self {
            shell: shell.to_string(),
        }
    }
}

#[cfg(unix)]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: std::process::ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<i32, ExecError> {
        debug!("{} -c {}", self.shell, invocation.script);

        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(&invocation.script)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .await
            .map_err(|source| ExecError::Spawn {
                shell: self.shell.clone(),
                source,
            })?;

        Ok(exit_code(status))
    }
}
