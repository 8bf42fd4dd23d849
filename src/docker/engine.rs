//! The container runtime seam and its docker CLI implementation

use std::process::{Command, Stdio};

use tracing::debug;

use super::commands;
use crate::error::{Result, StackError};

/// Anything that can execute docker CLI argument lists.
///
/// Lifecycle code only talks to this trait, so it can be exercised without a
/// daemon.
pub trait ContainerRuntime {
    /// Run one docker invocation and return its stdout.
    fn exec(&self, args: &[String]) -> Result<String>;

    /// Verify that the daemon is reachable and return its version.
    fn ensure_available(&self) -> Result<String> {
        let version = self.exec(&commands::version()).map_err(|e| {
            StackError::Docker(format!("docker daemon is not reachable: {e}"))
        })?;
        Ok(version.trim().to_string())
    }
}

impl<T: ContainerRuntime + ?Sized> ContainerRuntime for &T {
    fn exec(&self, args: &[String]) -> Result<String> {
        (**self).exec(args)
    }
}

/// Shells out to the `docker` binary.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
}

impl DockerCli {
    pub fn new() -> Self {
        Self::with_binary("docker")
    }

    /// Use a different CLI, e.g. `podman`.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerRuntime for DockerCli {
    fn exec(&self, args: &[String]) -> Result<String> {
        debug!(command = %commands::display_command(args), "running");

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                StackError::Docker(format!(
                    "failed to invoke `{}`: is it installed and on PATH? ({})",
                    self.binary, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let verb = args.first().map(String::as_str).unwrap_or_default();
            return Err(StackError::Docker(format!(
                "`{} {}` failed ({}): {}",
                self.binary, verb, output.status, stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
