//! Invocation of operator-supplied up/down commands.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs the configured command when a host changes state.
///
/// Fire and forget: implementations must not block the monitor loop on
/// command completion, and command failures never reach the state
/// machine.
#[async_trait]
pub trait ActionRunner: Send + Sync {
    /// Invoke `command` for `host`.
    async fn run(&self, host: &str, command: &str);
}

/// Action runner that hands commands to `/bin/sh -c`
pub struct ShellRunner;

#[async_trait]
impl ActionRunner for ShellRunner {
    async fn run(&self, host: &str, command: &str) {
        debug!(host, command, "spawning action command");

        match Command::new("/bin/sh").arg("-c").arg(command).spawn() {
            Ok(mut child) => {
                // Reap the child off the monitor loop.
                let host = host.to_string();
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            debug!(host, %status, "action command exited with failure");
                        }
                        Err(e) => {
                            debug!(host, error = %e, "waiting on action command failed");
                        }
                        Ok(_) => {}
                    }
                });
            }
            Err(e) => {
                warn!(host, error = %e, "failed to spawn action command");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shell_runner_does_not_block() {
        let runner = ShellRunner;
        // Returns immediately even though the command sleeps.
        runner.run("example", "sleep 5 &").await;
        runner.run("example", "true").await;
    }
}
