//! Desktop manager refresh
//!
//! After a position is written the desktop-icon manager has to reload to pick
//! it up. The process implementation stops the manager (blocking) and starts
//! it again detached. Exit codes are ignored.
//!
//! Every instance started here stays a child of this process, so it is kept
//! until it has exited and been reaped.

use std::process::{Child, Command, Stdio};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Request to the desktop-icon manager to reload its icon positions
pub trait ManagerRefresher {
    fn refresh(&mut self) -> Result<(), RefreshError>;
}

/// Restarts the manager by invoking its executable
#[derive(Debug)]
pub struct ProcessRefresher {
    program: String,
    quit_args: Vec<String>,
    started: Vec<Child>,
}

impl ProcessRefresher {
    pub fn new(program: impl Into<String>, quit_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            quit_args,
            started: Vec::new(),
        }
    }

    /// Collects the exit status of every started instance that has stopped
    fn reap_exited(&mut self) {
        self.started.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = child.id(), %status, "desktop manager instance reaped");
                false
            }
            Ok(None) => true,
            Err(err) => {
                debug!(pid = child.id(), "cannot poll desktop manager instance: {err}");
                false
            }
        });
    }

    fn spawn_err(&self) -> impl Fn(std::io::Error) -> RefreshError + '_ {
        |source| RefreshError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl ManagerRefresher for ProcessRefresher {
    fn refresh(&mut self) -> Result<(), RefreshError> {
        let status = Command::new(&self.program)
            .args(&self.quit_args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(self.spawn_err())?;
        debug!(program = %self.program, %status, "desktop manager stopped");
        self.reap_exited();

        let child = Command::new(&self.program)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(self.spawn_err())?;
        debug!(program = %self.program, pid = child.id(), "desktop manager started");
        self.started.push(child);

        Ok(())
    }
}
