/*!
 * Process Types
 * Spawn results, process handles, and wait outcomes
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::Pid;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Result of duplicating the calling process
#[derive(Debug)]
#[must_use = "the child branch must exec or exit, the parent branch must wait"]
pub enum Spawned {
    /// Running in the original process; holds the new child
    Parent(ProcessHandle),
    /// Running in the new child process
    Child,
}

impl Spawned {
    pub fn is_child(&self) -> bool {
        matches!(self, Spawned::Child)
    }
}

/// How a waited-on process changed state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum WaitOutcome {
    /// Terminated normally with this exit code
    Exited(u8),
    /// Terminated by this signal
    Signaled(i32),
    /// Stopped by this signal; wait again for final disposition
    Stopped(i32),
    /// Resumed after a stop; wait again for final disposition
    Continued,
    /// Status word that matched none of the above
    Unknown(i32),
}

impl WaitOutcome {
    /// Decode a raw `waitpid` status word
    pub fn from_raw(status: i32) -> Self {
        if libc::WIFEXITED(status) {
            WaitOutcome::Exited(libc::WEXITSTATUS(status) as u8)
        } else if libc::WIFSIGNALED(status) {
            WaitOutcome::Signaled(libc::WTERMSIG(status))
        } else if libc::WIFSTOPPED(status) {
            WaitOutcome::Stopped(libc::WSTOPSIG(status))
        } else if libc::WIFCONTINUED(status) {
            WaitOutcome::Continued
        } else {
            WaitOutcome::Unknown(status)
        }
    }

    /// Only exit and death-by-signal end a process
    pub fn is_terminal(&self) -> bool {
        matches!(self, WaitOutcome::Exited(_) | WaitOutcome::Signaled(_))
    }

    /// Shell-style status: the exit code, or 128 + signal for signaled processes
    pub fn shell_code(&self) -> Option<i32> {
        match self {
            WaitOutcome::Exited(code) => Some(i32::from(*code)),
            WaitOutcome::Signaled(signal) => Some(128 + signal),
            _ => None,
        }
    }
}

impl std::fmt::Display for WaitOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitOutcome::Exited(code) => write!(f, "exited with code {}", code),
            WaitOutcome::Signaled(signal) => write!(f, "killed by signal {}", signal),
            WaitOutcome::Stopped(signal) => write!(f, "stopped by signal {}", signal),
            WaitOutcome::Continued => write!(f, "continued"),
            WaitOutcome::Unknown(status) => write!(f, "unknown status {:#x}", status),
        }
    }
}

bitflags! {
    /// Extra state changes `wait` should report besides termination
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WaitFlags: i32 {
        /// Report children stopped by a signal
        const UNTRACED = libc::WUNTRACED;
        /// Report stopped children resumed by SIGCONT
        const CONTINUED = libc::WCONTINUED;
    }
}

/// Handle to a spawned child process
///
/// Must be waited on until a terminal outcome so the child does not linger as a zombie.
#[derive(Debug)]
#[must_use = "a spawned child must be waited on"]
pub struct ProcessHandle {
    pid: Pid,
    reaped: bool,
}

impl ProcessHandle {
    pub(crate) fn new(pid: Pid) -> Self {
        Self { pid, reaped: false }
    }

    /// Adopt a child created elsewhere
    pub fn from_pid(pid: Pid) -> Self {
        Self::new(pid)
    }

    /// Process ID of the child
    #[inline]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Whether a terminal outcome has already been collected
    #[inline]
    pub fn is_reaped(&self) -> bool {
        self.reaped
    }

    /// Block until the child terminates
    pub fn wait(&mut self) -> Result<(Pid, WaitOutcome)> {
        self.wait_with(WaitFlags::empty())
    }

    /// Block until the child changes state as selected by `flags`
    pub fn wait_with(&mut self, flags: WaitFlags) -> Result<(Pid, WaitOutcome)> {
        if self.reaped {
            return Err(SysError::InvalidArgument(format!(
                "process {} has already been reaped",
                self.pid
            )));
        }
        let (pid, outcome) = super::wait::wait_with(self.pid, flags)?;
        if outcome.is_terminal() {
            self.reaped = true;
        }
        Ok((pid, outcome))
    }
}
