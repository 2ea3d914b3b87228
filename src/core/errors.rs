/*!
 * Error Types
 * Single error taxonomy for every primitive, with thiserror, miette, and serde support
 */

use crate::core::types::Pid;
use miette::Diagnostic;
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by descriptor, process, poll, and IPC primitives
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SysError {
    #[error("I/O error: {description} (errno {errno})")]
    #[diagnostic(
        code(procsync::io_error),
        help("A system call failed. The errno identifies the cause; EINTR may be retried by the caller.")
    )]
    Io { errno: i32, description: String },

    #[error("Resource exhausted: {0}")]
    #[diagnostic(
        code(procsync::resource_exhausted),
        help("The process could not allocate memory for this operation.")
    )]
    ResourceExhausted(String),

    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(procsync::invalid_argument),
        help("The value is outside the representable range for this operation.")
    )]
    InvalidArgument(String),

    #[error("Parent process {expected} exited before the parent-death signal was installed (parent is now {observed})")]
    #[diagnostic(
        code(procsync::orphan_race),
        help("The spawned child lost its supervisor during creation and must not continue.")
    )]
    OrphanRace { expected: Pid, observed: Pid },

    #[error("Not supported: {0}")]
    #[diagnostic(
        code(procsync::not_supported),
        help("This query is not available on the current platform.")
    )]
    NotSupported(String),
}

impl SysError {
    /// Build an I/O error from the calling thread's current errno
    pub fn last_os_error() -> Self {
        Errno::last().into()
    }

    /// The OS errno carried by this error, if any
    pub fn errno(&self) -> Option<i32> {
        match self {
            SysError::Io { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    /// Whether the failed call was interrupted by a signal
    pub fn is_interrupted(&self) -> bool {
        self.errno() == Some(Errno::EINTR as i32)
    }
}

impl From<Errno> for SysError {
    fn from(errno: Errno) -> Self {
        SysError::Io {
            errno: errno as i32,
            description: errno.desc().to_string(),
        }
    }
}

impl From<std::io::Error> for SysError {
    fn from(err: std::io::Error) -> Self {
        match err.raw_os_error() {
            Some(errno) => Errno::from_raw(errno).into(),
            None => SysError::Io {
                errno: 0,
                description: err.to_string(),
            },
        }
    }
}

/// Result type for all procsync operations
pub type Result<T> = std::result::Result<T, SysError>;
