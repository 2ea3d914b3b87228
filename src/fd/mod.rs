/*!
 * Descriptor Utilities
 * Pipes, descriptor duplication, bounded reads and writes, environment overrides
 */

pub mod env;
pub mod ops;
pub mod pipe;

// Re-export public API
pub use crate::core::limits::BUFSIZ;
pub use env::set_env;
pub use ops::{close, duplicate, read, write};
pub use pipe::{make_pipe, PipeEndpoints};

/// Standard input descriptor
pub const STDIN: crate::core::types::Fd = libc::STDIN_FILENO;

/// Standard output descriptor
pub const STDOUT: crate::core::types::Fd = libc::STDOUT_FILENO;

/// Standard error descriptor
pub const STDERR: crate::core::types::Fd = libc::STDERR_FILENO;
