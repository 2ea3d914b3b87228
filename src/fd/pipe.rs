/*!
 * Pipes
 * Connected read/write descriptor pairs
 */

use crate::core::errors::Result;
use crate::core::types::Fd;
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd};
use tracing::debug;

/// Both ends of a pipe, created together
///
/// The ends are owned: dropping the endpoints closes whichever ends are still held.
/// Closing one end never invalidates the other.
#[derive(Debug)]
pub struct PipeEndpoints {
    reader: OwnedFd,
    writer: OwnedFd,
}

impl PipeEndpoints {
    /// Raw descriptor of the read end
    #[inline]
    pub fn reader(&self) -> Fd {
        self.reader.as_raw_fd()
    }

    /// Raw descriptor of the write end
    #[inline]
    pub fn writer(&self) -> Fd {
        self.writer.as_raw_fd()
    }

    /// Split into owned ends so each side of a fork can drop the one it does not use
    pub fn split(self) -> (OwnedFd, OwnedFd) {
        (self.reader, self.writer)
    }

    /// Release ownership; the caller becomes responsible for closing both descriptors
    pub fn into_raw(self) -> (Fd, Fd) {
        (self.reader.into_raw_fd(), self.writer.into_raw_fd())
    }
}

/// Create a pipe
pub fn make_pipe() -> Result<PipeEndpoints> {
    let (reader, writer) = nix::unistd::pipe()?;
    debug!(
        reader = reader.as_raw_fd(),
        writer = writer.as_raw_fd(),
        "pipe created"
    );
    Ok(PipeEndpoints { reader, writer })
}
