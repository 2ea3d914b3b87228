/*!
 * Descriptor Operations
 * close, dup2, and single bounded read/write over raw descriptors
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::Fd;
use std::os::fd::BorrowedFd;
use tracing::debug;

/// Close a raw descriptor
///
/// Often used on the unused pipe end in a spawned child, so it never logs.
pub fn close(fd: Fd) -> Result<()> {
    nix::unistd::close(fd)?;
    Ok(())
}

/// Make `new_fd` refer to the same open file as `old_fd`, closing `new_fd` first if open
///
/// Used to rewire a child's standard streams between spawn and exec, so it never logs.
pub fn duplicate(old_fd: Fd, new_fd: Fd) -> Result<()> {
    nix::unistd::dup2(old_fd, new_fd)?;
    Ok(())
}

/// Perform one `read` of at most `max_bytes`
///
/// Partial reads return fewer bytes; end-of-stream returns an empty buffer.
/// The buffer is released before any error is returned.
pub fn read(fd: Fd, max_bytes: usize) -> Result<Vec<u8>> {
    if max_bytes > isize::MAX as usize {
        return Err(SysError::InvalidArgument(format!(
            "read size {} exceeds the addressable range",
            max_bytes
        )));
    }

    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(max_bytes).map_err(|e| {
        SysError::ResourceExhausted(format!("read buffer of {} bytes: {}", max_bytes, e))
    })?;
    buf.resize(max_bytes, 0);

    let count = nix::unistd::read(fd, &mut buf)?;
    buf.truncate(count);
    debug!(fd, requested = max_bytes, read = count, "read completed");
    Ok(buf)
}

/// Perform one `write` of `data`, returning the number of bytes accepted
///
/// Safe to call in a spawned child before exec: it never logs.
pub fn write(fd: Fd, data: &[u8]) -> Result<usize> {
    if fd < 0 {
        return Err(SysError::from(nix::errno::Errno::EBADF));
    }
    // SAFETY: the descriptor is only borrowed for the duration of the call and a
    // closed descriptor is reported by the kernel as EBADF.
    let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
    let count = nix::unistd::write(borrowed, data)?;
    Ok(count)
}
