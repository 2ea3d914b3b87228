/*!
 * Process Queries
 * Side-effect-free lookups of process identity and host capacity
 */

use crate::core::clock::{Clock, SystemClock};
use crate::core::errors::{Result, SysError};
use crate::core::types::{Pid, Seconds};
use nix::errno::Errno;

/// Process ID of the caller
pub fn pid() -> Pid {
    nix::unistd::getpid().as_raw()
}

/// Parent process ID of `of`, or of the caller when `None`
///
/// Looking up another process reads `/proc/<pid>/status` and is Linux-only.
pub fn parent_pid(of: Option<Pid>) -> Result<Pid> {
    match of {
        None => Ok(nix::unistd::getppid().as_raw()),
        Some(target) if target == pid() => Ok(nix::unistd::getppid().as_raw()),
        Some(target) => foreign_parent_pid(target),
    }
}

#[cfg(target_os = "linux")]
fn foreign_parent_pid(target: Pid) -> Result<Pid> {
    if target <= 0 {
        return Err(SysError::InvalidArgument(format!("invalid pid {}", target)));
    }
    let status = std::fs::read_to_string(format!("/proc/{}/status", target))?;
    parse_ppid(&status).ok_or_else(|| {
        SysError::NotSupported(format!("/proc/{}/status has no PPid field", target))
    })
}

#[cfg(not(target_os = "linux"))]
fn foreign_parent_pid(target: Pid) -> Result<Pid> {
    Err(SysError::NotSupported(format!(
        "parent lookup for pid {} requires /proc",
        target
    )))
}

/// Extract the `PPid:` field from a `/proc/<pid>/status` document
pub(crate) fn parse_ppid(status: &str) -> Option<Pid> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("PPid:"))
        .and_then(|value| value.trim().parse().ok())
}

/// Number of processors currently online
pub fn num_cores() -> Result<usize> {
    // SAFETY: sysconf has no memory-safety preconditions.
    let cores = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if cores <= 0 {
        return Err(SysError::from(Errno::last()));
    }
    Ok(cores as usize)
}

/// Block the caller for `seconds`; fractional seconds are honoured
pub fn sleep(seconds: Seconds) {
    SystemClock.sleep(seconds);
}
