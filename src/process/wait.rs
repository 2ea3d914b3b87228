/*!
 * Reaper
 * Blocking waits on child processes
 */

use super::types::{WaitFlags, WaitOutcome};
use crate::core::errors::Result;
use crate::core::types::Pid;
use crate::monitoring::SyscallSpan;
use nix::errno::Errno;
use tracing::debug;

/// Block until `pid` terminates
///
/// EINTR is returned to the caller rather than retried.
pub fn wait(pid: Pid) -> Result<(Pid, WaitOutcome)> {
    wait_with(pid, WaitFlags::empty())
}

/// Block until `pid` changes state as selected by `flags`
pub fn wait_with(pid: Pid, flags: WaitFlags) -> Result<(Pid, WaitOutcome)> {
    let span = SyscallSpan::blocking("waitpid", pid);
    let mut status: libc::c_int = 0;

    // The raw status word is kept so undecodable states can be reported verbatim.
    // SAFETY: `status` is a valid, writable c_int for the duration of the call.
    let rc = unsafe { libc::waitpid(pid, &mut status, flags.bits()) };
    let result = Errno::result(rc);
    span.record_result(result.is_ok());
    let waited = result?;

    let outcome = WaitOutcome::from_raw(status);
    debug!(pid = waited, ?outcome, "child changed state");
    Ok((waited, outcome))
}
