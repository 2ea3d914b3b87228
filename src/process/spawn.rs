/*!
 * Spawner
 * Process duplication with parent-death supervision
 *
 * ## Orphan race
 *
 * A child asks the kernel to signal it when its parent dies, but the request only
 * covers parents that die *after* it is installed. If the parent exits between
 * fork and installation the child is silently re-parented. The child therefore
 * compares its parent after installing the guard against the pid the parent had
 * before forking; a mismatch is reported as `SysError::OrphanRace`.
 */

use super::info::{parent_pid, pid};
use super::types::{ProcessHandle, Spawned};
use crate::core::errors::{Result, SysError};
use crate::core::types::Pid;
use nix::unistd::{fork, ForkResult};
use tracing::info;

/// Parent-liveness supervision installed in a freshly spawned child
pub trait ParentWatch {
    /// Request termination of the calling process when its parent dies
    fn arm(&self) -> Result<()>;

    /// Current parent of the calling process
    fn parent_pid(&self) -> Result<Pid>;
}

/// Supervision through the kernel parent-death signal (SIGHUP)
#[derive(Debug, Clone, Copy, Default)]
pub struct DeathSignal;

impl ParentWatch for DeathSignal {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn arm(&self) -> Result<()> {
        nix::sys::prctl::set_pdeathsig(nix::sys::signal::Signal::SIGHUP)?;
        Ok(())
    }

    // No parent-death signal here; the parent comparison still catches parents
    // that exited before the child got this far.
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn arm(&self) -> Result<()> {
        Ok(())
    }

    fn parent_pid(&self) -> Result<Pid> {
        parent_pid(None)
    }
}

/// Duplicate the calling process
///
/// The parent receives `Spawned::Parent` immediately. The child installs the
/// parent-death guard and verifies its parent before receiving `Spawned::Child`.
/// A child that gets `Err` must not continue; see [`exit_immediately`].
pub fn spawn() -> Result<Spawned> {
    spawn_watched(&DeathSignal)
}

/// [`spawn`] with a caller-supplied supervision strategy
pub fn spawn_watched(watch: &dyn ParentWatch) -> Result<Spawned> {
    let parent = pid();

    // SAFETY: the child branch performs only the guard installation and pid
    // comparison before returning to the caller, who is expected to exec or exit.
    match unsafe { fork() }? {
        ForkResult::Parent { child } => {
            info!(parent, child = child.as_raw(), "spawned child process");
            Ok(Spawned::Parent(ProcessHandle::new(child.as_raw())))
        }
        ForkResult::Child => {
            // No logging here: locks held by other parent threads at fork time stay held.
            watch.arm()?;
            verify_parent(parent, watch.parent_pid()?)?;
            Ok(Spawned::Child)
        }
    }
}

fn verify_parent(expected: Pid, observed: Pid) -> Result<()> {
    if expected != observed {
        return Err(SysError::OrphanRace { expected, observed });
    }
    Ok(())
}

/// Terminate the calling process at once, skipping destructors and exit handlers
///
/// The way out of a spawned child that failed to exec or lost its parent.
pub fn exit_immediately(code: i32) -> ! {
    // SAFETY: _exit never returns and touches no process state owned by Rust.
    unsafe { libc::_exit(code) }
}
