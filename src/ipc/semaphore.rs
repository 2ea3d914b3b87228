/*!
 * Named Semaphores
 * Binary POSIX semaphores reachable only through inherited handles
 */

use crate::core::errors::{Result, SysError};
use crate::core::limits::{SHARED_NAME_ATTEMPTS, SHARED_OBJECT_MODE};
use crate::core::names::{shared_name, NameSource};
use crate::monitoring::SyscallSpan;
use nix::errno::Errno;
use std::ffi::CString;
use std::ptr::NonNull;
use tracing::{debug, warn};

/// POSIX named semaphore whose name was removed right after creation
///
/// Only the creating process and processes it spawns afterwards can reach it.
#[derive(Debug)]
pub struct NamedSemaphore {
    sem: NonNull<libc::sem_t>,
}

// SAFETY: POSIX semaphores may be used concurrently from any thread.
unsafe impl Send for NamedSemaphore {}
// SAFETY: see above; every operation goes through the thread-safe sem_* calls.
unsafe impl Sync for NamedSemaphore {}

impl NamedSemaphore {
    /// Create a semaphore with `initial` permits under a fresh name, then unlink the name
    pub fn create_unlinked(names: &dyn NameSource, initial: u32) -> Result<Self> {
        for _ in 0..SHARED_NAME_ATTEMPTS {
            let name = shared_name(names);
            let sem = match open_exclusive(&name, initial) {
                Ok(sem) => sem,
                Err(Errno::EEXIST) => {
                    debug!(name = %name, "semaphore name taken, retrying");
                    continue;
                }
                Err(errno) => return Err(errno.into()),
            };

            let semaphore = NamedSemaphore { sem };
            unlink(&name)?;
            debug!(name = %name, initial, "semaphore created and unlinked");
            return Ok(semaphore);
        }
        Err(Errno::EEXIST.into())
    }

    /// Take one permit, blocking until available
    ///
    /// There is no timeout: a holder that never releases blocks every other caller.
    pub fn acquire(&self) -> Result<SemaphoreGuard<'_>> {
        let span = SyscallSpan::blocking("sem_wait", crate::process::pid());
        // SAFETY: `sem` came from a successful sem_open and is not yet closed.
        let rc = unsafe { libc::sem_wait(self.sem.as_ptr()) };
        let result = Errno::result(rc);
        span.record_result(result.is_ok());
        result?;
        Ok(SemaphoreGuard {
            semaphore: self,
            held: true,
        })
    }

    fn post(&self) -> Result<()> {
        let span = SyscallSpan::new("sem_post", crate::process::pid());
        // SAFETY: `sem` came from a successful sem_open and is not yet closed.
        let rc = unsafe { libc::sem_post(self.sem.as_ptr()) };
        let result = Errno::result(rc);
        span.record_result(result.is_ok());
        result?;
        Ok(())
    }

    /// Close this process's handle, surfacing any error
    pub fn close(self) -> Result<()> {
        let sem = self.sem;
        std::mem::forget(self);
        close_raw(sem)
    }
}

impl Drop for NamedSemaphore {
    fn drop(&mut self) {
        if let Err(e) = close_raw(self.sem) {
            warn!(error = %e, "failed to close semaphore on drop");
        }
    }
}

/// One permit held on a `NamedSemaphore`; returned on `release` or drop
#[derive(Debug)]
#[must_use = "the permit is returned as soon as the guard is dropped"]
pub struct SemaphoreGuard<'a> {
    semaphore: &'a NamedSemaphore,
    held: bool,
}

impl SemaphoreGuard<'_> {
    /// Return the permit, surfacing any error
    pub fn release(mut self) -> Result<()> {
        self.held = false;
        self.semaphore.post()
    }
}

impl Drop for SemaphoreGuard<'_> {
    fn drop(&mut self) {
        if self.held {
            self.held = false;
            if let Err(e) = self.semaphore.post() {
                warn!(error = %e, "failed to release semaphore on drop");
            }
        }
    }
}

fn open_exclusive(name: &str, initial: u32) -> std::result::Result<NonNull<libc::sem_t>, Errno> {
    let c_name = CString::new(name).map_err(|_| Errno::EINVAL)?;
    // SAFETY: `c_name` is NUL-terminated; the variadic mode and value arguments are
    // passed with the promoted C types sem_open expects.
    let sem = unsafe {
        libc::sem_open(
            c_name.as_ptr(),
            libc::O_CREAT | libc::O_EXCL,
            SHARED_OBJECT_MODE as libc::c_uint,
            initial as libc::c_uint,
        )
    };
    if sem == libc::SEM_FAILED {
        return Err(Errno::last());
    }
    NonNull::new(sem).ok_or(Errno::EINVAL)
}

fn unlink(name: &str) -> Result<()> {
    let c_name = CString::new(name)
        .map_err(|_| SysError::InvalidArgument(format!("semaphore name {:?}", name)))?;
    // SAFETY: `c_name` is NUL-terminated.
    let rc = unsafe { libc::sem_unlink(c_name.as_ptr()) };
    Errno::result(rc)?;
    Ok(())
}

fn close_raw(sem: NonNull<libc::sem_t>) -> Result<()> {
    // SAFETY: callers pass each handle from sem_open exactly once.
    let rc = unsafe { libc::sem_close(sem.as_ptr()) };
    Errno::result(rc)?;
    Ok(())
}
