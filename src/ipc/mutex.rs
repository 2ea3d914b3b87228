/*!
 * Named Mutex
 * Cross-process critical sections over a binary semaphore
 */

use super::semaphore::NamedSemaphore;
use crate::core::errors::{Result, SysError};
use crate::core::names::{NameSource, RandomNames};
use tracing::info;

/// Mutual exclusion shared by the creating process and every process it spawns afterwards
///
/// Not reentrant: calling `with_lock` from inside its own body deadlocks.
#[derive(Debug)]
pub struct NamedMutex {
    semaphore: NamedSemaphore,
}

impl NamedMutex {
    pub fn create() -> Result<Self> {
        Self::create_with(&RandomNames)
    }

    /// Create with a caller-supplied name generator
    pub fn create_with(names: &dyn NameSource) -> Result<Self> {
        let semaphore = NamedSemaphore::create_unlinked(names, 1)?;
        info!("named mutex created");
        Ok(Self { semaphore })
    }

    /// Run `body` while holding the lock and pass its result through
    ///
    /// The lock is released whether `body` succeeds, fails or panics. A failure of
    /// `body` wins over a failure to release; a release failure after a successful
    /// body is returned as the error.
    pub fn with_lock<T, E, F>(&self, body: F) -> std::result::Result<T, E>
    where
        E: From<SysError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let guard = self.semaphore.acquire()?;
        let outcome = body();
        let released = guard.release();
        match outcome {
            Err(e) => Err(e),
            Ok(value) => {
                released?;
                Ok(value)
            }
        }
    }

    /// `with_lock` when a body is given; without one, returns `Ok(None)` and never locks
    pub fn with_lock_if<T, E, F>(&self, body: Option<F>) -> std::result::Result<Option<T>, E>
    where
        E: From<SysError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        match body {
            Some(body) => self.with_lock(body).map(Some),
            None => Ok(None),
        }
    }

    /// Close this process's handle, surfacing any error
    pub fn close(self) -> Result<()> {
        self.semaphore.close()
    }
}
