/*!
 * Shared Regions
 * Fixed-size POSIX shared memory mappings inherited across spawn
 */

use crate::core::errors::{Result, SysError};
use crate::core::limits::{SHARED_NAME_ATTEMPTS, SHARED_OBJECT_MODE};
use crate::core::names::{shared_name, NameSource};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use std::mem::size_of;
use std::num::NonZeroUsize;
use std::os::fd::OwnedFd;
use std::ptr::NonNull;
use tracing::{debug, warn};

/// Shared mapping holding one `T`, whose backing name was removed right after creation
///
/// The mapping survives `spawn`, so the creator and its descendants see the same
/// memory. Loads and stores are volatile but not synchronized: callers serialize
/// access themselves, normally with a `NamedSemaphore`.
#[derive(Debug)]
pub struct SharedRegion<T: Copy> {
    ptr: NonNull<T>,
}

// SAFETY: the region is plain shared memory; moving the handle between threads is fine.
unsafe impl<T: Copy + Send> Send for SharedRegion<T> {}

impl<T: Copy> SharedRegion<T> {
    /// Allocate a region under a fresh name, unlink the name, map it, and store `init`
    pub fn create_unlinked(names: &dyn NameSource, init: T) -> Result<Self> {
        let length = NonZeroUsize::new(size_of::<T>()).ok_or_else(|| {
            SysError::InvalidArgument("shared region type has zero size".to_string())
        })?;

        for _ in 0..SHARED_NAME_ATTEMPTS {
            let name = shared_name(names);
            let fd = match open_exclusive(&name) {
                Ok(fd) => fd,
                Err(Errno::EEXIST) => {
                    debug!(name = %name, "shared memory name taken, retrying");
                    continue;
                }
                Err(errno) => return Err(errno.into()),
            };
            shm_unlink(name.as_str())?;

            let size = libc::off_t::try_from(length.get()).map_err(|_| {
                SysError::InvalidArgument(format!("region of {} bytes", length.get()))
            })?;
            nix::unistd::ftruncate(&fd, size)?;

            // SAFETY: a fresh shared mapping of a descriptor we own, sized by ftruncate above.
            let addr = unsafe {
                mmap(
                    None,
                    length,
                    ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                    MapFlags::MAP_SHARED,
                    &fd,
                    0,
                )
            }?;
            // The mapping stays valid after the descriptor is closed.
            drop(fd);

            let region = SharedRegion {
                ptr: addr.cast::<T>(),
            };
            region.store(init);
            debug!(name = %name, bytes = length.get(), "shared region mapped and unlinked");
            return Ok(region);
        }
        Err(Errno::EEXIST.into())
    }

    /// Read the current contents
    pub fn load(&self) -> T {
        // SAFETY: `ptr` is a live, page-aligned mapping of at least size_of::<T>() bytes.
        unsafe { std::ptr::read_volatile(self.ptr.as_ptr()) }
    }

    /// Overwrite the contents
    pub fn store(&self, value: T) {
        // SAFETY: see `load`; the mapping is writable.
        unsafe { std::ptr::write_volatile(self.ptr.as_ptr(), value) }
    }

    /// Unmap this process's view, surfacing any error
    ///
    /// Other processes keep their own mappings.
    pub fn unmap(self) -> Result<()> {
        let ptr = self.ptr;
        std::mem::forget(self);
        unmap_raw(ptr)
    }
}

impl<T: Copy> Drop for SharedRegion<T> {
    fn drop(&mut self) {
        if let Err(e) = unmap_raw(self.ptr) {
            warn!(error = %e, "failed to unmap shared region on drop");
        }
    }
}

fn open_exclusive(name: &str) -> std::result::Result<OwnedFd, Errno> {
    shm_open(
        name,
        OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR,
        Mode::from_bits_truncate(SHARED_OBJECT_MODE as libc::mode_t),
    )
}

fn unmap_raw<T>(ptr: NonNull<T>) -> Result<()> {
    // SAFETY: each mapping is unmapped exactly once, with the length it was mapped with.
    unsafe { munmap(ptr.cast(), size_of::<T>()) }?;
    Ok(())
}
