/*!
 * Readiness Multiplexer
 * Level-triggered `poll` over an ordered set of descriptors
 */

use super::types::{PollEntry, PollEvents};
use crate::core::errors::{Result, SysError};
use crate::core::limits::INLINE_POLL_ENTRIES;
use crate::core::types::Fd;
use crate::monitoring::SyscallSpan;
use nix::errno::Errno;
use smallvec::SmallVec;
use tracing::debug;

/// Wait until a descriptor in `entries` is ready or `timeout_ms` elapses
///
/// A negative timeout blocks indefinitely; zero returns at once. Every entry's
/// result mask is cleared first and filled in only when the returned count is
/// positive. A zero count means the timeout expired. On error no result mask is
/// trustworthy. An empty set acts as a plain timer.
pub fn poll(entries: &mut [PollEntry], timeout_ms: i32) -> Result<usize> {
    for entry in entries.iter_mut() {
        entry.revents = None;
    }

    let mut fds: SmallVec<[libc::pollfd; INLINE_POLL_ENTRIES]> = entries
        .iter()
        .map(|entry| libc::pollfd {
            fd: entry.fd,
            events: entry.events.bits(),
            revents: 0,
        })
        .collect();

    let nfds = libc::nfds_t::try_from(fds.len()).map_err(|_| {
        SysError::InvalidArgument(format!("{} descriptors exceed the poll limit", fds.len()))
    })?;

    let span = SyscallSpan::blocking("poll", crate::process::pid());
    // SAFETY: `fds` holds exactly `nfds` initialised pollfd records and outlives the call.
    let rc = unsafe { libc::poll(fds.as_mut_ptr(), nfds, timeout_ms) };
    let result = Errno::result(rc);
    span.record_result(result.is_ok());
    let ready = result? as usize;

    if ready > 0 {
        for (entry, raw) in entries.iter_mut().zip(fds.iter()) {
            entry.revents = Some(PollEvents::from_revents(raw.revents));
        }
    }

    debug!(nfds = fds.len(), timeout_ms, ready, "poll returned");
    Ok(ready)
}

/// Owned, ordered poll set
#[derive(Debug, Clone, Default)]
pub struct PollSet {
    entries: Vec<PollEntry>,
}

impl PollSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Watch `fd` for `events`, replacing the interest of an existing entry for `fd`
    pub fn add(&mut self, fd: Fd, events: PollEvents) -> &mut Self {
        match self.entries.iter_mut().find(|entry| entry.fd == fd) {
            Some(entry) => {
                entry.events = events;
                entry.revents = None;
            }
            None => self.entries.push(PollEntry::new(fd, events)),
        }
        self
    }

    /// Stop watching `fd`; returns whether it was present
    pub fn remove(&mut self, fd: Fd) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.fd != fd);
        self.entries.len() != before
    }

    /// Poll every entry; see [`poll`]
    pub fn poll(&mut self, timeout_ms: i32) -> Result<usize> {
        poll(&mut self.entries, timeout_ms)
    }

    /// Entries reporting at least one condition after the last poll
    pub fn ready(&self) -> impl Iterator<Item = &PollEntry> {
        self.entries.iter().filter(|entry| entry.is_ready())
    }

    /// Entry for `fd`, if watched
    pub fn get(&self, fd: Fd) -> Option<&PollEntry> {
        self.entries.iter().find(|entry| entry.fd == fd)
    }

    pub fn entries(&self) -> &[PollEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
