/*!
 * Poll Types
 * Event masks and poll set entries
 */

use crate::core::types::Fd;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Readiness conditions, used both for interest and for results
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct PollEvents: i16 {
        /// Data may be read without blocking
        const READABLE = libc::POLLIN;
        /// Urgent data may be read
        const PRIORITY_READABLE = libc::POLLPRI;
        /// Data may be written without blocking
        const WRITABLE = libc::POLLOUT;
        /// Error condition (result only)
        const ERROR = libc::POLLERR;
        /// Peer hung up (result only)
        const HANG_UP = libc::POLLHUP;
        /// Descriptor is not open (result only)
        const INVALID = libc::POLLNVAL;
    }
}

impl PollEvents {
    /// Keep only the bits of the portable vocabulary
    pub(crate) fn from_revents(raw: libc::c_short) -> Self {
        PollEvents::from_bits_truncate(raw)
    }
}

/// One descriptor in a poll set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollEntry {
    /// Descriptor to watch
    pub fd: Fd,
    /// Conditions of interest
    pub events: PollEvents,
    /// Conditions reported by the last poll that returned a positive count
    pub revents: Option<PollEvents>,
}

impl PollEntry {
    pub fn new(fd: Fd, events: PollEvents) -> Self {
        Self {
            fd,
            events,
            revents: None,
        }
    }

    /// Whether the last poll reported any condition on this descriptor
    pub fn is_ready(&self) -> bool {
        self.revents.map_or(false, |r| !r.is_empty())
    }

    /// Whether the last poll reported `event` on this descriptor
    pub fn has(&self, event: PollEvents) -> bool {
        self.revents.map_or(false, |r| r.contains(event))
    }
}
