/*!
 * Core Types
 * Common types used across the crate
 */

/// OS process ID
pub type Pid = i32;

/// Raw file descriptor
pub type Fd = std::os::fd::RawFd;

/// Wall-clock seconds since the Unix epoch, fractional
pub type Seconds = f64;
