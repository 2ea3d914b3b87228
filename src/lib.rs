/*!
 * procsync
 * Process control and cross-process synchronization for Unix
 */

pub mod core;
pub mod fd;
pub mod ipc;
pub mod monitoring;
pub mod poll;
pub mod process;

// Re-exports
pub use crate::core::{Clock, Fd, NameSource, Pid, Result, Seconds, SysError, SystemClock};
pub use fd::{close, duplicate, make_pipe, read, set_env, write, PipeEndpoints, BUFSIZ};
pub use ipc::{AtomicCounter, AtomicCounterBuilder, CounterSnapshot, CounterValue, NamedMutex};
pub use monitoring::init_tracing;
pub use poll::{poll, PollEntry, PollEvents, PollSet};
pub use process::{
    exec, num_cores, parent_pid, pid, sleep, spawn, wait, wait_with, ProcessHandle, Spawned,
    WaitFlags, WaitOutcome,
};
