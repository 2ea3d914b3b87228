/*!
 * Process Module
 * Spawning, exec, reaping, and process queries
 */

pub mod exec;
pub mod info;
pub mod spawn;
pub mod types;
pub mod wait;

// Re-export for convenience
pub use exec::exec;
pub use info::{num_cores, parent_pid, pid, sleep};
pub use spawn::{exit_immediately, spawn, spawn_watched, DeathSignal, ParentWatch};
pub use types::{ProcessHandle, Spawned, WaitFlags, WaitOutcome};
pub use wait::{wait, wait_with};
