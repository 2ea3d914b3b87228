/*!
 * Poll Module
 * Readiness multiplexing across descriptor sets
 */

pub mod multiplexer;
pub mod types;

// Re-export public API
pub use multiplexer::{poll, PollSet};
pub use types::{PollEntry, PollEvents};
