/*!
 * Core Module
 * Fundamental types, limits, error handling, and external collaborators
 */

pub mod clock;
pub mod errors;
pub mod limits;
pub mod names;
pub mod types;

// Re-export for convenience
pub use clock::{Clock, SystemClock};
pub use errors::{Result, SysError};
pub use names::{shared_name, NameSource, RandomNames};
pub use types::*;
