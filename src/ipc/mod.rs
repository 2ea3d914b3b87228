/*!
 * IPC Module
 * Cross-process synchronization: shared counters and named mutexes
 */

pub mod counter;
pub mod mutex;
pub mod region;
pub mod semaphore;
pub mod types;

// Re-export for convenience
pub use counter::{AtomicCounter, AtomicCounterBuilder};
pub use mutex::NamedMutex;
pub use region::SharedRegion;
pub use semaphore::{NamedSemaphore, SemaphoreGuard};
pub use types::{CounterSnapshot, CounterValue};
