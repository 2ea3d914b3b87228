/*!
 * System Limits and Constants
 *
 * Centralized location for limits, thresholds, and magic numbers.
 * Organized by domain.
 */

use std::time::Duration;

// =============================================================================
// SHARED OBJECT NAMING
// =============================================================================

/// Length of the random fragment used for shared memory and semaphore names
/// [LINUX-COMPAT] "/" + 32 characters stays under NAME_MAX for /dev/shm
pub const SHARED_NAME_LENGTH: usize = 32;

/// Lowest character of the name alphabet
pub const SHARED_NAME_MIN_CHAR: char = 'a';

/// Highest character of the name alphabet
pub const SHARED_NAME_MAX_CHAR: char = 'z';

/// Attempts to find an unused name before giving up on EEXIST
pub const SHARED_NAME_ATTEMPTS: usize = 4;

/// Permission bits for shared memory objects and named semaphores
pub const SHARED_OBJECT_MODE: u32 = 0o666;

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// Default read size
/// [LINUX-COMPAT] Matches glibc BUFSIZ
pub const BUFSIZ: usize = 8192;

/// Poll sets up to this size are passed to the kernel without heap allocation
/// [PERF]
pub const INLINE_POLL_ENTRIES: usize = 16;

// =============================================================================
// OBSERVABILITY
// =============================================================================

/// Calls that should return promptly but take longer than this are reported at warn level
pub const SLOW_SYSCALL_THRESHOLD: Duration = Duration::from_millis(10);
