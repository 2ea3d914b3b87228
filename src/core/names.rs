/*!
 * Shared Object Names
 * Random name fragments for shared memory objects and named semaphores
 */

use super::limits::{SHARED_NAME_LENGTH, SHARED_NAME_MAX_CHAR, SHARED_NAME_MIN_CHAR};
use rand::Rng;

/// Generator of random name fragments
pub trait NameSource: Send + Sync {
    /// Produce a string of `len` characters, each within `min_char..=max_char`
    fn generate(&self, len: usize, min_char: char, max_char: char) -> String;
}

/// Name source backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNames;

impl NameSource for RandomNames {
    fn generate(&self, len: usize, min_char: char, max_char: char) -> String {
        let (lo, hi) = if min_char <= max_char {
            (min_char as u32, max_char as u32)
        } else {
            (max_char as u32, min_char as u32)
        };
        let mut rng = rand::thread_rng();
        (0..len)
            .map(|_| {
                let code = rng.gen_range(lo..=hi);
                char::from_u32(code).unwrap_or(min_char)
            })
            .collect()
    }
}

/// Generate a fresh `/<fragment>` name suitable for `shm_open` and `sem_open`
pub fn shared_name(source: &dyn NameSource) -> String {
    let fragment = source.generate(
        SHARED_NAME_LENGTH,
        SHARED_NAME_MIN_CHAR,
        SHARED_NAME_MAX_CHAR,
    );
    format!("/{}", fragment)
}
