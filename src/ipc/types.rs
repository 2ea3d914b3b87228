/*!
 * IPC Types
 * Counter value vocabulary and shared layouts
 */

use crate::core::types::Seconds;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Numeric types an `AtomicCounter` can hold
///
/// Values live in shared memory, so they must be plain `Copy` data.
pub trait CounterValue: Copy + Debug + PartialEq + Send + Sync + 'static {
    /// Default increment and default initial value
    fn one() -> Self;

    /// Sum, or `None` when it does not fit the type
    fn checked_add(self, delta: Self) -> Option<Self>;
}

impl CounterValue for f64 {
    fn one() -> Self {
        1.0
    }

    fn checked_add(self, delta: Self) -> Option<Self> {
        Some(self + delta)
    }
}

macro_rules! integer_counter_value {
    ($($t:ty),*) => {
        $(
            impl CounterValue for $t {
                fn one() -> Self {
                    1
                }

                fn checked_add(self, delta: Self) -> Option<Self> {
                    <$t>::checked_add(self, delta)
                }
            }
        )*
    };
}

integer_counter_value!(i32, i64, u32, u64);

/// Layout of a counter's shared memory region
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct CounterCell<T> {
    pub value: T,
    pub last_update: Seconds,
}

/// Consistent view of a counter, read under its semaphore
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterSnapshot<T> {
    pub value: T,
    /// Time of the last throttled increment; zero if none happened
    pub last_update: Seconds,
}
