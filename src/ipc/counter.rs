/*!
 * Shared Atomic Counter
 * Cross-process counter with optional global throttling
 *
 * ## Throttling
 *
 * With a positive throttle interval, every increment waits until at least that
 * long has passed since the previous increment by *any* holder of the counter.
 * The wait happens while the semaphore is held, so throttled increments are
 * strictly serialized: the counter is a rate limiter for the whole process tree,
 * not for each caller.
 */

use super::region::SharedRegion;
use super::semaphore::NamedSemaphore;
use super::types::{CounterCell, CounterSnapshot, CounterValue};
use crate::core::clock::{Clock, SystemClock};
use crate::core::errors::{Result, SysError};
use crate::core::names::{NameSource, RandomNames};
use crate::core::types::Seconds;
use tracing::{debug, info};

/// Counter shared by the creating process and every process it spawns afterwards
pub struct AtomicCounter<T: CounterValue = f64> {
    region: SharedRegion<CounterCell<T>>,
    semaphore: NamedSemaphore,
    throttle: Seconds,
    clock: Box<dyn Clock>,
}

// SAFETY: every access to the shared cell happens while holding `semaphore`.
unsafe impl<T: CounterValue> Sync for AtomicCounter<T> {}

impl<T: CounterValue> AtomicCounter<T> {
    /// Create a counter holding `initial`; a positive `throttle` (seconds) enables throttling
    pub fn create(initial: T, throttle: Seconds) -> Result<Self> {
        Self::builder().initial(initial).throttle(throttle).build()
    }

    pub fn builder() -> AtomicCounterBuilder<T> {
        AtomicCounterBuilder::new()
    }

    /// Add one and return the value before the increment
    pub fn increment(&self) -> Result<T> {
        self.increment_by(T::one())
    }

    /// Add `delta` and return the value before the increment
    ///
    /// On overflow of an integer counter the value is left unchanged and
    /// `InvalidArgument` is returned.
    pub fn increment_by(&self, delta: T) -> Result<T> {
        let guard = self.semaphore.acquire()?;
        let updated = self.update_locked(delta);
        let released = guard.release();
        let previous = updated?;
        released?;
        Ok(previous)
    }

    fn update_locked(&self, delta: T) -> Result<T> {
        let mut cell = self.region.load();
        let previous = cell.value;
        let next = previous.checked_add(delta).ok_or_else(|| {
            SysError::InvalidArgument(format!("counter overflow: {:?} + {:?}", previous, delta))
        })?;

        if self.is_throttled() {
            let elapsed = self.clock.now() - cell.last_update;
            if elapsed < self.throttle {
                let wait = self.throttle - elapsed;
                debug!(wait_secs = wait, "throttling counter increment");
                self.clock.sleep(wait);
            }
            cell.last_update = self.clock.now();
        }

        cell.value = next;
        self.region.store(cell);
        Ok(previous)
    }

    /// Current value
    pub fn get(&self) -> Result<T> {
        Ok(self.snapshot()?.value)
    }

    /// Value and last-update time, read together
    pub fn snapshot(&self) -> Result<CounterSnapshot<T>> {
        let guard = self.semaphore.acquire()?;
        let cell = self.region.load();
        guard.release()?;
        Ok(CounterSnapshot {
            value: cell.value,
            last_update: cell.last_update,
        })
    }

    /// Minimum spacing between increments in seconds; non-positive means unthrottled
    pub fn throttle(&self) -> Seconds {
        self.throttle
    }

    pub fn is_throttled(&self) -> bool {
        self.throttle > 0.0
    }

    /// Unmap the region and close the semaphore in this process
    ///
    /// Not reference-counted: other processes keep their own handles. Dropping the
    /// counter releases the same resources but can only log failures.
    pub fn close(self) -> Result<()> {
        let AtomicCounter {
            region, semaphore, ..
        } = self;
        let unmapped = region.unmap();
        let closed = semaphore.close();
        unmapped.and(closed)?;
        debug!("atomic counter closed");
        Ok(())
    }
}

impl<T: CounterValue> std::fmt::Debug for AtomicCounter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicCounter")
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AtomicCounter`]
pub struct AtomicCounterBuilder<T: CounterValue> {
    initial: T,
    throttle: Seconds,
    clock: Option<Box<dyn Clock>>,
    names: Option<Box<dyn NameSource>>,
}

impl<T: CounterValue> AtomicCounterBuilder<T> {
    pub fn new() -> Self {
        Self {
            initial: T::one(),
            throttle: 0.0,
            clock: None,
            names: None,
        }
    }

    /// Starting value (default: one)
    pub fn initial(mut self, initial: T) -> Self {
        self.initial = initial;
        self
    }

    /// Minimum spacing between increments in seconds (default: unthrottled)
    pub fn throttle(mut self, throttle: Seconds) -> Self {
        self.throttle = throttle;
        self
    }

    /// Time source and sleep used for throttling (default: [`SystemClock`])
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// Generator for the backing object names (default: [`RandomNames`])
    pub fn names(mut self, names: impl NameSource + 'static) -> Self {
        self.names = Some(Box::new(names));
        self
    }

    pub fn build(self) -> Result<AtomicCounter<T>> {
        let names: Box<dyn NameSource> = self.names.unwrap_or_else(|| Box::new(RandomNames));
        let region = SharedRegion::create_unlinked(
            names.as_ref(),
            CounterCell {
                value: self.initial,
                last_update: 0.0,
            },
        )?;
        let semaphore = NamedSemaphore::create_unlinked(names.as_ref(), 1)?;

        info!(
            initial = ?self.initial,
            throttle_secs = self.throttle,
            "atomic counter created"
        );
        Ok(AtomicCounter {
            region,
            semaphore,
            throttle: self.throttle,
            clock: self.clock.unwrap_or_else(|| Box::new(SystemClock)),
        })
    }
}

impl<T: CounterValue> Default for AtomicCounterBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
