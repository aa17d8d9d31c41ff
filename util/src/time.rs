//! General time utility functions and the monotonic clocks used to pace
//! sampling loops.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Below this many milliseconds to a deadline `MonoClock` spins rather than
/// sleeping, since the OS sleep granularity is coarser than a sampling tick.
const SPIN_THRESHOLD_MS: u64 = 2;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A monotonic millisecond clock which can block until a deadline.
pub trait Clock {
    /// Milliseconds elapsed since the clock's epoch.
    fn now_ms(&self) -> u64;

    /// Block until `now_ms() >= deadline_ms`. Returns immediately if the
    /// deadline has already passed.
    fn wait_until(&mut self, deadline_ms: u64);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Clock backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonoClock {
    epoch: Instant,
}

/// Simulated clock which jumps straight to each deadline.
///
/// Delays can be queued with `inject_delay`, each one is added to the next
/// wait to imitate a loop which wakes late.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now_ms: u64,
    delays_ms: VecDeque<u64>,
    num_waits: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MonoClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for MonoClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonoClock {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn wait_until(&mut self, deadline_ms: u64) {
        loop {
            let now = self.now_ms();
            if now >= deadline_ms {
                break;
            }

            let remaining = deadline_ms - now;
            if remaining > SPIN_THRESHOLD_MS {
                std::thread::sleep(Duration::from_millis(remaining - SPIN_THRESHOLD_MS));
            }
            else {
                std::hint::spin_loop();
            }
        }
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next wait overshoot its deadline by `delay_ms`.
    pub fn inject_delay(&mut self, delay_ms: u64) {
        self.delays_ms.push_back(delay_ms);
    }

    /// Advance the clock without waiting on a deadline.
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    /// Number of times `wait_until` has been called.
    pub fn num_waits(&self) -> u64 {
        self.num_waits
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn wait_until(&mut self, deadline_ms: u64) {
        self.num_waits += 1;
        self.now_ms = self.now_ms.max(deadline_ms);
        if let Some(d) = self.delays_ms.pop_front() {
            self.now_ms += d;
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}
