//! Player session context: current position and time source.
//!
//! Queries read the position at call time; nothing in this library mutates
//! it on the caller's behalf. The explicit-position query variants thread
//! their coordinates through the request instead of writing them here, so
//! concurrent readers never observe a transient faked location.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A geographic position with altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// Time source for the snapshot cache.
///
/// Abstracted so tests can drive the cache window deterministically.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Shared session state for one client.
pub struct Session {
    position: RwLock<Position>,
    clock: Arc<dyn Clock>,
}

impl Session {
    /// Creates a session at the given coordinates with the system clock.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::with_clock(latitude, longitude, Arc::new(SystemClock))
    }

    /// Creates a session with an injected time source.
    pub fn with_clock(latitude: f64, longitude: f64, clock: Arc<dyn Clock>) -> Self {
        Self {
            position: RwLock::new(Position {
                latitude,
                longitude,
                altitude: 0.0,
            }),
            clock,
        }
    }

    /// Current position (copied out; the lock is not held).
    pub fn position(&self) -> Position {
        *self.position.read()
    }

    /// Moves the session to new coordinates.
    pub fn set_position(&self, latitude: f64, longitude: f64, altitude: f64) {
        *self.position.write() = Position {
            latitude,
            longitude,
            altitude,
        };
    }

    /// Current time in milliseconds since the Unix epoch.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}
