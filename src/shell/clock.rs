//! Wall-clock abstraction so `date`/`time` are testable without touching
//! `SystemTime::now()` directly (§10).

use std::cell::Cell;

use crate::error::{Error, Result};

pub trait Clock {
    /// Microseconds since the Unix epoch.
    fn now_micros(&self) -> i64;

    /// Set the clock's current time, for clocks that support it (`date -s`).
    /// The real system clock does not; it reports `Invalid`.
    fn set_micros(&self, _micros: i64) -> Result<()> {
        Err(Error::Invalid)
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_micros(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_micros() as i64).unwrap_or(0)
    }
}

/// A fixed, explicitly-advanceable clock for deterministic tests.
pub struct MockClock {
    micros: Cell<i64>,
}

impl MockClock {
    pub fn new(start_micros: i64) -> Self {
        MockClock { micros: Cell::new(start_micros) }
    }

    pub fn advance(&self, delta_micros: i64) {
        self.micros.set(self.micros.get() + delta_micros);
    }
}

impl Clock for MockClock {
    fn now_micros(&self) -> i64 {
        self.micros.get()
    }

    fn set_micros(&self, micros: i64) -> Result<()> {
        self.micros.set(micros);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_clock_advances_by_requested_delta() {
        let clock = MockClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now_micros(), 1_500);
    }

    #[test]
    fn mock_clock_set_micros_overrides_current_time() {
        let clock = MockClock::new(1_000);
        clock.set_micros(42).unwrap();
        assert_eq!(clock.now_micros(), 42);
    }

    #[test]
    fn system_clock_set_micros_is_unsupported() {
        assert_eq!(SystemClock.set_micros(0).unwrap_err(), Error::Invalid);
    }
}
