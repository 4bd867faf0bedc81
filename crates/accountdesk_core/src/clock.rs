//! Time source for audit stamps, deletion markers and date validators.
//!
//! Timestamps are Unix epoch milliseconds (UTC); calendar dates are UTC days.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Supplies the current instant to mutating operations.
pub trait Clock {
    /// Current time in Unix epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Current calendar day.
    fn today(&self) -> NaiveDate;
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now_ms: i64,
}

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self { now_ms }
    }

    /// Clock frozen at midnight UTC of `day`.
    pub fn at_date(day: NaiveDate) -> Self {
        let midnight = day.and_time(NaiveTime::MIN).and_utc();
        Self::new(midnight.timestamp_millis())
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms
    }

    fn today(&self) -> NaiveDate {
        DateTime::<Utc>::from_timestamp_millis(self.now_ms)
            .map(|instant| instant.date_naive())
            .unwrap_or_default()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
