use std::sync::Mutex;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, Timelike, Utc};

use crate::model::Hour;

/// Source of "now" for start-time checks and the status sweep.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn current_hour(&self) -> Hour;
}

/// Wall clock at a fixed UTC offset (the centre's local time).
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Builds a clock from a whole-hour UTC offset. Out-of-range offsets fall back to UTC.
    pub fn with_offset_hours(hours: i32) -> Self {
        let offset = FixedOffset::east_opt(hours * 3600)
            .unwrap_or_else(|| Utc.fix());
        Self::new(offset)
    }

    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

impl Default for SystemClock {
    /// Hong Kong time (UTC+8).
    fn default() -> Self {
        Self::with_offset_hours(8)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn current_hour(&self) -> Hour {
        self.now().hour() as Hour
    }
}

/// Manually driven clock for tests and replays.
pub struct FixedClock {
    now: Mutex<(NaiveDate, Hour)>,
}

impl FixedClock {
    pub fn new(today: NaiveDate, hour: Hour) -> Self {
        Self {
            now: Mutex::new((today, hour)),
        }
    }

    pub fn set(&self, today: NaiveDate, hour: Hour) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = (today, hour);
    }

    pub fn set_hour(&self, hour: Hour) {
        self.now.lock().unwrap_or_else(|e| e.into_inner()).1 = hour;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now.lock().unwrap_or_else(|e| e.into_inner()).0
    }

    fn current_hour(&self) -> Hour {
        self.now.lock().unwrap_or_else(|e| e.into_inner()).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_what_was_set() {
        let d = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let clock = FixedClock::new(d, 10);
        assert_eq!(clock.today(), d);
        assert_eq!(clock.current_hour(), 10);

        clock.set_hour(15);
        assert_eq!(clock.current_hour(), 15);

        let next = d.succ_opt().unwrap();
        clock.set(next, 9);
        assert_eq!(clock.today(), next);
        assert_eq!(clock.current_hour(), 9);
    }

    #[test]
    fn system_clock_hour_in_range() {
        let clock = SystemClock::default();
        assert!(clock.current_hour() < 24);
    }

    #[test]
    fn bad_offset_falls_back_to_utc() {
        let clock = SystemClock::with_offset_hours(99);
        assert_eq!(clock.offset, FixedOffset::east_opt(0).unwrap());
    }
}
