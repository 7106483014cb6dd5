use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use crate::core::message::MessageId;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Issues strictly increasing ids derived from creation time in
/// milliseconds; messages created within the same millisecond (or while the
/// clock stands still) get the next free value.
#[derive(Debug, Default)]
pub struct MessageIdSource {
    last: u64,
}

impl MessageIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, at: DateTime<Utc>) -> MessageId {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or(0);
        self.last = millis.max(self.last + 1);
        MessageId::new(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ids_are_time_derived_and_strictly_increasing() {
        let start = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        let clock = ManualClock::new(start);
        let mut ids = MessageIdSource::new();

        let first = ids.next(clock.now());
        let second = ids.next(clock.now());
        clock.advance(Duration::seconds(1));
        let third = ids.next(clock.now());

        assert_eq!(first.get(), 1_700_000_000_000);
        assert_eq!(second.get(), 1_700_000_000_001);
        assert_eq!(third.get(), 1_700_000_001_000);
    }

    #[test]
    fn clock_going_backwards_never_reuses_ids() {
        let mut ids = MessageIdSource::new();
        let later = Utc.timestamp_opt(2_000, 0).single().unwrap();
        let earlier = Utc.timestamp_opt(1_000, 0).single().unwrap();
        let a = ids.next(later);
        let b = ids.next(earlier);
        assert!(b > a);
    }

    #[test]
    fn pre_epoch_times_still_produce_ids() {
        let mut ids = MessageIdSource::new();
        let before_epoch = Utc.timestamp_opt(-5, 0).single().unwrap();
        assert_eq!(ids.next(before_epoch).get(), 1);
        assert_eq!(ids.next(before_epoch).get(), 2);
    }
}
