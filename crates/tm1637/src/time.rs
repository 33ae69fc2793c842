use chrono::{NaiveTime, TimeDelta};
use embassy_time::Instant;

/// Local wall-clock time of day.
pub trait TimeSource {
    fn now(&self) -> NaiveTime;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> NaiveTime {
        T::now(self)
    }
}

/// Time of day kept by the monotonic system timer, starting from a known
/// time. Good enough for a board without an RTC or network.
pub struct UptimeClock {
    origin: NaiveTime,
    since: Instant,
}

impl UptimeClock {
    pub fn new(origin: NaiveTime) -> Self {
        Self::starting_at(origin, Instant::now())
    }

    pub fn starting_at(origin: NaiveTime, since: Instant) -> Self {
        Self { origin, since }
    }

    fn at(&self, now: Instant) -> NaiveTime {
        let elapsed = now.saturating_duration_since(self.since).as_millis();
        // NaiveTime wraps around midnight on overflowing addition
        self.origin + TimeDelta::milliseconds(elapsed as i64)
    }
}

impl TimeSource for UptimeClock {
    fn now(&self) -> NaiveTime {
        self.at(Instant::now())
    }
}
