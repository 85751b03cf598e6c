//! Event countdown: whole days, hours and minutes until a target instant.

use chrono::{DateTime, Utc};

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Time left until an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Countdown {
    /// The event is still ahead.
    Remaining {
        /// Whole days.
        days: i64,
        /// Whole hours after the days, in [0, 24).
        hours: i64,
        /// Whole minutes after the hours, in [0, 60).
        minutes: i64,
    },
    /// The target is now or in the past.
    Reached,
}

impl Countdown {
    /// Countdown from `now` to `target`. Each unit is floored.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let diff = target.timestamp_millis() - now.timestamp_millis();
        if diff <= 0 {
            return Countdown::Reached;
        }
        Countdown::Remaining {
            days: diff / MS_PER_DAY,
            hours: (diff % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (diff % MS_PER_HOUR) / MS_PER_MINUTE,
        }
    }

    /// `(days, hours, minutes)`, all zero once reached.
    pub fn parts(&self) -> (i64, i64, i64) {
        match *self {
            Countdown::Remaining {
                days,
                hours,
                minutes,
            } => (days, hours, minutes),
            Countdown::Reached => (0, 0, 0),
        }
    }
}

/// Countdown bound to one event, refreshed by the host's interval timer.
#[derive(Clone, Debug)]
pub struct CountdownTimer {
    target: DateTime<Utc>,
    current: Countdown,
}

impl CountdownTimer {
    /// Refresh period the host should drive [`tick`](Self::tick) at.
    pub const REFRESH: std::time::Duration = std::time::Duration::from_secs(1);

    /// Start counting down to `target`.
    pub fn new(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            target,
            current: Countdown::until(target, now),
        }
    }

    /// Event time.
    pub fn target(&self) -> DateTime<Utc> {
        self.target
    }

    /// Last computed countdown.
    pub fn current(&self) -> Countdown {
        self.current
    }

    /// Recompute at `now`. Returns `true` if the displayed value changed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let next = Countdown::until(self.target, now);
        let changed = next != self.current;
        self.current = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_remaining_parts() {
        let now = at(2025, 3, 1, 10, 0);
        let target = now + TimeDelta::days(3) + TimeDelta::hours(5) + TimeDelta::minutes(7);
        assert_eq!(
            Countdown::until(target, now),
            Countdown::Remaining {
                days: 3,
                hours: 5,
                minutes: 7
            }
        );
    }

    #[test]
    fn test_units_are_floored() {
        let now = at(2025, 3, 1, 10, 0);
        let target = now + TimeDelta::minutes(1) + TimeDelta::seconds(59);
        assert_eq!(Countdown::until(target, now).parts(), (0, 0, 1));
    }

    #[test]
    fn test_reached_at_and_after_target() {
        let target = at(2025, 8, 12, 21, 0);
        assert_eq!(Countdown::until(target, target), Countdown::Reached);
        assert_eq!(
            Countdown::until(target, target + TimeDelta::hours(1)),
            Countdown::Reached
        );
        assert_eq!(Countdown::Reached.parts(), (0, 0, 0));
    }

    #[test]
    fn test_timer_tick_reports_changes() {
        let now = at(2025, 8, 10, 21, 0);
        let target = at(2025, 8, 12, 21, 0);
        let mut timer = CountdownTimer::new(target, now);
        assert_eq!(timer.current().parts(), (2, 0, 0));
        assert!(timer.tick(now + TimeDelta::seconds(1)));
        assert_eq!(timer.current().parts(), (1, 23, 59));
        assert!(!timer.tick(now + TimeDelta::seconds(2)));
        assert!(timer.tick(now + TimeDelta::days(3)));
        assert_eq!(timer.current(), Countdown::Reached);
        assert_eq!(timer.target(), target);
    }
}
