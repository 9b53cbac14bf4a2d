//! Time-left derivation for active loans.
//!
//! Pure functions of wall-clock time and a stored due date; nothing here is
//! persisted and an expired loan is never returned automatically.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Time left until a loan is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Due in the future; each unit is the floor after removing larger units.
    Active {
        days: u64,
        hours: u64,
        minutes: u64,
        seconds: u64,
    },
    /// Due time reached or passed.
    Expired,
}

impl Countdown {
    /// True once the due time has been reached.
    #[must_use]
    pub fn is_expired(self) -> bool {
        matches!(self, Self::Expired)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active {
                days,
                hours,
                minutes,
                seconds,
            } => write!(f, "{days}d {hours}h {minutes}m {seconds}s"),
            Self::Expired => f.write_str("Expired"),
        }
    }
}

/// Splits the time between `now` and `due_at` into days/hours/minutes/seconds.
///
/// Sub-second remainders are dropped; anything at or below zero is
/// [`Countdown::Expired`].
#[must_use]
pub fn derive_countdown(now: DateTime<Utc>, due_at: DateTime<Utc>) -> Countdown {
    let remaining_ms = (due_at - now).num_milliseconds();
    let Ok(remaining) = u64::try_from(remaining_ms) else {
        return Countdown::Expired;
    };
    if remaining == 0 {
        return Countdown::Expired;
    }

    Countdown::Active {
        days: remaining / MS_PER_DAY,
        hours: (remaining % MS_PER_DAY) / MS_PER_HOUR,
        minutes: (remaining % MS_PER_HOUR) / MS_PER_MINUTE,
        seconds: (remaining % MS_PER_MINUTE) / MS_PER_SECOND,
    }
}

/// Instant a due date falls due: midnight UTC at the start of that date.
#[must_use]
pub fn due_instant(due: NaiveDate) -> DateTime<Utc> {
    due.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_one_of_each_unit() {
        let due = now() + Duration::milliseconds(90_061_000);
        assert_eq!(
            derive_countdown(now(), due),
            Countdown::Active {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1
            }
        );
    }

    #[test]
    fn test_past_due_is_expired() {
        let due = now() - Duration::milliseconds(1);
        assert_eq!(derive_countdown(now(), due), Countdown::Expired);
    }

    #[test]
    fn test_exactly_due_is_expired() {
        assert_eq!(derive_countdown(now(), now()), Countdown::Expired);
    }

    #[test]
    fn test_sub_second_remainder_is_floored() {
        let due = now() + Duration::milliseconds(999);
        assert_eq!(
            derive_countdown(now(), due),
            Countdown::Active {
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn test_units_roll_over() {
        let due = now() + Duration::days(6) + Duration::hours(23) + Duration::minutes(59)
            + Duration::seconds(59);
        assert_eq!(
            derive_countdown(now(), due),
            Countdown::Active {
                days: 6,
                hours: 23,
                minutes: 59,
                seconds: 59
            }
        );
    }

    #[test]
    fn test_display_formats() {
        let active = Countdown::Active {
            days: 2,
            hours: 3,
            minutes: 4,
            seconds: 5,
        };
        assert_eq!(active.to_string(), "2d 3h 4m 5s");
        assert_eq!(Countdown::Expired.to_string(), "Expired");
        assert!(Countdown::Expired.is_expired());
        assert!(!active.is_expired());
    }

    #[test]
    fn test_due_instant_is_utc_midnight() {
        let due = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();
        assert_eq!(
            due_instant(due),
            Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_due_today_is_expired_after_midnight() {
        let today = now().date_naive();
        assert!(derive_countdown(now(), due_instant(today)).is_expired());
    }
}
