use std::{fmt, ops};

use serde::{Deserialize, Serialize};
use time::{macros::datetime, Duration, OffsetDateTime};

pub const SECONDS_PER_DAY: f64 = 86_400.0;
/// Length of a Julian year in days.
pub const DAYS_PER_YEAR: f64 = 365.25;
/// Julian day of the Unix epoch.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
pub const J2000_JD: f64 = 2_451_545.0;

/// A point in simulated time, always in UTC.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SimDate(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl SimDate {
    /// 2000-01-01 12:00 UTC.
    pub const J2000: SimDate = SimDate(datetime!(2000-01-01 12:00 UTC));

    pub fn from_datetime(datetime: OffsetDateTime) -> Self {
        Self(datetime.to_offset(time::UtcOffset::UTC))
    }

    pub fn from_calendar_date(year: i32, month: time::Month, day: u8) -> Option<Self> {
        let date = time::Date::from_calendar_date(year, month, day).ok()?;
        Some(Self(date.midnight().assume_utc()))
    }

    /// `None` when the day falls outside the years `time` can represent.
    pub fn from_julian_day(jd: f64) -> Option<Self> {
        let seconds = Duration::checked_seconds_f64((jd - UNIX_EPOCH_JD) * SECONDS_PER_DAY)?;
        OffsetDateTime::UNIX_EPOCH.checked_add(seconds).map(Self)
    }

    /// Continuous (fractional) Julian day.
    pub fn julian_day(self) -> f64 {
        let since_unix = self.0 - OffsetDateTime::UNIX_EPOCH;
        UNIX_EPOCH_JD + since_unix.as_seconds_f64() / SECONDS_PER_DAY
    }

    pub fn days_since_j2000(self) -> f64 {
        (self - Self::J2000).as_seconds_f64() / SECONDS_PER_DAY
    }

    pub fn years_since_j2000(self) -> f64 {
        self.days_since_j2000() / DAYS_PER_YEAR
    }

    pub fn into_datetime(self) -> OffsetDateTime {
        self.0
    }

    pub fn checked_add(self, rhs: Duration) -> Option<SimDate> {
        self.0.checked_add(rhs).map(SimDate)
    }
}

impl ops::Sub<SimDate> for SimDate {
    type Output = Duration;

    fn sub(self, rhs: SimDate) -> Self::Output {
        self.0 - rhs.0
    }
}

impl ops::Sub<Duration> for SimDate {
    type Output = SimDate;

    fn sub(self, rhs: Duration) -> Self::Output {
        SimDate(self.0 - rhs)
    }
}

impl ops::Add<Duration> for SimDate {
    type Output = SimDate;

    fn add(self, rhs: Duration) -> Self::Output {
        SimDate(self.0 + rhs)
    }
}

impl fmt::Display for SimDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;
        write!(
            f,
            "{}-{:02}-{:02} {:02}:{:02}",
            d.year(),
            u8::from(d.month()),
            d.day(),
            d.hour(),
            d.minute()
        )
    }
}

impl fmt::Debug for SimDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimDate({self})")
    }
}

/// Drives the displayed date forward at an accelerated rate.
///
/// The date shown is always `baseline + elapsed * days_per_second`, where
/// `elapsed` is wall time since the baseline was last set. Picking a date
/// resets the baseline, everything else only moves it forward.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationClock {
    baseline: SimDate,
    elapsed: Duration,
    days_per_second: f64,
    date: SimDate,
}

impl SimulationClock {
    pub fn new(start: SimDate, days_per_second: f64) -> Self {
        Self {
            baseline: start,
            elapsed: Duration::ZERO,
            days_per_second,
            date: start,
        }
    }

    pub fn date(&self) -> SimDate {
        self.date
    }

    fn date_after(&self, elapsed: Duration) -> Option<SimDate> {
        let days = elapsed.as_seconds_f64() * self.days_per_second;
        let offset = Duration::checked_seconds_f64(days * SECONDS_PER_DAY)?;
        self.baseline.checked_add(offset)
    }

    pub fn baseline(&self) -> SimDate {
        self.baseline
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn days_per_second(&self) -> f64 {
        self.days_per_second
    }

    /// Advance by `wall` seconds of real time. Negative deltas are dropped
    /// so the displayed date never runs backwards.
    ///
    /// Returns `None`, and leaves the clock alone, when the new date would
    /// fall outside the representable range.
    pub fn tick(&mut self, wall: Duration) -> Option<SimDate> {
        if !wall.is_positive() {
            return Some(self.date);
        }
        let elapsed = self.elapsed.checked_add(wall)?;
        let date = self.date_after(elapsed)?;
        self.elapsed = elapsed;
        self.date = date;
        Some(date)
    }

    pub fn select(&mut self, date: SimDate) {
        self.baseline = date;
        self.elapsed = Duration::ZERO;
        self.date = date;
    }
}
