//! Time source seam.
//!
//! Boards and the daily reset read "today" through [`Clock`] so that date
//! rollover logic can be driven from tests.

use chrono::{DateTime, Local, NaiveDate, Utc};

pub trait Clock {
    /// Current local calendar date.
    fn today(&self) -> NaiveDate;
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the host timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Pins `today` and uses its UTC midnight as `now`.
    pub fn on(today: NaiveDate) -> Self {
        let now = today.and_time(chrono::NaiveTime::MIN).and_utc();
        Self { today, now }
    }

    pub fn at(today: NaiveDate, now: DateTime<Utc>) -> Self {
        Self { today, now }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
