//! Source of "today"

use chrono::Local;

use crate::birthdays::MonthDay;

/// Supplies today's month/day
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn today(&self) -> MonthDay;
}

/// Server-local calendar date
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> MonthDay {
        MonthDay::from_date(Local::now().date_naive())
    }
}

/// A clock stuck on one day, set through `calendar.today_override`
pub struct FixedClock(pub MonthDay);

impl Clock for FixedClock {
    fn today(&self) -> MonthDay {
        self.0
    }
}
