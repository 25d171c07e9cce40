//! Birthday domain
//!
//! - `date`: month/day keys and date-of-birth parsing
//! - `groups`: grouping a roster by birthday and finding the next one

mod date;
mod groups;

pub use date::{DobFormat, InvalidMonthDay, MonthDay};
pub use groups::{BirthdayGroups, DobError, StudentEntry, StudentRecord, UpcomingBirthday};
