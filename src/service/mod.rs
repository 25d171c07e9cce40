//! Service layer
//!
//! Business logic between the HTTP handlers and the Clever client.

mod clock;
mod dashboard;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dashboard::{Dashboard, DashboardService, StudentView, TeacherView};
