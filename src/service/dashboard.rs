//! Dashboard service
//!
//! Turns a signed-in user's token into what `/app` shows: a student's own
//! birthday, or a teacher's class grouped by birthday.

use std::sync::Arc;

use super::clock::Clock;
use crate::birthdays::{BirthdayGroups, DobError, DobFormat, MonthDay, UpcomingBirthday};
use crate::clever::{Directory, Role};
use crate::error::{AppError, UpstreamCall};

/// What a student sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentView {
    pub display_name: String,
    pub birthday: MonthDay,
}

/// What a teacher sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherView {
    pub display_name: String,
    pub today: MonthDay,
    pub groups: BirthdayGroups,
    /// Names of students whose birthday is today, empty if none
    pub birthdays_today: String,
    pub next_birthday: UpcomingBirthday,
}

/// Page model for `/app`, one variant per supported role
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dashboard {
    Student(StudentView),
    Teacher(TeacherView),
}

impl Dashboard {
    pub fn display_name(&self) -> &str {
        match self {
            Dashboard::Student(view) => &view.display_name,
            Dashboard::Teacher(view) => &view.display_name,
        }
    }
}

/// Dashboard service
pub struct DashboardService {
    directory: Arc<dyn Directory>,
    clock: Arc<dyn Clock>,
}

impl DashboardService {
    /// Create new dashboard service
    pub fn new(directory: Arc<dyn Directory>, clock: Arc<dyn Clock>) -> Self {
        Self { directory, clock }
    }

    /// Build the dashboard for the owner of `access_token`
    ///
    /// # Errors
    /// - Upstream failures from the profile or roster call
    /// - `UnsupportedRole` for anyone but students and teachers
    /// - `EmptyRoster` for a teacher without students
    /// - `MalformedRecord` for an unusable date of birth
    pub async fn load(&self, access_token: &str) -> Result<Dashboard, AppError> {
        let profile = self.directory.fetch_profile(access_token).await?;
        let display_name = profile.display_name();

        match profile.role {
            Role::Student => {
                let raw = profile.dob.as_deref().ok_or_else(|| {
                    AppError::malformed(UpstreamCall::Profile, "student has no dob")
                })?;
                let birthday = DobFormat::Timestamp.parse(raw).ok_or_else(|| {
                    AppError::malformed(
                        UpstreamCall::Profile,
                        format!("dob {raw:?} is not {}", DobFormat::Timestamp),
                    )
                })?;

                Ok(Dashboard::Student(StudentView {
                    display_name,
                    birthday,
                }))
            }
            Role::Teacher => self.teacher_view(&profile.id, display_name).await,
            Role::Unsupported(kind) => Err(AppError::UnsupportedRole(kind)),
        }
    }

    async fn teacher_view(
        &self,
        teacher_id: &str,
        display_name: String,
    ) -> Result<Dashboard, AppError> {
        let records = self.directory.fetch_roster(teacher_id).await?;
        if records.is_empty() {
            return Err(AppError::EmptyRoster);
        }

        let groups = BirthdayGroups::from_records(records, DobFormat::SlashDate)
            .map_err(|e: DobError| AppError::malformed(UpstreamCall::Roster, e.to_string()))?;

        let today = self.clock.today();
        let next_birthday = groups.next_birthday(today).ok_or(AppError::EmptyRoster)?;
        let birthdays_today = groups.students_on(today);

        tracing::info!(
            teacher_id,
            students = groups.len_students(),
            dates = groups.len_groups(),
            next = %next_birthday.date,
            "Teacher dashboard built"
        );

        Ok(Dashboard::Teacher(TeacherView {
            display_name,
            today,
            groups,
            birthdays_today,
            next_birthday,
        }))
    }
}
