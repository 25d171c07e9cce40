//! Birthday grouping and next-birthday lookup

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::date::{DobFormat, MonthDay};

/// One student as read from upstream, date of birth still raw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub dob: Option<String>,
}

/// A student listed under a birthday
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct StudentEntry {
    pub id: String,
    pub name: String,
}

/// A record whose date of birth could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DobError {
    #[error("student {id} has no date of birth")]
    Missing { id: String },

    #[error("student {id} has date of birth {value:?}, expected {format}")]
    Unparsable {
        id: String,
        value: String,
        format: DobFormat,
    },
}

/// The soonest upcoming birthday and who shares it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingBirthday {
    pub date: MonthDay,
    /// Names joined with ", "
    pub names: String,
}

impl fmt::Display for UpcomingBirthday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.names, self.date)
    }
}

/// Students grouped by birthday, iterated in calendar order
///
/// No date ever maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BirthdayGroups {
    groups: BTreeMap<MonthDay, Vec<StudentEntry>>,
}

impl BirthdayGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group raw records by month/day of birth
    ///
    /// # Errors
    /// Fails on the first record with a missing or unparsable date of
    /// birth; records are never skipped.
    pub fn from_records<I>(records: I, format: DobFormat) -> Result<Self, DobError>
    where
        I: IntoIterator<Item = StudentRecord>,
    {
        let mut groups = Self::new();

        for record in records {
            let raw = record
                .dob
                .as_deref()
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| DobError::Missing {
                    id: record.id.clone(),
                })?;
            let date = format.parse(raw).ok_or_else(|| DobError::Unparsable {
                id: record.id.clone(),
                value: raw.to_string(),
                format,
            })?;

            groups.insert(
                date,
                StudentEntry {
                    id: record.id,
                    name: record.name,
                },
            );
        }

        Ok(groups)
    }

    /// Append a student to the group for `date`
    pub fn insert(&mut self, date: MonthDay, entry: StudentEntry) {
        self.groups.entry(date).or_default().push(entry);
    }

    /// Remove every entry with `id`, dropping groups left empty
    ///
    /// Returns whether anything was removed.
    pub fn remove_student(&mut self, id: &str) -> bool {
        let before = self.len_students();
        self.groups.retain(|_, entries| {
            entries.retain(|entry| entry.id != id);
            !entries.is_empty()
        });
        self.len_students() != before
    }

    pub fn get(&self, date: MonthDay) -> Option<&[StudentEntry]> {
        self.groups.get(&date).map(Vec::as_slice)
    }

    /// Names of students born on `date`, joined with ", "
    ///
    /// Empty when nobody has that birthday.
    pub fn students_on(&self, date: MonthDay) -> String {
        self.get(date).map(join_names).unwrap_or_default()
    }

    /// First birthday strictly after `today`, wrapping to the earliest
    /// date of the year when none is left
    ///
    /// A lone group on `today` is therefore its own next birthday.
    pub fn next_birthday(&self, today: MonthDay) -> Option<UpcomingBirthday> {
        use std::ops::Bound::{Excluded, Unbounded};

        let (date, entries) = self
            .groups
            .range((Excluded(today), Unbounded))
            .next()
            .or_else(|| self.groups.iter().next())?;

        Some(UpcomingBirthday {
            date: *date,
            names: join_names(entries),
        })
    }

    /// Groups in calendar order
    pub fn iter(&self) -> impl Iterator<Item = (MonthDay, &[StudentEntry])> {
        self.groups
            .iter()
            .map(|(date, entries)| (*date, entries.as_slice()))
    }

    /// Distinct birthdays in calendar order
    pub fn dates(&self) -> impl Iterator<Item = MonthDay> + '_ {
        self.groups.keys().copied()
    }

    pub fn len_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn len_students(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn join_names(entries: &[StudentEntry]) -> String {
    entries
        .iter()
        .map(|entry| entry.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
