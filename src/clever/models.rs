//! Clever API wire types
//!
//! Responses are decoded into these records at the boundary; anything
//! missing or mistyped becomes `AppError::MalformedRecord` instead of a
//! failed lookup deeper in the handlers.

use serde::{Deserialize, Serialize};

use crate::birthdays::StudentRecord;

/// Body of the authorization-code exchange
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub code: &'a str,
    pub grant_type: &'static str,
    pub redirect_uri: &'a str,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// `{ "data": ... }` wrapper used by every API response
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

impl PersonName {
    /// "First Last"
    pub fn full(&self) -> String {
        format!("{} {}", self.first.trim(), self.last.trim())
            .trim()
            .to_string()
    }
}

/// Account type reported by `/me`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Role {
    Student,
    Teacher,
    /// Any other type (district admins, school admins, ...)
    Unsupported(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "student" => Role::Student,
            "teacher" => Role::Teacher,
            _ => Role::Unsupported(value),
        }
    }
}

/// `data` object of the `/me` response
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: PersonName,
    #[serde(rename = "type")]
    pub role: Role,
    /// Timestamp-formatted date of birth, present for students
    #[serde(default)]
    pub dob: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> String {
        self.name.full()
    }
}

/// Roster endpoint response
#[derive(Debug, Deserialize)]
pub struct RosterResponse {
    pub data: Vec<Envelope<RosterStudent>>,
}

/// One roster entry
#[derive(Debug, Clone, Deserialize)]
pub struct RosterStudent {
    pub id: String,
    pub name: PersonName,
    /// Slash-formatted date of birth (`6/18/1998`)
    #[serde(default)]
    pub dob: Option<String>,
}

impl From<RosterStudent> for StudentRecord {
    fn from(student: RosterStudent) -> Self {
        StudentRecord {
            name: student.name.full(),
            id: student.id,
            dob: student.dob,
        }
    }
}

impl RosterResponse {
    pub fn into_records(self) -> Vec<StudentRecord> {
        self.data
            .into_iter()
            .map(|entry| entry.data.into())
            .collect()
    }
}
