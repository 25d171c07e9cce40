//! Clever integration
//!
//! Handles:
//! - Instant Login (OAuth2 authorization code flow)
//! - `/me` profile lookups with the user's token
//! - Teacher roster lookups with the district token

mod client;
pub mod models;

use axum::async_trait;

pub use client::CleverClient;
pub use models::{Profile, Role};

use crate::birthdays::StudentRecord;
use crate::error::AppError;

/// Read access to people in the district
///
/// Implemented by `CleverClient`; tests substitute their own.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Profile of the user owning `access_token`
    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, AppError>;

    /// First page of a teacher's students
    async fn fetch_roster(&self, teacher_id: &str) -> Result<Vec<StudentRecord>, AppError>;
}
