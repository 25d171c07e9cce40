//! Session extraction
//!
//! Protects routes that require a signed-in user.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::CookieJar;

use super::session::Session;
use crate::AppState;
use crate::error::AppError;

/// Session id from the session cookie, if any
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    jar.get(cookie_name)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

/// Extractor for the signed-in user's session
///
/// Rejects with `AppError::Unauthorized`, which sends the browser back to
/// the login page.
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentSession { session, .. }: CurrentSession) -> impl IntoResponse {
///     session.display_name.clone().unwrap_or_default()
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentSession {
    /// Opaque id stored in the cookie
    pub id: String,
    pub session: Arc<Session>,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(current) = parts.extensions.get::<CurrentSession>().cloned() {
            return Ok(current);
        }

        let state = AppState::from_ref(state);
        let id = session_id_from_headers(&parts.headers, &state.config.session.cookie_name)
            .ok_or(AppError::Unauthorized)?;
        let session = state
            .sessions
            .get(&id)
            .await
            .ok_or(AppError::Unauthorized)?;

        let current = CurrentSession { id, session };
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}
