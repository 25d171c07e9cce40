//! Authenticated birthday view

use axum::{
    Router,
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
};

use crate::AppState;
use crate::auth::CurrentSession;
use crate::error::AppError;

/// Create app router
///
/// Routes:
/// - GET /app - Student or teacher dashboard
pub fn app_router() -> Router<AppState> {
    Router::new().route("/app", get(show_dashboard))
}

/// GET /app
///
/// # Steps
/// 1. Require a session (else back to login with "Please sign-in first.")
/// 2. Load the profile and, for teachers, the roster
/// 3. Remember the display name in the session
/// 4. Render the role's page
async fn show_dashboard(
    State(state): State<AppState>,
    CurrentSession { id, session }: CurrentSession,
) -> Result<impl IntoResponse, AppError> {
    let dashboard = state.dashboard.load(&session.access_token).await?;

    state
        .sessions
        .set_display_name(&id, dashboard.display_name().to_string())
        .await;

    Ok(Html(crate::views::dashboard_page(&dashboard)))
}
