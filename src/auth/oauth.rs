//! Clever Instant Login flow
//!
//! Implements the OAuth 2.0 authorization code flow with Clever.

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::metrics::LOGINS_TOTAL;

/// Create authentication router
///
/// Routes:
/// - GET / - Login page
/// - GET /oauth - OAuth callback
/// - GET /logout - Logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page))
        .route("/oauth", get(oauth_callback))
        .route("/logout", get(logout))
}

// =============================================================================
// Login Page
// =============================================================================

#[derive(Debug, Deserialize)]
struct LoginQuery {
    error: Option<String>,
}

/// GET /
///
/// Renders the login page with the Instant Login link and any error
/// passed back by a failed request.
async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> impl IntoResponse {
    Html(crate::views::login_page(
        state.clever.authorize_url(),
        query.error.as_deref(),
    ))
}

// =============================================================================
// OAuth Callback
// =============================================================================

/// Query parameters from the Clever redirect
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    /// Authorization code
    code: Option<String>,
    /// Set instead of `code` when the user or Clever aborted the login
    error: Option<String>,
}

/// GET /oauth
///
/// # Steps
/// 1. Reject `error=...` and missing codes
/// 2. Exchange code for access token
/// 3. Replace any previous session with a new one
/// 4. Set the session cookie and redirect to /app
async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(error) = query.error {
        LOGINS_TOTAL.with_label_values(&["denied"]).inc();
        return Err(AppError::AuthorizationDenied(error));
    }

    let code = query
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| {
            LOGINS_TOTAL.with_label_values(&["missing_code"]).inc();
            AppError::MissingCode
        })?;

    let access_token = state.clever.exchange_code(&code).await.inspect_err(|_| {
        LOGINS_TOTAL.with_label_values(&["failed"]).inc();
    })?;

    let cookie_name = state.config.session.cookie_name.clone();
    if let Some(previous) = jar.get(&cookie_name) {
        state.sessions.destroy(previous.value()).await;
    }

    let session_id = state.sessions.create(access_token).await;
    LOGINS_TOTAL.with_label_values(&["success"]).inc();
    tracing::info!("Instant Login completed");

    let cookie = build_session_cookie(
        cookie_name,
        session_id,
        state.config.should_use_secure_cookies(),
    );

    Ok((jar.add(cookie), Redirect::to("/app")))
}

// =============================================================================
// Logout
// =============================================================================

/// GET /logout
///
/// Destroys the server-side session, clears the cookie and redirects to
/// the login page.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let cookie_name = state.config.session.cookie_name.clone();

    if let Some(cookie) = jar.get(&cookie_name) {
        if state.sessions.destroy(cookie.value()).await {
            tracing::info!("Session destroyed on logout");
        }
    }

    (jar.add(clear_session_cookie(cookie_name)), Redirect::to("/"))
}

// =============================================================================
// Helpers
// =============================================================================

fn build_session_cookie(name: String, session_id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, session_id))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn clear_session_cookie(name: String) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, String::new()))
        .path("/")
        .http_only(true)
        .build();
    cookie.make_removal();
    cookie
}
