//! Instant Birthdays - Clever Instant Login demo showing student birthdays
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Layer (Axum)                       │
//! │  - / (login), /oauth (callback), /logout                    │
//! │  - /app (birthday view)                                     │
//! │  - /health, /metrics                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Role dispatch (student / teacher)                        │
//! │  - Birthday grouping and next-birthday lookup               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Clever API + Sessions                       │
//! │  - OAuth token exchange, /me, teacher roster                │
//! │  - In-memory session store                                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers for the birthday view and metrics
//! - `auth`: Instant Login flow and sessions
//! - `birthdays`: Month/day keys, grouping, next birthday
//! - `clever`: Clever API client and wire types
//! - `service`: Dashboard logic
//! - `views`: HTML rendering
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod birthdays;
pub mod clever;
pub mod config;
pub mod error;
pub mod metrics;
pub mod service;
pub mod views;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Server-side sessions keyed by cookie
    pub sessions: Arc<auth::SessionStore>,

    /// Clever OAuth and API client
    pub clever: Arc<clever::CleverClient>,

    /// Builds the /app page
    pub dashboard: Arc<service::DashboardService>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Build the HTTP client with the configured timeout
    /// 2. Build the Clever client
    /// 3. Pick the clock (system date or `calendar.today_override`)
    /// 4. Create the session store
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Initialize HTTP client
        let http_client = reqwest::Client::builder()
            .user_agent(config.http.user_agent.as_str())
            .timeout(std::time::Duration::from_secs(config.http.timeout_seconds))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        // 2. Clever client
        let clever = Arc::new(clever::CleverClient::new(
            http_client,
            config.clever.clone(),
        )?);

        // 3. Clock
        let clock: Arc<dyn service::Clock> = match config.today_override()? {
            Some(today) => {
                tracing::warn!(%today, "Using fixed date from calendar.today_override");
                Arc::new(service::FixedClock(today))
            }
            None => Arc::new(service::SystemClock),
        };

        let dashboard = service::DashboardService::new(clever.clone(), clock);

        // 4. Sessions
        let sessions = auth::SessionStore::new(&config.session);

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            clever,
            dashboard: Arc::new(dashboard),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(auth::auth_router())
        .merge(api::app_router())
        .merge(api::metrics_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
