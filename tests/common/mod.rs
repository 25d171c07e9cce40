//! Common test utilities for E2E tests
//!
//! `TestServer` runs the real router against a fake Clever, a small axum
//! app that answers the token, `/me` and roster endpoints.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use instant_birthdays::{AppState, config};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const DISTRICT_TOKEN: &str = "test-district-token";
pub const COOKIE_NAME: &str = "birthdays_session";

/// Authorization codes understood by the fake token endpoint
pub mod codes {
    pub const TEACHER: &str = "teacher-code";
    pub const STUDENT: &str = "student-code";
    pub const ADMIN: &str = "admin-code";
    pub const LONELY_TEACHER: &str = "lonely-teacher-code";
    pub const STUDENT_WITHOUT_DOB: &str = "student-without-dob-code";
    pub const BAD_ROSTER_TEACHER: &str = "bad-roster-teacher-code";
    /// Rejected with 401
    pub const REJECTED: &str = "bad";
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub clever_addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server with "today" pinned to 12/31
    pub async fn new() -> Self {
        Self::with_today("12/31").await
    }

    /// Create a new test server with "today" pinned to `today`
    pub async fn with_today(today: &str) -> Self {
        instant_birthdays::metrics::init_metrics();

        let clever_addr = spawn(fake_clever_router()).await;

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            clever: config::CleverConfig {
                client_id: CLIENT_ID.to_string(),
                client_secret: CLIENT_SECRET.to_string(),
                district_token: DISTRICT_TOKEN.to_string(),
                redirect_uri: "http://127.0.0.1/oauth".to_string(),
                authorize_url: format!("{clever_addr}/oauth/authorize"),
                token_url: format!("{clever_addr}/oauth/tokens"),
                api_base: clever_addr.clone(),
                api_version: "v1.1".to_string(),
                scope: "read:user_id read:sis".to_string(),
                roster_limit: config::MAX_ROSTER_LIMIT,
            },
            http: config::HttpConfig {
                timeout_seconds: 5,
                user_agent: "InstantBirthdays/test".to_string(),
            },
            session: config::SessionConfig {
                cookie_name: COOKIE_NAME.to_string(),
                idle_timeout_seconds: 3600,
                max_sessions: 100,
            },
            calendar: config::CalendarConfig {
                today_override: Some(today.to_string()),
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).unwrap();

        // Redirects are asserted on, never followed
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        let addr = spawn(instant_birthdays::build_router(state.clone())).await;

        Self {
            addr,
            clever_addr,
            state,
            client,
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Run the OAuth callback with `code` and return the `Cookie` header
    /// value for the new session
    pub async fn login(&self, code: &str) -> String {
        let response = self
            .client
            .get(self.url("/oauth"))
            .query(&[("code", code)])
            .send()
            .await
            .unwrap();

        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/app");
        session_cookie(&response).expect("callback sets the session cookie")
    }

    /// GET `path` with the given session cookie
    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header(header::COOKIE, cookie)
            .send()
            .await
            .unwrap()
    }
}

/// `Location` header of a redirect
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// `name=value` of the session cookie set by `response`, if any
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{COOKIE_NAME}=")))
        .map(str::to_string)
}

/// Login page URL carrying `message`
pub fn login_error_location(message: &str) -> String {
    format!("/?error={}", urlencoding::encode(message))
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

// =============================================================================
// Fake Clever
// =============================================================================

fn fake_clever_router() -> Router {
    Router::new()
        .route("/oauth/tokens", post(token))
        .route("/me", get(me))
        .route("/v1.1/teachers/:id/students", get(roster))
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    code: String,
    grant_type: String,
}

async fn token(headers: HeaderMap, Json(body): Json<TokenBody>) -> Response {
    let expected = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(format!("{CLIENT_ID}:{CLIENT_SECRET}"))
    );
    if authorization(&headers) != Some(expected.as_str())
        || body.grant_type != "authorization_code"
    {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let access_token = match body.code.as_str() {
        codes::TEACHER => "teacher-token",
        codes::STUDENT => "student-token",
        codes::ADMIN => "admin-token",
        codes::LONELY_TEACHER => "lonely-teacher-token",
        codes::STUDENT_WITHOUT_DOB => "student-without-dob-token",
        codes::BAD_ROSTER_TEACHER => "bad-roster-teacher-token",
        _ => return StatusCode::UNAUTHORIZED.into_response(),
    };

    Json(json!({ "access_token": access_token, "token_type": "bearer" })).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    let data = match authorization(&headers) {
        Some("Bearer teacher-token") => teacher("t-1", "Grace", "Hopper"),
        Some("Bearer lonely-teacher-token") => teacher("t-empty", "Alan", "Kay"),
        Some("Bearer bad-roster-teacher-token") => teacher("t-bad", "Niklaus", "Wirth"),
        Some("Bearer student-token") => json!({
            "id": "s-1",
            "name": { "first": "Ada", "last": "Lovelace" },
            "type": "student",
            "dob": "1998-06-18T00:00:00.000Z"
        }),
        Some("Bearer student-without-dob-token") => json!({
            "id": "s-2",
            "name": { "first": "Linus", "last": "Torvalds" },
            "type": "student"
        }),
        Some("Bearer admin-token") => json!({
            "id": "d-1",
            "name": { "first": "Dana", "last": "Admin" },
            "type": "district_admin"
        }),
        _ => return StatusCode::UNAUTHORIZED.into_response(),
    };

    Json(json!({ "data": data })).into_response()
}

#[derive(Debug, Deserialize)]
struct RosterQuery {
    limit: Option<u32>,
}

async fn roster(
    headers: HeaderMap,
    Path(teacher_id): Path<String>,
    Query(query): Query<RosterQuery>,
) -> Response {
    let expected = format!("Bearer {DISTRICT_TOKEN}");
    if authorization(&headers) != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if query.limit != Some(config::MAX_ROSTER_LIMIT) {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let students: Vec<Value> = match teacher_id.as_str() {
        "t-1" => vec![
            student("s-10", "Ada", "Lovelace", "12/31/2005"),
            student("s-11", "Barbara", "Liskov", "6/18/2005"),
            student("s-12", "Edsger", "Dijkstra", "06/18/2006"),
            student("s-13", "Alan", "Turing", "1/5/2006"),
            student("s-14", "Grace", "O'Brien & <Sons>", "3/1/2005"),
        ],
        "t-bad" => vec![
            student("s-20", "Ken", "Thompson", "2/3/2005"),
            student("s-21", "Dennis", "Ritchie", "not-a-date"),
        ],
        "t-empty" => Vec::new(),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };

    Json(json!({ "data": students })).into_response()
}

fn teacher(id: &str, first: &str, last: &str) -> Value {
    json!({
        "id": id,
        "name": { "first": first, "last": last },
        "type": "teacher"
    })
}

fn student(id: &str, first: &str, last: &str, dob: &str) -> Value {
    json!({
        "data": {
            "id": id,
            "name": { "first": first, "last": last },
            "dob": dob
        }
    })
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}
