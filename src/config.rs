//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;

use crate::birthdays::MonthDay;

/// Largest page the roster endpoint serves in one request
pub const MAX_ROSTER_LIMIT: u32 = 200;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub clever: CleverConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
}

/// Clever Instant Login and API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CleverConfig {
    pub client_id: String,
    pub client_secret: String,
    /// District bearer token used for roster lookups
    pub district_token: String,
    /// Callback registered with Clever, e.g. "https://example.com/oauth"
    pub redirect_uri: String,
    /// Browser-facing authorization endpoint
    pub authorize_url: String,
    /// Server-to-server token endpoint
    pub token_url: String,
    /// API host, e.g. "https://api.clever.com"
    pub api_base: String,
    /// Versioned path segment for roster calls, e.g. "v1.1"
    pub api_version: String,
    /// Space separated OAuth scopes
    pub scope: String,
    /// Page size for the roster request (max 200)
    pub roster_limit: u32,
}

impl CleverConfig {
    /// Full URL of the roster endpoint for a teacher
    pub fn roster_url(&self, teacher_id: &str) -> String {
        format!(
            "{}/{}/teachers/{}/students",
            self.api_base.trim_end_matches('/'),
            self.api_version.trim_matches('/'),
            urlencoding::encode(teacher_id)
        )
    }

    /// Full URL of the profile endpoint
    pub fn profile_url(&self) -> String {
        format!("{}/me", self.api_base.trim_end_matches('/'))
    }
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds (default: 10)
    pub timeout_seconds: u64,
    pub user_agent: String,
}

/// Session cookie and store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Sessions unused for this long are dropped (default: 3600)
    pub idle_timeout_seconds: u64,
    /// Upper bound on concurrently stored sessions
    pub max_sessions: u64,
}

/// Calendar configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CalendarConfig {
    /// Pin "today" to a fixed month/day ("12/31") instead of the system date
    pub today_override: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (INSTANT_BIRTHDAYS__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("clever.authorize_url", "https://clever.com/oauth/authorize")?
            .set_default("clever.token_url", "https://clever.com/oauth/tokens")?
            .set_default("clever.api_base", "https://api.clever.com")?
            .set_default("clever.api_version", "v1.1")?
            .set_default("clever.scope", "read:user_id read:sis")?
            .set_default("clever.roster_limit", i64::from(MAX_ROSTER_LIMIT))?
            .set_default("http.timeout_seconds", 10)?
            .set_default("http.user_agent", "InstantBirthdays/0.1.0")?
            .set_default("session.cookie_name", "birthdays_session")?
            .set_default("session.idle_timeout_seconds", 3600)?
            .set_default("session.max_sessions", 10_000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("INSTANT_BIRTHDAYS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Session cookies are `Secure` whenever the callback is served over https
    pub fn should_use_secure_cookies(&self) -> bool {
        url::Url::parse(&self.clever.redirect_uri)
            .map(|url| url.scheme() == "https")
            .unwrap_or(true)
    }

    /// Parsed `calendar.today_override`
    pub fn today_override(&self) -> Result<Option<MonthDay>, crate::error::AppError> {
        self.calendar
            .today_override
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                value.parse::<MonthDay>().map_err(|e| {
                    crate::error::AppError::Config(format!(
                        "calendar.today_override is invalid: {e}"
                    ))
                })
            })
            .transpose()
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        let required = [
            ("clever.client_id", &self.clever.client_id),
            ("clever.client_secret", &self.clever.client_secret),
            ("clever.district_token", &self.clever.district_token),
            ("clever.redirect_uri", &self.clever.redirect_uri),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{key} is required")));
            }
        }

        for (key, value) in [
            ("clever.redirect_uri", &self.clever.redirect_uri),
            ("clever.authorize_url", &self.clever.authorize_url),
            ("clever.token_url", &self.clever.token_url),
            ("clever.api_base", &self.clever.api_base),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| AppError::Config(format!("{key} is not a valid URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::Config(format!("{key} must use http or https")));
            }
        }

        if self.clever.roster_limit == 0 || self.clever.roster_limit > MAX_ROSTER_LIMIT {
            return Err(AppError::Config(format!(
                "clever.roster_limit must be between 1 and {MAX_ROSTER_LIMIT}"
            )));
        }

        if self.http.timeout_seconds == 0 {
            return Err(AppError::Config(
                "http.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.session.idle_timeout_seconds == 0 {
            return Err(AppError::Config(
                "session.idle_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.session.cookie_name.trim().is_empty() {
            return Err(AppError::Config(
                "session.cookie_name must not be empty".to_string(),
            ));
        }

        self.today_override()?;

        if !self.should_use_secure_cookies() {
            tracing::warn!(
                redirect_uri = %self.clever.redirect_uri,
                "Using insecure session cookies for a plain http callback"
            );
        }

        Ok(())
    }
}
