//! HTTP client for Clever Instant Login and the data API

use std::time::Instant;

use axum::async_trait;
use serde::de::DeserializeOwned;

use super::Directory;
use super::models::{Envelope, Profile, RosterResponse, TokenRequest, TokenResponse};
use crate::birthdays::StudentRecord;
use crate::config::CleverConfig;
use crate::error::{AppError, UpstreamCall};

/// Clever API client
///
/// Wraps a shared `reqwest::Client`; the request timeout is set on that
/// client by the caller.
pub struct CleverClient {
    http: reqwest::Client,
    config: CleverConfig,
    /// Pre-built browser redirect for Instant Login
    authorize_url: String,
}

impl CleverClient {
    /// Create new client
    ///
    /// # Errors
    /// Returns `AppError::Config` if the authorize URL cannot be built
    pub fn new(http: reqwest::Client, config: CleverConfig) -> Result<Self, AppError> {
        let authorize_url = url::Url::parse_with_params(
            &config.authorize_url,
            &[
                ("response_type", "code"),
                ("redirect_uri", config.redirect_uri.as_str()),
                ("client_id", config.client_id.as_str()),
                ("scope", config.scope.as_str()),
            ],
        )
        .map_err(|e| AppError::Config(format!("clever.authorize_url is invalid: {e}")))?
        .to_string();

        Ok(Self {
            http,
            config,
            authorize_url,
        })
    }

    /// Where to send the browser to start Instant Login
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    /// Exchange a short-lived authorization code for an access token
    ///
    /// # Errors
    /// Any non-2xx status, transport failure or undecodable body
    pub async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let call = UpstreamCall::TokenExchange;
        let request = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .json(&TokenRequest {
                code,
                grant_type: "authorization_code",
                redirect_uri: &self.config.redirect_uri,
            });

        let token: TokenResponse = self.send_json(call, request).await?;
        if token.access_token.trim().is_empty() {
            return Err(AppError::malformed(call, "empty access_token"));
        }

        tracing::debug!(token_type = ?token.token_type, "Authorization code exchanged");
        Ok(token.access_token)
    }

    /// Send a request, check the status and decode a JSON body
    async fn send_json<T: DeserializeOwned>(
        &self,
        call: UpstreamCall,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AppError> {
        use crate::metrics::{UPSTREAM_REQUEST_DURATION_SECONDS, UPSTREAM_REQUESTS_TOTAL};

        let started = Instant::now();
        let result = request.send().await;
        UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&[call.as_str()])
            .observe(started.elapsed().as_secs_f64());

        let response = match result {
            Ok(response) => response,
            Err(source) => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[call.as_str(), "error"])
                    .inc();
                return Err(AppError::UpstreamTransport { call, source });
            }
        };

        let status = response.status();
        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&[call.as_str(), status.as_str()])
            .inc();

        if !status.is_success() {
            return Err(AppError::UpstreamStatus { call, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| AppError::UpstreamTransport { call, source })?;

        serde_json::from_slice(&body).map_err(|e| AppError::malformed(call, e.to_string()))
    }
}

#[async_trait]
impl Directory for CleverClient {
    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, AppError> {
        let request = self
            .http
            .get(self.config.profile_url())
            .bearer_auth(access_token);

        let envelope: Envelope<Profile> = self.send_json(UpstreamCall::Profile, request).await?;
        Ok(envelope.data)
    }

    async fn fetch_roster(&self, teacher_id: &str) -> Result<Vec<StudentRecord>, AppError> {
        let request = self
            .http
            .get(self.config.roster_url(teacher_id))
            .query(&[("limit", self.config.roster_limit)])
            .bearer_auth(&self.config.district_token);

        let roster: RosterResponse = self.send_json(UpstreamCall::Roster, request).await?;
        let records = roster.into_records();

        crate::metrics::ROSTER_SIZE.observe(records.len() as f64);
        tracing::debug!(teacher_id, students = records.len(), "Roster fetched");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CleverClient {
        let config = crate::config::tests::valid_config();
        CleverClient::new(reqwest::Client::new(), config.clever).unwrap()
    }

    #[test]
    fn authorize_url_carries_instant_login_parameters() {
        let client = client();
        let url = url::Url::parse(client.authorize_url()).unwrap();

        assert_eq!(url.host_str(), Some("clever.com"));
        assert_eq!(url.path(), "/oauth/authorize");

        let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            params,
            vec![
                ("response_type".to_string(), "code".to_string()),
                (
                    "redirect_uri".to_string(),
                    "http://localhost:8080/oauth".to_string()
                ),
                ("client_id".to_string(), "client-id".to_string()),
                ("scope".to_string(), "read:user_id read:sis".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn unreachable_token_endpoint_is_a_transport_error() {
        let mut config = crate::config::tests::valid_config();
        config.clever.token_url = "http://127.0.0.1:9/oauth/tokens".to_string();
        let client = CleverClient::new(reqwest::Client::new(), config.clever).unwrap();

        let error = client.exchange_code("code").await.unwrap_err();
        assert!(matches!(
            error,
            AppError::UpstreamTransport {
                call: UpstreamCall::TokenExchange,
                ..
            }
        ));
    }
}
