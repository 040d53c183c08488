//! Earthdata Login session handling.
//!
//! The session is an explicitly owned object passed into the CMR backend,
//! not ambient global state. The bearer token is established lazily on first
//! use and cached behind an async lock, so concurrent dispatch calls share
//! one login round-trip. CMR collection search works anonymously, so a
//! missing credential or failed login degrades rather than failing dispatch.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use geodex_core::{defaults, Error, Result};

/// Lazily authenticated Earthdata Login session.
pub struct EarthdataSession {
    client: Client,
    token_url: String,
    credentials: Option<(String, String)>,
    token: RwLock<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct EdlToken {
    access_token: String,
}

impl EarthdataSession {
    /// Session with explicit credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::build(
            defaults::EDL_TOKEN_URL.to_string(),
            Some((username.into(), password.into())),
            None,
        )
    }

    /// Session with a pre-issued bearer token (no login round-trip).
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::build(defaults::EDL_TOKEN_URL.to_string(), None, Some(token.into()))
    }

    /// Anonymous session: `ensure_authenticated` always yields no token.
    pub fn anonymous() -> Self {
        Self::build(defaults::EDL_TOKEN_URL.to_string(), None, None)
    }

    /// Create from environment variables (`EARTHDATA_TOKEN`, or
    /// `EARTHDATA_USERNAME`/`EARTHDATA_PASSWORD`); anonymous when unset.
    pub fn from_env() -> Self {
        if let Ok(token) = std::env::var(defaults::ENV_EARTHDATA_TOKEN) {
            return Self::with_token(token);
        }
        let credentials = match (
            std::env::var(defaults::ENV_EARTHDATA_USERNAME),
            std::env::var(defaults::ENV_EARTHDATA_PASSWORD),
        ) {
            (Ok(user), Ok(pass)) => Some((user, pass)),
            _ => {
                debug!(subsystem = "session", "no Earthdata credentials; CMR searches run anonymously");
                None
            }
        };
        Self::build(defaults::EDL_TOKEN_URL.to_string(), credentials, None)
    }

    /// Override the token endpoint (tests point this at a mock server).
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    fn build(
        token_url: String,
        credentials: Option<(String, String)>,
        token: Option<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::HTTP_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            token_url,
            credentials,
            token: RwLock::new(token),
        }
    }

    /// Ensure a bearer token is available, logging in on first use.
    ///
    /// Returns `Ok(None)` for anonymous sessions. Safe to call concurrently:
    /// the write lock serializes the login round-trip and late arrivals see
    /// the cached token.
    pub async fn ensure_authenticated(&self) -> Result<Option<String>> {
        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(Some(token.clone()));
        }

        let Some((username, password)) = self.credentials.as_ref() else {
            return Ok(None);
        };

        let mut guard = self.token.write().await;
        // Another caller may have logged in while we waited for the lock.
        if let Some(token) = guard.as_ref() {
            return Ok(Some(token.clone()));
        }

        let token = self.login(username, password).await?;
        info!(subsystem = "session", "Earthdata authentication successful");
        *guard = Some(token.clone());
        Ok(Some(token))
    }

    /// Fetch an existing EDL token, minting one when the account has none.
    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.token_url)
            .basic_auth(username, Some(password))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Unauthorized(format!(
                "Earthdata login returned {}",
                response.status()
            )));
        }

        let tokens: Vec<EdlToken> = response.json().await?;
        if let Some(token) = tokens.into_iter().next() {
            return Ok(token.access_token);
        }

        warn!(subsystem = "session", "no existing EDL token; minting a new one");
        let create_url = self.token_url.trim_end_matches('s').to_string();
        let response = self
            .client
            .post(&create_url)
            .basic_auth(username, Some(password))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Unauthorized(format!(
                "EDL token creation returned {}",
                response.status()
            )));
        }

        let token: EdlToken = response.json().await?;
        Ok(token.access_token)
    }
}
