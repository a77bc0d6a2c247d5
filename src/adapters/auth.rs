//! Service-account authentication for the Google APIs.
//!
//! A signed RS256 JWT assertion is exchanged at the key's token endpoint for
//! a short-lived bearer token, which is cached until shortly before expiry.

use crate::utils::error::{InvoiceError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

/// The three capabilities this tool needs.
pub const SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/drive.file",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Supplies a bearer token for API requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for std::sync::Arc<T> {
    async fn access_token(&self) -> Result<String> {
        (**self).access_token().await
    }
}

/// Fixed token, used by tests.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// The fields of a service-account key file this tool uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    /// Load and parse the credential file. Absence or invalidity is a fatal
    /// startup error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| InvoiceError::AuthError {
                message: format!("cannot read credential file '{}': {}", path.display(), e),
            })?;
        serde_json::from_str(&content).map_err(|e| InvoiceError::AuthError {
            message: format!("credential file '{}' is not valid: {}", path.display(), e),
        })
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Token provider backed by a service-account key.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    scope: String,
    token_url: String,
    client: Client,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey) -> Self {
        let token_url = key.token_uri.clone();
        Self::with_token_url(key, token_url)
    }

    /// Override the token endpoint (useful for testing).
    pub fn with_token_url(key: ServiceAccountKey, token_url: impl Into<String>) -> Self {
        Self {
            key,
            scope: SCOPES.join(" "),
            token_url: token_url.into(),
            client: Client::new(),
            cache: Mutex::new(None),
        }
    }

    fn build_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.token_url,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(60)).timestamp(),
        };
        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        let jwt = encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?;
        Ok(jwt)
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.build_assertion(now)?;

        debug!(url = %self.token_url, "exchanging JWT assertion for access token");
        let response = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InvoiceError::AuthError {
                message: format!("token exchange failed ({}): {}", status, body),
            });
        }

        let parsed: TokenResponse = response.json().await?;
        Ok(CachedToken {
            token: parsed.access_token,
            expires_at: now + Duration::seconds(parsed.expires_in.unwrap_or(3600)),
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;

        // 60s leeway so a token never expires mid-request.
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at - Duration::seconds(60) > Utc::now() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *cache = Some(fresh);
        Ok(token)
    }
}
