//! Google service account authentication
//!
//! Signs an RS256 JWT assertion with the service account key and trades it
//! for a short-lived OAuth2 access token. Tokens are cached until shortly
//! before they expire.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use zeroize::Zeroizing;

use crate::errors::RecorderError;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Treats the token as expired five minutes early
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::minutes(5)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone)]
pub struct ServiceAccountAuth {
    client_email: String,
    private_key: Zeroizing<String>,
    token_uri: String,
    token_cache: Arc<RwLock<Option<AccessToken>>>,
    http_client: reqwest::Client,
}

impl ServiceAccountAuth {
    pub fn new(
        client_email: String,
        private_key: Zeroizing<String>,
        token_uri: String,
        http_client: reqwest::Client,
    ) -> Self {
        ServiceAccountAuth {
            client_email,
            private_key,
            token_uri,
            token_cache: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Returns a cached token or fetches a fresh one
    pub async fn access_token(&self) -> Result<String, RecorderError> {
        {
            let cache = self.token_cache.read().await;
            if let Some(token) = cache.as_ref().filter(|t| !t.is_expired()) {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.token.clone();
        *self.token_cache.write().await = Some(fresh);

        Ok(token)
    }

    fn signed_assertion(&self) -> Result<String, RecorderError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            exp: now + 3600,
            iat: now,
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?)
    }

    async fn fetch_token(&self) -> Result<AccessToken, RecorderError> {
        let assertion = self.signed_assertion()?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .http_client
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecorderError::Authentication(format!("{}: {}", status, body)));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| RecorderError::Authentication(e.to_string()))?;

        tracing::debug!(expires_in = token_response.expires_in, "Obtained spreadsheet access token");

        Ok(AccessToken {
            token: token_response.access_token,
            expires_at: Utc::now() + Duration::seconds(token_response.expires_in),
        })
    }
}
