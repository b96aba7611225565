//! OAuth2 access tokens for Google APIs
//!
//! A service-account key signs a short-lived RS256 assertion which is traded
//! for a bearer token at the key's token endpoint. Tokens are cached until
//! shortly before they expire.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::client::{REQUEST_TIMEOUT_SECS, http_client};
use crate::error::{CxSheetError, Result};

/// Scopes needed for the agent, sheets and drive endpoints
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Anything that can hand out a bearer token
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// A fixed token, for tests and pre-minted credentials
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// The fields of a service-account JSON key this tool uses
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| CxSheetError::io(path, e))?;
        serde_json::from_str(&raw)
            .map_err(|e| CxSheetError::parse(format!("service account key {}", path.display()), e))
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

/// Token source backed by a service-account key
pub struct ServiceAccountTokenSource {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    http: reqwest::Client,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            CxSheetError::configuration(format!(
                "invalid private key for {}: {}",
                key.client_email, e
            ))
        })?;
        Ok(Self {
            key,
            encoding_key,
            http: http_client(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))?,
            cache: Mutex::new(None),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::new(ServiceAccountKey::from_file(path)?)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES.join(" "),
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| CxSheetError::configuration(format!("cannot sign token assertion: {}", e)))
    }

    async fn exchange(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.assertion(now)?;
        log::debug!("Requesting access token for {}", self.key.client_email);

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| CxSheetError::remote("token exchange", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CxSheetError::Remote {
                operation: "token exchange".to_string(),
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CxSheetError::remote("token exchange", e))?;

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn token(&self) -> Result<String> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh(Utc::now())) {
            return Ok(cached.value.clone());
        }

        let fresh = self.exchange().await?;
        let value = fresh.value.clone();
        *cache = Some(fresh);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_key(token_uri: String) -> ServiceAccountKey {
        let pem = std::fs::read_to_string(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/test_service_account.pem"
        ))
        .unwrap();
        ServiceAccountKey {
            client_email: "builder@demo.iam.gserviceaccount.com".to_string(),
            private_key: pem,
            private_key_id: Some("key-1".to_string()),
            project_id: Some("demo".to_string()),
            token_uri,
        }
    }

    #[test]
    fn test_key_file_defaults_token_uri() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("key.json");
        std::fs::write(
            &file,
            r#"{"type": "service_account", "client_email": "a@b.c", "private_key": "x"}"#,
        )
        .unwrap();

        let key = ServiceAccountKey::from_file(&file).unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert_eq!(key.client_email, "a@b.c");
    }

    #[test]
    fn test_invalid_private_key_is_configuration_error() {
        let mut key = test_key(DEFAULT_TOKEN_URI.to_string());
        key.private_key = "not a pem".to_string();
        let err = ServiceAccountTokenSource::new(key).err().unwrap();
        assert!(matches!(err, CxSheetError::Configuration(_)));
    }

    #[test]
    fn test_assertion_is_signed_jwt() {
        let source = ServiceAccountTokenSource::new(test_key(DEFAULT_TOKEN_URI.to_string())).unwrap();
        let jwt = source.assertion(Utc::now()).unwrap();
        assert_eq!(jwt.split('.').count(), 3);

        let header = jsonwebtoken::decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some("key-1"));
    }

    #[tokio::test]
    async fn test_token_is_exchanged_once_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=urn"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.test",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source =
            ServiceAccountTokenSource::new(test_key(format!("{}/token", server.uri()))).unwrap();
        assert_eq!(source.token().await.unwrap(), "ya29.test");
        assert_eq!(source.token().await.unwrap(), "ya29.test");
    }

    #[tokio::test]
    async fn test_rejected_exchange_is_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let source =
            ServiceAccountTokenSource::new(test_key(format!("{}/token", server.uri()))).unwrap();
        let err = source.token().await.unwrap_err();
        assert!(matches!(err, CxSheetError::Remote { status: Some(400), .. }));
    }

    #[tokio::test]
    async fn test_static_token() {
        assert_eq!(StaticToken::new("abc").token().await.unwrap(), "abc");
    }
}
