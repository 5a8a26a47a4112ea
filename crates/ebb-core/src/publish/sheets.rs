//! Google Sheets sink
//!
//! Overwrites a tab using the Sheets v4 values API: the target range is
//! cleared, then the table is written from its top-left cell with
//! `valueInputOption=USER_ENTERED`. The two calls are not atomic; a failure
//! between them leaves the tab empty.
//!
//! # Authentication
//!
//! - Service account: an RS256 JWT signed with the key file's private key is
//!   exchanged for an access token at the key's `token_uri`
//! - Static token: a pre-issued bearer token (e.g. from
//!   `gcloud auth print-access-token`) taken from `EBB_SHEETS_TOKEN`

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::ReportSink;
use crate::error::{Error, Result};
use crate::models::Table;

/// OAuth scope for reading and writing spreadsheets
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Environment variable holding a pre-issued access token
pub const SHEETS_TOKEN_ENV: &str = "EBB_SHEETS_TOKEN";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh tokens this long before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields ebb needs from a service-account key file
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Auth(format!(
                "Failed to read credentials {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Auth(format!(
                "Invalid service account key {}: {}",
                path.display(),
                e
            ))
        })
    }
}

/// How the sink authenticates
#[derive(Debug, Clone)]
pub enum SheetsAuth {
    ServiceAccount(ServiceAccountKey),
    Token(String),
}

impl SheetsAuth {
    /// Token from `EBB_SHEETS_TOKEN` first, then the key file
    pub fn resolve(credentials: Option<&Path>) -> Result<Self> {
        if let Ok(token) = std::env::var(SHEETS_TOKEN_ENV) {
            if !token.trim().is_empty() {
                return Ok(Self::Token(token.trim().to_string()));
            }
        }
        match credentials {
            Some(path) => Ok(Self::ServiceAccount(ServiceAccountKey::from_file(path)?)),
            None => Err(Error::Auth(format!(
                "No credentials: set GOOGLE_APPLICATION_CREDENTIALS, sheets.credentials or {}",
                SHEETS_TOKEN_ENV
            ))),
        }
    }
}

/// JWT claims for the service-account assertion
#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|at| now + chrono::Duration::seconds(EXPIRY_MARGIN_SECS) < at)
            .unwrap_or(true)
    }
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Sink writing to one spreadsheet
pub struct SheetsSink {
    http_client: Client,
    api_base: String,
    spreadsheet_id: String,
    auth: SheetsAuth,
    token: Mutex<Option<CachedToken>>,
}

impl SheetsSink {
    pub fn new(api_base: &str, spreadsheet_id: &str, auth: SheetsAuth, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            api_base: api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            auth,
            token: Mutex::new(None),
        })
    }

    /// Bearer token for the next request, exchanging a fresh one if needed
    async fn access_token(&self) -> Result<String> {
        let key = match &self.auth {
            SheetsAuth::Token(token) => return Ok(token.clone()),
            SheetsAuth::ServiceAccount(key) => key,
        };

        let now = Utc::now();
        if let Some(cached) = self.cached_token()? {
            if cached.is_fresh(now) {
                return Ok(cached.token);
            }
        }

        let assertion = sign_assertion(key, now)?;
        let response = self
            .http_client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.is_server_error() {
                return Err(Error::SheetsApi {
                    status: status.as_u16(),
                    message: format!("Token exchange failed: {}", body),
                });
            }
            return Err(Error::Auth(format!(
                "Token exchange failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!("Obtained access token for {}", key.client_email);
        let cached = CachedToken {
            token: token.access_token,
            expires_at: token
                .expires_in
                .map(|secs| now + chrono::Duration::seconds(secs)),
        };
        let value = cached.token.clone();
        *self
            .token
            .lock()
            .map_err(|_| Error::Auth("Token cache lock poisoned".into()))? = Some(cached);
        Ok(value)
    }

    fn cached_token(&self) -> Result<Option<CachedToken>> {
        Ok(self
            .token
            .lock()
            .map_err(|_| Error::Auth("Token cache lock poisoned".into()))?
            .clone())
    }

    /// `{api_base}/spreadsheets/{id}/values/{segment}`
    fn values_url(&self, segment: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| Error::Config(format!("Invalid Sheets API base {}: {}", self.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid Sheets API base {}", self.api_base)))?
            .pop_if_empty()
            .extend(["spreadsheets", self.spreadsheet_id.as_str(), "values", segment]);
        Ok(url)
    }

    async fn clear(&self, token: &str, sheet: &str) -> Result<()> {
        let url = self.values_url(&format!("{}:clear", sheet))?;
        let response = self
            .http_client
            .post(url)
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        check_status(response).await
    }

    async fn update(&self, token: &str, range: &str, table: &Table) -> Result<()> {
        let mut url = self.values_url(range)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        let response = self
            .http_client
            .put(url)
            .bearer_auth(token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": table,
            }))
            .send()
            .await?;
        check_status(response).await
    }
}

#[async_trait]
impl ReportSink for SheetsSink {
    fn name(&self) -> &str {
        "google-sheets"
    }

    async fn write_table(&self, range: &str, table: &Table) -> Result<()> {
        let token = self.access_token().await?;
        let (sheet, start) = a1_ranges(range);
        self.clear(&token, &sheet).await?;
        self.update(&token, &start, table).await?;
        debug!(
            "Wrote {} rows to {} in spreadsheet {}",
            table.len(),
            start,
            self.spreadsheet_id
        );
        Ok(())
    }
}

/// Signed RS256 assertion for the token exchange
fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String> {
    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: key.client_email.clone(),
        scope: SHEETS_SCOPE.to_string(),
        aud: key.token_uri.clone(),
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| Error::Auth(format!("Invalid service account private key: {}", e)))?;
    encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
        .map_err(|e| Error::Auth(format!("Failed to sign assertion: {}", e)))
}

/// Range to clear and range to write for a tab name or A1 range
///
/// A bare tab name clears the whole tab and writes from `A1`. An explicit
/// A1 range is used as-is for both.
fn a1_ranges(range: &str) -> (String, String) {
    if range.contains('!') {
        return (range.to_string(), range.to_string());
    }
    let quoted = format!("'{}'", range.replace('\'', "''"));
    (quoted.clone(), format!("{}!A1", quoted))
}

async fn check_status(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    Err(Error::SheetsApi {
        status: status.as_u16(),
        message,
    })
}
