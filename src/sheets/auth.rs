//! Service-account authentication for the Google Sheets API.
//!
//! The credential file is read on every authentication call; tokens are not
//! cached, so each pipeline invocation authenticates once.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::SheetsError;
use crate::constants::{GOOGLE_TOKEN_URL, SHEETS_SCOPE};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// The subset of a Google service-account key file needed to mint tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Load a service-account key from disk.
pub fn load_service_account_key(path: &Path) -> Result<ServiceAccountKey, SheetsError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SheetsError::Config(format!(
            "Failed to read service account credentials at {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        SheetsError::Config(format!(
            "Invalid service account credentials at {}: {}",
            path.display(),
            e
        ))
    })
}

/// Exchange a signed JWT assertion for an OAuth access token.
pub async fn fetch_access_token(
    http: &reqwest::Client,
    key: &ServiceAccountKey,
    token_url_override: Option<&str>,
) -> Result<String, SheetsError> {
    let token_url = token_url_override
        .or(key.token_uri.as_deref())
        .unwrap_or(GOOGLE_TOKEN_URL);

    let now = Utc::now().timestamp();
    let claims = Claims {
        iss: &key.client_email,
        scope: SHEETS_SCOPE,
        aud: token_url,
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SheetsError::Config(format!("Invalid service account private key: {}", e)))?;
    let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
        .map_err(|e| SheetsError::Config(format!("Failed to sign service account assertion: {}", e)))?;

    debug!("Requesting access token for {}", key.client_email);
    let response = http
        .post(token_url)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| SheetsError::Other(format!("Token request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SheetsError::Config(format!(
            "Service account authentication failed ({}): {}",
            status, body
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| SheetsError::Other(format!("Invalid token response: {}", e)))?;
    Ok(token.access_token)
}
