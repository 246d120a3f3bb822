use crate::error::{BotError, Result};
use crate::models::Credentials;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const ACCESS_KEY: &str = "ACCESS-KEY";
pub const ACCESS_TIMESTAMP: &str = "ACCESS-TIMESTAMP";
pub const ACCESS_SIGN: &str = "ACCESS-SIGN";

/// Sign a private API request (bitFlyer style)
///
/// The signed text is `timestamp + method + path + body` with no separators.
/// Returns the lowercase hex HMAC-SHA256 keyed by the API secret.
pub fn sign_request(
    secret: &str,
    method: &str,
    path: &str,
    body: &[u8],
    timestamp: i64,
) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BotError::Signature(format!("HMAC init failed: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Authentication headers for one request
#[derive(Clone, PartialEq)]
pub struct SignatureHeaders {
    pub access_key: String,
    pub timestamp: String,
    pub signature: String,
}

impl SignatureHeaders {
    /// Sign with an explicit timestamp (Unix seconds)
    pub fn at(
        credentials: &Credentials,
        method: &str,
        path: &str,
        body: &[u8],
        timestamp: i64,
    ) -> Result<Self> {
        Ok(Self {
            access_key: credentials.api_key.clone(),
            timestamp: timestamp.to_string(),
            signature: sign_request(&credentials.api_secret, method, path, body, timestamp)?,
        })
    }

    /// Sign with the current wall-clock time
    pub fn now(credentials: &Credentials, method: &str, path: &str, body: &[u8]) -> Result<Self> {
        Self::at(credentials, method, path, body, chrono::Utc::now().timestamp())
    }

    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("access-key"), header_value(&self.access_key)?);
        headers.insert(HeaderName::from_static("access-timestamp"), header_value(&self.timestamp)?);
        headers.insert(HeaderName::from_static("access-sign"), header_value(&self.signature)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl std::fmt::Debug for SignatureHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureHeaders")
            .field("access_key", &"<redacted>")
            .field("timestamp", &self.timestamp)
            .field("signature", &self.signature)
            .finish()
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| BotError::Configuration(format!("Invalid header value: {}", e)))
}
