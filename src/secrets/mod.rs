// Secret retrieval
use crate::error::{BotError, Result};
use crate::models::Credentials;
use async_trait::async_trait;
use std::collections::HashMap;

/// Source of named secrets (parameter store, vault, environment, ...)
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Look up a secret, failing with `SecretNotFound` when absent
    async fn get_secret(&self, name: &str) -> Result<String>;
}

/// Resolve API key and secret by name
pub async fn load_credentials(
    provider: &dyn SecretProvider,
    key_name: &str,
    secret_name: &str,
) -> Result<Credentials> {
    let api_key = provider.get_secret(key_name).await?;
    let api_secret = provider.get_secret(secret_name).await?;
    tracing::debug!(key_name, secret_name, "Loaded API credentials");
    Ok(Credentials::new(api_key, api_secret))
}

/// Reads secrets from environment variables
///
/// Names map to upper snake case: `purchase_btc-api-key` is read from
/// `PURCHASE_BTC_API_KEY`.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn var_name(name: &str) -> String {
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get_secret(&self, name: &str) -> Result<String> {
        let var = Self::var_name(name);
        match std::env::var(&var) {
            Ok(value) if !value.is_empty() => Ok(value),
            _ => Err(BotError::SecretNotFound(name.to_string())),
        }
    }
}

/// In-memory secrets, for tests and local runs
#[derive(Debug, Clone, Default)]
pub struct StaticSecretProvider {
    secrets: HashMap<String, String>,
}

impl StaticSecretProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn get_secret(&self, name: &str) -> Result<String> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| BotError::SecretNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_name() {
        assert_eq!(EnvSecretProvider::var_name("purchase_btc-api-key"), "PURCHASE_BTC_API_KEY");
        assert_eq!(EnvSecretProvider::var_name("a.b/c"), "A_B_C");
    }

    #[tokio::test]
    async fn test_env_provider() {
        std::env::set_var("BTC_BUYER_TEST_SECRET_PRESENT", "s3cr3t");
        let provider = EnvSecretProvider::new();

        assert_eq!(
            provider.get_secret("btc_buyer-test-secret-present").await.unwrap(),
            "s3cr3t"
        );

        let missing = provider.get_secret("btc_buyer-test-secret-missing").await;
        assert!(matches!(missing, Err(BotError::SecretNotFound(name)) if name == "btc_buyer-test-secret-missing"));
    }

    #[tokio::test]
    async fn test_load_credentials() {
        let provider = StaticSecretProvider::new()
            .with_secret("key", "k")
            .with_secret("secret", "s");

        let creds = load_credentials(&provider, "key", "secret").await.unwrap();
        assert_eq!(creds.api_key, "k");
        assert_eq!(creds.api_secret, "s");
    }

    #[tokio::test]
    async fn test_load_credentials_missing_secret() {
        let provider = StaticSecretProvider::new().with_secret("key", "k");

        let err = load_credentials(&provider, "key", "secret").await.unwrap_err();
        assert_eq!(err.to_string(), "Secret not found: secret");
    }
}
