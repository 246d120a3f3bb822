use thiserror::Error;

/// Errors surfaced by the purchase workflow.
///
/// Every variant is rendered verbatim into the invocation response body,
/// so messages stay short and never include credentials.
#[derive(Error, Debug)]
pub enum BotError {
    // Network errors
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    // Response shape errors
    #[error("Failed to decode response: {source} (body: {body})")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("{0}")]
    Rejected(String),

    // Precondition errors, raised before any network call
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config source error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Signature error: {0}")]
    Signature(String),

    // Collaborator errors
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl BotError {
    /// Wrap a JSON decode failure together with the body that caused it
    pub fn decode(source: serde_json::Error, body: &[u8]) -> Self {
        BotError::Decode {
            source,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

/// Result type alias for BotError
pub type Result<T> = std::result::Result<T, BotError>;
