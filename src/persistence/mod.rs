use crate::models::Quote;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// One observed quote as written to the log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteRecord {
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub quote: Quote,
}

/// Sink for observed quotes
///
/// Append-only; no read-modify-write consistency is offered.
#[async_trait]
pub trait QuoteLog: Send + Sync {
    async fn append(&self, quote: &Quote) -> Result<()>;
}

/// Quote log backed by a JSON-lines file
///
/// Each quote is one line: `{"recorded_at": ..., "product_code": ..., ...}`
#[derive(Debug, Clone)]
pub struct JsonLinesQuoteLog {
    path: PathBuf,
}

impl JsonLinesQuoteLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record in file order
    ///
    /// A missing file is an empty log.
    pub async fn load(&self) -> Result<Vec<QuoteRecord>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            records.push(serde_json::from_str(line)?);
        }

        tracing::debug!(
            "Loaded {} quote records from {}",
            records.len(),
            self.path.display()
        );

        Ok(records)
    }
}

#[async_trait]
impl QuoteLog for JsonLinesQuoteLog {
    async fn append(&self, quote: &Quote) -> Result<()> {
        let record = QuoteRecord {
            recorded_at: Utc::now(),
            quote: quote.clone(),
        };

        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        tracing::debug!(
            tick_id = quote.tick_id,
            path = %self.path.display(),
            "Appended quote to log"
        );

        Ok(())
    }
}
