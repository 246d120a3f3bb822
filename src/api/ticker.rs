use super::transport::HttpTransport;
use super::BITFLYER_API_BASE;
use crate::error::{BotError, Result};
use crate::models::{CurrencyPair, Quote};
use reqwest::header::HeaderMap;
use reqwest::Method;
use tokio::task::JoinHandle;

const TICKER_PATH: &str = "/v1/ticker";
const PRODUCT_CODE_KEY: &str = "product_code";

/// Client for the public ticker endpoint (no authentication)
#[derive(Clone, Debug)]
pub struct MarketDataClient {
    transport: HttpTransport,
    base_url: String,
}

impl MarketDataClient {
    pub fn new() -> Self {
        Self::with_base_url(BITFLYER_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            transport: HttpTransport::new(),
            base_url: base_url.into(),
        }
    }

    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Get the current ticker for a currency pair
    /// Endpoint: GET /v1/ticker?product_code={pair}
    pub async fn get_ticker(&self, pair: CurrencyPair) -> Result<Quote> {
        let url = format!("{}{}", self.base_url, TICKER_PATH);

        let body = self
            .transport
            .send(
                Method::GET,
                &url,
                HeaderMap::new(),
                &[(PRODUCT_CODE_KEY, pair.as_str())],
                None,
            )
            .await?;

        let quote: Quote = serde_json::from_slice(&body).map_err(|e| BotError::decode(e, &body))?;

        tracing::info!(
            pair = %pair,
            tick_id = quote.tick_id,
            ltp = quote.ltp,
            best_ask = quote.best_ask,
            spread = quote.spread(),
            "Fetched ticker"
        );

        Ok(quote)
    }

    /// Fetch the ticker on a separate tokio task
    ///
    /// The returned task yields a single `Result`, so a quote and an error
    /// can never both (or neither) arrive.
    pub fn spawn_ticker(&self, pair: CurrencyPair) -> TickerTask {
        let client = self.clone();
        TickerTask {
            handle: tokio::spawn(async move { client.get_ticker(pair).await }),
        }
    }
}

impl Default for MarketDataClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to an in-flight ticker fetch
pub struct TickerTask {
    handle: JoinHandle<Result<Quote>>,
}

impl TickerTask {
    /// Wait for the fetch to finish
    pub async fn join(self) -> Result<Quote> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(BotError::Task(format!("ticker fetch: {}", e))),
        }
    }
}
