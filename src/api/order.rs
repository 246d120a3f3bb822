use super::signing::SignatureHeaders;
use super::transport::HttpTransport;
use super::BITFLYER_API_BASE;
use crate::error::{BotError, Result};
use crate::models::{Credentials, OrderAcceptance, OrderRequest};
use reqwest::Method;

const SEND_CHILD_ORDER_PATH: &str = "/v1/me/sendchildorder";

/// Client for private order endpoints
///
/// Holds the credentials for its lifetime. Submissions are never retried:
/// a timed-out request may still have reached the matching engine.
#[derive(Clone, Debug)]
pub struct OrderClient {
    transport: HttpTransport,
    base_url: String,
    credentials: Credentials,
}

impl OrderClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(BITFLYER_API_BASE, credentials)
    }

    pub fn with_base_url(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            transport: HttpTransport::new(),
            base_url: base_url.into(),
            credentials,
        }
    }

    pub fn with_transport(mut self, transport: HttpTransport) -> Self {
        self.transport = transport;
        self
    }

    /// Build signed headers for a request, timestamped now
    pub fn signature_headers(&self, method: &str, path: &str, body: &[u8]) -> Result<SignatureHeaders> {
        SignatureHeaders::now(&self.credentials, method, path, body)
    }

    /// Place a new child order
    /// Endpoint: POST /v1/me/sendchildorder
    ///
    /// The request is consumed so the same order value cannot be sent twice.
    /// An empty, null or absent acceptance id means the exchange refused the order and the
    /// raw response is returned as `BotError::Rejected`.
    pub async fn place_order(&self, order: OrderRequest) -> Result<OrderAcceptance> {
        // Signed bytes are exactly the bytes sent
        let body = serde_json::to_vec(&order)?;
        let headers = self
            .signature_headers(Method::POST.as_str(), SEND_CHILD_ORDER_PATH, &body)?
            .to_header_map()?;

        tracing::info!(
            pair = %order.pair,
            side = %order.side,
            kind = %order.kind,
            price = order.price,
            size = order.size,
            time_in_force = %order.time_in_force,
            "Sending child order"
        );

        let url = format!("{}{}", self.base_url, SEND_CHILD_ORDER_PATH);
        let response = self
            .transport
            .send(Method::POST, &url, headers, &[], Some(body))
            .await?;

        let acceptance: OrderAcceptance =
            serde_json::from_slice(&response).map_err(|e| BotError::decode(e, &response))?;

        if acceptance.child_order_acceptance_id.is_empty() {
            let raw = String::from_utf8_lossy(&response).into_owned();
            tracing::warn!(response = %raw, "Order rejected by exchange");
            return Err(BotError::Rejected(raw));
        }

        tracing::info!(
            acceptance_id = %acceptance.child_order_acceptance_id,
            "Order accepted"
        );

        Ok(acceptance)
    }
}
