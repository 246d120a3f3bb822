use crate::error::{BotError, Result};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};

/// Thin wrapper over a reqwest client
///
/// Sends one request and hands back the raw body. The HTTP status is not
/// inspected: bitFlyer reports failures in the JSON payload, callers decide
/// what a body means.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Send a GET or POST request and read the whole body
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        if method != Method::GET && method != Method::POST {
            return Err(BotError::Configuration(format!(
                "method was neither GET nor POST: {}",
                method
            )));
        }

        let mut request = self.client.request(method.clone(), url).headers(headers);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(
            %method,
            url,
            status = status.as_u16(),
            bytes = bytes.len(),
            "HTTP response received"
        );

        Ok(bytes.to_vec())
    }
}
