use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency pairs tradable on bitFlyer
///
/// Numeric ids follow declaration order. Unknown ids resolve to `BtcJpy`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum CurrencyPair {
    #[default]
    #[serde(rename = "BTC_JPY")]
    BtcJpy,
    #[serde(rename = "ETH_JPY")]
    EthJpy,
    #[serde(rename = "FX_BTC_JPY")]
    FxBtcJpy,
    #[serde(rename = "ETH_BTC")]
    EthBtc,
    #[serde(rename = "BCH_BTC")]
    BchBtc,
}

impl CurrencyPair {
    pub const ALL: [CurrencyPair; 5] = [
        CurrencyPair::BtcJpy,
        CurrencyPair::EthJpy,
        CurrencyPair::FxBtcJpy,
        CurrencyPair::EthBtc,
        CurrencyPair::BchBtc,
    ];

    /// Canonical product code sent to the exchange
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyPair::BtcJpy => "BTC_JPY",
            CurrencyPair::EthJpy => "ETH_JPY",
            CurrencyPair::FxBtcJpy => "FX_BTC_JPY",
            CurrencyPair::EthBtc => "ETH_BTC",
            CurrencyPair::BchBtc => "BCH_BTC",
        }
    }

    /// Resolve a numeric pair id, falling back to BTC_JPY on unknown ids
    pub fn from_id(id: i64) -> Self {
        match id {
            0 => CurrencyPair::BtcJpy,
            1 => CurrencyPair::EthJpy,
            2 => CurrencyPair::FxBtcJpy,
            3 => CurrencyPair::EthBtc,
            4 => CurrencyPair::BchBtc,
            other => {
                let fallback = CurrencyPair::default();
                tracing::warn!(
                    id = other,
                    fallback = fallback.as_str(),
                    "Unknown currency pair id, using default"
                );
                fallback
            }
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Child order type
/// Limit = price specified, Market = execute at market
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OrderKind {
    #[default]
    #[serde(rename = "LIMIT")]
    Limit,
    #[serde(rename = "MARKET")]
    Market,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Limit => "LIMIT",
            OrderKind::Market => "MARKET",
        }
    }

    pub fn from_id(id: i64) -> Self {
        match id {
            0 => OrderKind::Limit,
            1 => OrderKind::Market,
            other => {
                tracing::warn!(id = other, fallback = "LIMIT", "Unknown order kind id, using default");
                OrderKind::default()
            }
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    pub fn from_id(id: i64) -> Self {
        match id {
            0 => Side::Buy,
            1 => Side::Sell,
            other => {
                tracing::warn!(id = other, fallback = "BUY", "Unknown side id, using default");
                Side::default()
            }
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution condition of an order
///
/// - `GoodTilCanceled`: stays open until filled or canceled
/// - `ImmediateOrCancel`: fills what it can immediately, cancels the rest
/// - `FillOrKill`: cancels the whole order unless it fills completely at once
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TimeInForce {
    #[default]
    #[serde(rename = "GTC")]
    GoodTilCanceled,
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    #[serde(rename = "FOK")]
    FillOrKill,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::GoodTilCanceled => "GTC",
            TimeInForce::ImmediateOrCancel => "IOC",
            TimeInForce::FillOrKill => "FOK",
        }
    }

    pub fn from_id(id: i64) -> Self {
        match id {
            0 => TimeInForce::GoodTilCanceled,
            1 => TimeInForce::ImmediateOrCancel,
            2 => TimeInForce::FillOrKill,
            other => {
                tracing::warn!(id = other, fallback = "GTC", "Unknown time-in-force id, using default");
                TimeInForce::default()
            }
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticker snapshot returned by `GET /v1/ticker`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub product_code: String,
    pub state: String,
    pub timestamp: String,
    pub tick_id: u64,
    pub best_bid: f64,
    pub best_ask: f64,
    pub best_bid_size: f64,
    pub best_ask_size: f64,
    pub total_bid_depth: f64,
    pub total_ask_depth: f64,
    pub ltp: f64, // last traded price
    pub volume: f64,
    pub volume_by_product: f64,
}

impl Quote {
    /// Parse the exchange timestamp. bitFlyer omits the zone suffix, the
    /// value is always UTC.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.trim_end_matches('Z');
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn spread(&self) -> f64 {
        self.best_ask - self.best_bid
    }
}

/// Body of `POST /v1/me/sendchildorder`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderRequest {
    #[serde(rename = "product_code")]
    pub pair: CurrencyPair,
    #[serde(rename = "child_order_type")]
    pub kind: OrderKind,
    pub side: Side,
    pub price: f64,
    pub size: f64,
    pub minute_to_expire: u32,
    pub time_in_force: TimeInForce,
}

/// Acceptance receipt for a child order
///
/// Confirms the order entered the matching engine, not that it filled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OrderAcceptance {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub child_order_acceptance_id: String,
}

// The exchange may send `null` for a refused order
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// API key and secret for private endpoints
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const TICKER_JSON: &str = r#"{
        "product_code": "BTC_JPY",
        "state": "RUNNING",
        "timestamp": "2024-03-01T02:50:59.97",
        "tick_id": 3579,
        "best_bid": 9405000.0,
        "best_ask": 9410123.0,
        "best_bid_size": 0.1,
        "best_ask_size": 0.0137,
        "total_bid_depth": 1496.39,
        "total_ask_depth": 1287.21,
        "market_bid_size": 0,
        "market_ask_size": 0,
        "ltp": 9407001.0,
        "volume": 16819.26,
        "volume_by_product": 6819.26
    }"#;

    #[test]
    fn test_pair_wire_strings_unique_and_non_empty() {
        let mut seen = HashSet::new();
        for pair in CurrencyPair::ALL {
            assert!(!pair.as_str().is_empty());
            assert!(seen.insert(pair.as_str()), "duplicate wire string {}", pair);
        }
        assert_eq!(seen.len(), CurrencyPair::ALL.len());
    }

    #[test]
    fn test_pair_from_id() {
        assert_eq!(CurrencyPair::from_id(0), CurrencyPair::BtcJpy);
        assert_eq!(CurrencyPair::from_id(2).as_str(), "FX_BTC_JPY");
        assert_eq!(CurrencyPair::from_id(4).as_str(), "BCH_BTC");
    }

    #[test]
    fn test_unknown_ids_fall_back_to_defaults() {
        assert_eq!(CurrencyPair::from_id(99).as_str(), "BTC_JPY");
        assert_eq!(CurrencyPair::from_id(-1).as_str(), "BTC_JPY");
        assert_eq!(OrderKind::from_id(7).as_str(), "LIMIT");
        assert_eq!(Side::from_id(42).as_str(), "BUY");
        assert_eq!(TimeInForce::from_id(3).as_str(), "GTC");
    }

    #[test]
    fn test_display_matches_wire_string() {
        assert_eq!(OrderKind::Market.to_string(), "MARKET");
        assert_eq!(Side::Sell.to_string(), "SELL");
        assert_eq!(TimeInForce::ImmediateOrCancel.to_string(), "IOC");
        assert_eq!(TimeInForce::FillOrKill.to_string(), "FOK");
        assert_eq!(CurrencyPair::EthBtc.to_string(), "ETH_BTC");
    }

    #[test]
    fn test_serde_uses_wire_strings() {
        for pair in CurrencyPair::ALL {
            let json = serde_json::to_string(&pair).unwrap();
            assert_eq!(json, format!("\"{}\"", pair.as_str()));
        }
        assert_eq!(serde_json::to_string(&TimeInForce::FillOrKill).unwrap(), "\"FOK\"");
    }

    #[test]
    fn test_order_request_json_fields() {
        let order = OrderRequest {
            pair: CurrencyPair::BtcJpy,
            kind: OrderKind::Limit,
            side: Side::Buy,
            price: 3000000.0,
            size: 0.0033,
            minute_to_expire: 4320,
            time_in_force: TimeInForce::GoodTilCanceled,
        };

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["product_code"], "BTC_JPY");
        assert_eq!(value["child_order_type"], "LIMIT");
        assert_eq!(value["side"], "BUY");
        assert_eq!(value["price"], 3000000.0);
        assert_eq!(value["size"], 0.0033);
        assert_eq!(value["minute_to_expire"], 4320);
        assert_eq!(value["time_in_force"], "GTC");
        assert_eq!(value.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_quote_decode_and_roundtrip() {
        let quote: Quote = serde_json::from_str(TICKER_JSON).unwrap();
        assert_eq!(quote.product_code, "BTC_JPY");
        assert_eq!(quote.tick_id, 3579);
        assert_eq!(quote.best_ask_size, 0.0137);

        let encoded = serde_json::to_string(&quote).unwrap();
        let decoded: Quote = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, quote);
        assert_eq!(decoded.total_bid_depth.to_bits(), 1496.39f64.to_bits());
        assert_eq!(decoded.volume_by_product.to_bits(), 6819.26f64.to_bits());
    }

    #[test]
    fn test_quote_missing_field_fails() {
        let result = serde_json::from_str::<Quote>(r#"{"product_code": "BTC_JPY", "ltp": 1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_quote_timestamp_and_spread() {
        let quote: Quote = serde_json::from_str(TICKER_JSON).unwrap();
        let ts = quote.timestamp_utc().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T02:50:59.970+00:00");
        assert_eq!(quote.spread(), 5123.0);
    }

    #[test]
    fn test_acceptance_missing_id_defaults_to_empty() {
        let acceptance: OrderAcceptance = serde_json::from_str("{}").unwrap();
        assert!(acceptance.child_order_acceptance_id.is_empty());

        let acceptance: OrderAcceptance =
            serde_json::from_str(r#"{"child_order_acceptance_id":null}"#).unwrap();
        assert!(acceptance.child_order_acceptance_id.is_empty());
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let creds = Credentials::new("my-key", "my-secret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("my-key"));
        assert!(!debug.contains("my-secret"));
    }
}
