use crate::api::BITFLYER_API_BASE;
use crate::error::{BotError, Result};
use crate::models::{CurrencyPair, TimeInForce};
use crate::strategy::{LotRules, PricingStrategy};
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Longest expiry bitFlyer accepts (30 days)
const MAX_MINUTE_TO_EXPIRE: u32 = 43_200;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub exchange: ExchangeConfig,
    pub order: OrderConfig,
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// REST API base URL
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderConfig {
    /// Currency pair id (0 = BTC_JPY, 1 = ETH_JPY, 2 = FX_BTC_JPY, 3 = ETH_BTC, 4 = BCH_BTC)
    pub product: i64,
    /// Pricing strategy id (0 = best ask, 1 = last trade discount)
    pub strategy: i64,
    /// Quote currency to spend per order
    pub budget: f64,
    /// Minimum order size of the product
    pub min_size: f64,
    /// Decimal places kept in the order size
    pub size_places: u32,
    /// Order lifetime in minutes (4320 = 3 days)
    pub minute_to_expire: u32,
    /// Time-in-force id (0 = GTC, 1 = IOC, 2 = FOK)
    pub time_in_force: i64,
    /// Refuse orders whose price * size exceeds this amount
    #[serde(default)]
    pub max_notional: Option<f64>,
}

impl OrderConfig {
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::from_id(self.product)
    }

    pub fn pricing_strategy(&self) -> PricingStrategy {
        PricingStrategy::from_id(self.strategy)
    }

    pub fn tif(&self) -> TimeInForce {
        TimeInForce::from_id(self.time_in_force)
    }

    pub fn lot_rules(&self) -> LotRules {
        LotRules {
            min_size: self.min_size,
            size_places: self.size_places,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecretsConfig {
    /// Secret name holding the API key
    pub api_key_name: String,
    /// Secret name holding the API secret
    pub api_secret_name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PersistenceConfig {
    /// JSON-lines file observed quotes are appended to
    #[serde(default)]
    pub quote_log: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Sources, later ones win:
    /// 1. built-in defaults
    /// 2. `config/default.toml` (optional)
    /// 3. `config_file` if given (required)
    /// 4. `BTC_BUYER__*` environment variables, e.g. `BTC_BUYER__ORDER__BUDGET=5000`
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let builder = builder.add_source(
            Environment::with_prefix("BTC_BUYER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Builder pre-filled with default values
    pub fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("exchange.base_url", BITFLYER_API_BASE)?
            .set_default("order.product", 0)?
            .set_default("order.strategy", 1)?
            .set_default("order.budget", 10_000.0)?
            .set_default("order.min_size", 0.001)?
            .set_default("order.size_places", 4)?
            .set_default("order.minute_to_expire", 4320)?
            .set_default("order.time_in_force", 0)?
            .set_default("secrets.api_key_name", "purchase_btc-api-key")?
            .set_default("secrets.api_secret_name", "purchase_btc-api-secret")?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        let order = &self.order;

        if !(order.budget.is_finite() && order.budget > 0.0) {
            errors.push(format!("order.budget must be positive, got {}", order.budget));
        }
        if !(order.min_size.is_finite() && order.min_size > 0.0) {
            errors.push(format!("order.min_size must be positive, got {}", order.min_size));
        }
        if order.size_places > 8 {
            errors.push(format!("order.size_places must be at most 8, got {}", order.size_places));
        }
        if order.minute_to_expire == 0 || order.minute_to_expire > MAX_MINUTE_TO_EXPIRE {
            errors.push(format!(
                "order.minute_to_expire must be within 1..={}, got {}",
                MAX_MINUTE_TO_EXPIRE, order.minute_to_expire
            ));
        }
        if let Some(limit) = order.max_notional {
            if !(limit.is_finite() && limit > 0.0) {
                errors.push(format!("order.max_notional must be positive, got {}", limit));
            }
        }
        if self.exchange.base_url.is_empty() {
            errors.push("exchange.base_url must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(BotError::Configuration(errors.join("; ")))
        }
    }
}
