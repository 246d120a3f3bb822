use std::sync::Arc;

use serde::Serialize;

use crate::api::{HttpTransport, MarketDataClient, OrderClient};
use crate::config::AppConfig;
use crate::error::{BotError, Result};
use crate::models::{CurrencyPair, OrderAcceptance, OrderKind, OrderRequest, Quote, Side, TimeInForce};
use crate::persistence::{JsonLinesQuoteLog, QuoteLog};
use crate::secrets::{load_credentials, SecretProvider};
use crate::strategy::{LotRules, OrderPlan, PricingStrategy};

/// What to buy and how
#[derive(Debug, Clone)]
pub struct PurchaseSettings {
    pub pair: CurrencyPair,
    pub strategy: PricingStrategy,
    pub budget: f64,
    pub lot: LotRules,
    pub minute_to_expire: u32,
    pub time_in_force: TimeInForce,
    pub max_notional: Option<f64>,
    pub api_key_name: String,
    pub api_secret_name: String,
}

impl PurchaseSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            pair: config.order.pair(),
            strategy: config.order.pricing_strategy(),
            budget: config.order.budget,
            lot: config.order.lot_rules(),
            minute_to_expire: config.order.minute_to_expire,
            time_in_force: config.order.tif(),
            max_notional: config.order.max_notional,
            api_key_name: config.secrets.api_key_name.clone(),
            api_secret_name: config.secrets.api_secret_name.clone(),
        }
    }
}

impl Default for PurchaseSettings {
    fn default() -> Self {
        Self {
            pair: CurrencyPair::BtcJpy,
            strategy: PricingStrategy::default(),
            budget: 10_000.0,
            lot: LotRules::default(),
            minute_to_expire: 4320, // 3 days
            time_in_force: TimeInForce::GoodTilCanceled,
            max_notional: None,
            api_key_name: "purchase_btc-api-key".to_string(),
            api_secret_name: "purchase_btc-api-secret".to_string(),
        }
    }
}

/// Response handed back to whatever triggered the invocation
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvocationResponse {
    pub body: String,
    pub status_code: u16,
}

impl InvocationResponse {
    pub fn accepted(acceptance: &OrderAcceptance) -> Self {
        Self {
            body: serde_json::to_string(acceptance)
                .unwrap_or_else(|_| acceptance.child_order_acceptance_id.clone()),
            status_code: 200,
        }
    }

    pub fn failed(err: &BotError) -> Self {
        Self {
            body: err.to_string(),
            status_code: 400,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// One purchase: quote -> credentials -> price/size -> limit order
///
/// Holds no state between invocations; build one per activation.
pub struct PurchaseWorkflow {
    order_base_url: String,
    transport: HttpTransport,
    market: MarketDataClient,
    secrets: Arc<dyn SecretProvider>,
    quote_log: Option<Arc<dyn QuoteLog>>,
    settings: PurchaseSettings,
}

impl PurchaseWorkflow {
    pub fn new(
        base_url: impl Into<String>,
        secrets: Arc<dyn SecretProvider>,
        settings: PurchaseSettings,
    ) -> Self {
        let base_url = base_url.into();
        let transport = HttpTransport::new();
        Self {
            market: MarketDataClient::with_base_url(base_url.clone()).with_transport(transport.clone()),
            order_base_url: base_url,
            transport,
            secrets,
            quote_log: None,
            settings,
        }
    }

    pub fn from_config(config: &AppConfig, secrets: Arc<dyn SecretProvider>) -> Self {
        let workflow = Self::new(
            config.exchange.base_url.clone(),
            secrets,
            PurchaseSettings::from_config(config),
        );

        match &config.persistence.quote_log {
            Some(path) => workflow.with_quote_log(Arc::new(JsonLinesQuoteLog::new(path.clone()))),
            None => workflow,
        }
    }

    /// Send orders to a different host than market data
    pub fn with_order_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.order_base_url = base_url.into();
        self
    }

    pub fn with_quote_log(mut self, quote_log: Arc<dyn QuoteLog>) -> Self {
        self.quote_log = Some(quote_log);
        self
    }

    pub fn settings(&self) -> &PurchaseSettings {
        &self.settings
    }

    /// Run once and map the outcome to a status code and body
    pub async fn handle(&self) -> InvocationResponse {
        match self.run().await {
            Ok(acceptance) => InvocationResponse::accepted(&acceptance),
            Err(e) => {
                tracing::error!(error = %e, "Purchase failed");
                InvocationResponse::failed(&e)
            }
        }
    }

    /// Fetch a quote, resolve credentials and place one limit buy order
    pub async fn run(&self) -> Result<OrderAcceptance> {
        let settings = &self.settings;

        tracing::info!(
            pair = %settings.pair,
            strategy = settings.strategy.name(),
            budget = settings.budget,
            "Starting purchase"
        );

        // Quote fetch runs on its own task while secrets are resolved
        let ticker = self.market.spawn_ticker(settings.pair);
        let credentials = load_credentials(
            self.secrets.as_ref(),
            &settings.api_key_name,
            &settings.api_secret_name,
        )
        .await;

        // A failed quote stops everything before any signing happens
        let quote = ticker.join().await?;
        let credentials = credentials?;

        self.record_quote(&quote).await;

        let plan = self.plan(&quote)?;
        let order = self.build_order(&plan);

        let client = OrderClient::with_base_url(self.order_base_url.clone(), credentials)
            .with_transport(self.transport.clone());

        client.place_order(order).await
    }

    /// Fetch a quote and compute the order without submitting anything
    pub async fn preview(&self) -> Result<(Quote, OrderPlan)> {
        let quote = self.market.get_ticker(self.settings.pair).await?;
        let plan = self.plan(&quote)?;
        Ok((quote, plan))
    }

    /// Price and size for `quote`, checked against the notional limit
    pub fn plan(&self, quote: &Quote) -> Result<OrderPlan> {
        let settings = &self.settings;
        let plan = settings.strategy.plan(settings.budget, quote, &settings.lot)?;

        if let Some(limit) = settings.max_notional {
            let notional = plan.notional();
            if notional > limit {
                return Err(BotError::Configuration(format!(
                    "order notional {:.2} exceeds max_notional {:.2} (price {}, size {})",
                    notional, limit, plan.price, plan.size
                )));
            }
        }

        tracing::info!(
            strategy = settings.strategy.name(),
            ltp = quote.ltp,
            best_ask = quote.best_ask,
            price = plan.price,
            size = plan.size,
            "Order planned"
        );

        Ok(plan)
    }

    fn build_order(&self, plan: &OrderPlan) -> OrderRequest {
        OrderRequest {
            pair: self.settings.pair,
            kind: OrderKind::Limit,
            side: Side::Buy,
            price: plan.price,
            size: plan.size,
            minute_to_expire: self.settings.minute_to_expire,
            time_in_force: self.settings.time_in_force,
        }
    }

    async fn record_quote(&self, quote: &Quote) {
        if let Some(log) = &self.quote_log {
            if let Err(e) = log.append(quote).await {
                tracing::warn!(error = %e, "Failed to record quote, continuing");
            }
        }
    }
}
