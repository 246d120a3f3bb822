// Pricing strategy module
use crate::execution::sizing::{compute_quantity, round_price};
use crate::models::Quote;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Fraction of the last traded price bid by `LastTradeDiscount`
pub const LAST_TRADE_DISCOUNT_RATE: f64 = 0.985;

/// Minimum lot and quantity precision of an instrument
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LotRules {
    pub min_size: f64,
    pub size_places: u32,
}

impl Default for LotRules {
    fn default() -> Self {
        Self {
            min_size: 0.001, // BTC_JPY minimum order
            size_places: 4,
        }
    }
}

/// Limit price and size chosen for one order
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct OrderPlan {
    pub price: f64,
    pub size: f64,
}

impl OrderPlan {
    /// Quote-currency value of the order
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}

/// How the limit price is derived from a quote
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PricingStrategy {
    /// Bid at the current best ask (id 0)
    BestAsk,
    /// Bid 1.5% under the last traded price (id 1)
    #[default]
    LastTradeDiscount,
}

impl PricingStrategy {
    /// Resolve a strategy id; unknown ids fall back to `BestAsk`
    pub fn from_id(id: i64) -> Self {
        match id {
            0 => PricingStrategy::BestAsk,
            1 => PricingStrategy::LastTradeDiscount,
            other => {
                tracing::warn!(id = other, fallback = "best-ask", "Unknown strategy id, using best ask");
                PricingStrategy::BestAsk
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PricingStrategy::BestAsk => "best-ask",
            PricingStrategy::LastTradeDiscount => "last-trade-discount",
        }
    }

    /// Limit price for this strategy, rounded to a whole unit
    pub fn price(&self, quote: &Quote) -> f64 {
        match self {
            PricingStrategy::BestAsk => round_price(quote.best_ask),
            PricingStrategy::LastTradeDiscount => round_price(quote.ltp * LAST_TRADE_DISCOUNT_RATE),
        }
    }

    /// Compute price and size for spending `budget` against `quote`
    pub fn plan(&self, budget: f64, quote: &Quote, lot: &LotRules) -> Result<OrderPlan> {
        let price = self.price(quote);
        let size = compute_quantity(price, budget, lot.min_size, lot.size_places)?;

        tracing::debug!(
            strategy = self.name(),
            price,
            size,
            "Planned order"
        );

        Ok(OrderPlan { price, size })
    }
}
