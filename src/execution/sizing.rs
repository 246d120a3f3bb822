use crate::error::{BotError, Result};

/// Round to the nearest whole currency unit, halves away from zero
pub fn round_price(value: f64) -> f64 {
    value.round()
}

/// Calculate the order quantity a budget buys at `price`
///
/// The raw quantity is rounded (not floored) to `places` decimal digits.
/// Quantities below the exchange minimum are raised to `min_quantity`
/// instead of being rejected. No upper bound is applied here.
///
/// # Arguments
/// * `price` - Limit price in quote currency, must be > 0
/// * `budget` - Amount of quote currency to spend
/// * `min_quantity` - Minimum tradable size of the instrument
/// * `places` - Decimal digits kept in the quantity
pub fn compute_quantity(price: f64, budget: f64, min_quantity: f64, places: u32) -> Result<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(BotError::InvalidPrice(price));
    }
    if !budget.is_finite() {
        return Err(BotError::Configuration(format!("budget must be finite, got {}", budget)));
    }
    if !min_quantity.is_finite() {
        return Err(BotError::Configuration(format!(
            "minimum quantity must be finite, got {}",
            min_quantity
        )));
    }

    let exponent = i32::try_from(places)
        .map_err(|_| BotError::Configuration(format!("size places out of range: {}", places)))?;
    let shift = 10f64.powi(exponent);
    let quantity = (budget / price * shift).round() / shift;

    // NaN-aware: anything not at or above the minimum falls back to it
    if !(quantity >= min_quantity) {
        tracing::debug!(
            quantity,
            min_quantity,
            "Quantity below minimum lot, using minimum"
        );
        Ok(min_quantity)
    } else {
        Ok(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_places() {
        // 10_000 / 3_000_000 = 0.003333...
        let qty = compute_quantity(3_000_000.0, 10_000.0, 0.001, 4).unwrap();
        assert_eq!(qty, 0.0033);
    }

    #[test]
    fn test_minimum_lot_applies() {
        // 10_000 / 20_000_000 = 0.0005 < 0.001
        let qty = compute_quantity(20_000_000.0, 10_000.0, 0.001, 4).unwrap();
        assert_eq!(qty, 0.001);
    }

    #[test]
    fn test_rounds_instead_of_flooring() {
        // 10_000 / 1_500_000 = 0.0066666... -> 0.0067
        let qty = compute_quantity(1_500_000.0, 10_000.0, 0.001, 4).unwrap();
        assert_eq!(qty, 0.0067);
    }

    #[test]
    fn test_zero_places() {
        let qty = compute_quantity(3.0, 10.0, 1.0, 0).unwrap();
        assert_eq!(qty, 3.0);
    }

    #[test]
    fn test_invalid_price_rejected() {
        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = compute_quantity(price, 10_000.0, 0.001, 4);
            assert!(
                matches!(result, Err(BotError::InvalidPrice(_))),
                "price {} should be rejected",
                price
            );
        }
    }

    #[test]
    fn test_never_below_minimum() {
        let prices = [1.0, 250.0, 9_999.0, 3_000_000.0, 12_345_678.0, 90_000_000.0];
        let budgets = [0.0, 1.0, 500.0, 10_000.0, 250_000.0];

        for price in prices {
            for budget in budgets {
                let qty = compute_quantity(price, budget, 0.001, 4).unwrap();
                assert!(qty >= 0.001, "price={} budget={} qty={}", price, budget, qty);
            }
        }

        for budget in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = compute_quantity(3_000_000.0, budget, 0.001, 4);
            assert!(
                matches!(result, Err(BotError::Configuration(_))),
                "budget {} should be rejected",
                budget
            );
        }

        let result = compute_quantity(3_000_000.0, 10_000.0, f64::NAN, 4);
        assert!(matches!(result, Err(BotError::Configuration(_))));
    }

    #[test]
    fn test_places_out_of_range_rejected() {
        let result = compute_quantity(3_000_000.0, 10_000.0, 0.001, u32::MAX);
        assert!(matches!(result, Err(BotError::Configuration(msg)) if msg.contains("size places")));

        // Largest usable exponent still sizes normally
        let qty = compute_quantity(3_000_000.0, 10_000.0, 0.001, 8).unwrap();
        assert_eq!(qty, 0.00333333);
    }

    #[test]
    fn test_monotonic_in_budget() {
        let price = 4_321_987.0;
        let mut previous = 0.0;

        for step in 0..200 {
            let budget = step as f64 * 1_000.0;
            let qty = compute_quantity(price, budget, 0.001, 4).unwrap();
            assert!(
                qty >= previous,
                "quantity decreased at budget {}: {} < {}",
                budget,
                qty,
                previous
            );
            previous = qty;
        }
    }

    #[test]
    fn test_round_price_half_away_from_zero() {
        assert_eq!(round_price(2.5), 3.0);
        assert_eq!(round_price(3_045_123.4), 3_045_123.0);
        assert_eq!(round_price(3_045_123.5), 3_045_124.0);
        assert_eq!(round_price(-2.5), -3.0);
    }
}
