use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

use crate::error::PriceFeedError;

/// A price change pushed to connected clients.
///
/// Wire form is `"<item_id>:<price>"` with exactly two fractional digits,
/// rounded half-up on the shortest decimal form of the price.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEvent {
    pub item_id: String,
    pub new_price: f64,
}

impl PriceEvent {
    pub fn new(item_id: impl Into<String>, new_price: f64) -> Self {
        Self {
            item_id: item_id.into(),
            new_price,
        }
    }

    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PriceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.item_id, format_price(self.new_price))
    }
}

/// Two-decimal price text. `1.005` is `"1.01"`, not the `"1.00"` its binary
/// value would round to.
fn format_price(price: f64) -> String {
    match Decimal::from_str(&price.to_string()) {
        Ok(value) => format!(
            "{:.2}",
            value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
        // NaN, infinities and magnitudes beyond Decimal's range
        Err(_) => format!("{:.2}", price),
    }
}

impl FromStr for PriceEvent {
    type Err = PriceFeedError;

    /// Parse the wire form. The id is everything before the last `:`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (item_id, price) = raw.rsplit_once(':').ok_or_else(|| {
            PriceFeedError::InvalidInput(format!("Missing ':' separator in '{}'", raw))
        })?;

        if item_id.is_empty() {
            return Err(PriceFeedError::InvalidInput(format!(
                "Missing item id in '{}'",
                raw
            )));
        }

        let new_price = price
            .trim()
            .parse::<f64>()
            .map_err(|_| PriceFeedError::InvalidPrice(price.to_string()))?;

        Ok(Self::new(item_id, new_price))
    }
}
