use serde::{Deserialize, Serialize};

/// A decimal value tagged with the ISO currency code it is denominated in.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CurrencyAmount {
    pub amount: f64,
    pub currency: String,
}

impl CurrencyAmount {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}
