use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::bookings::PriceBreakdown;
use crate::models::currency::CurrencyAmount;

/// Fixed fee line items added on top of the nightly base price.
///
/// The amounts are denominated in the same currency as the nightly rate they
/// are applied to. The defaults match the marketplace's NGN fee sheet;
/// whether non-NGN listings should carry different amounts is a product
/// decision, which is why the schedule is an explicit table instead of
/// inline constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub cleaning_fee: f64,
    pub service_fee: f64,
    pub taxes: f64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            cleaning_fee: 5000.0,
            service_fee: 15000.0,
            taxes: 210.0,
        }
    }
}

impl FeeSchedule {
    /// Create a schedule from environment variables or use defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cleaning_fee: std::env::var("BOOKING_CLEANING_FEE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cleaning_fee),
            service_fee: std::env::var("BOOKING_SERVICE_FEE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.service_fee),
            taxes: std::env::var("BOOKING_TAXES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.taxes),
        }
    }
}

/// Fee schedules keyed by listing currency, with a fallback schedule for
/// currencies that have no override of their own.
#[derive(Debug, Clone, Default)]
pub struct FeeTable {
    default: FeeSchedule,
    overrides: HashMap<String, FeeSchedule>,
}

impl FeeTable {
    pub fn new(default: FeeSchedule) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(FeeSchedule::from_env())
    }

    pub fn with_override(mut self, currency: impl Into<String>, schedule: FeeSchedule) -> Self {
        self.overrides.insert(currency.into(), schedule);
        self
    }

    pub fn fees_for(&self, currency: &str) -> &FeeSchedule {
        self.overrides.get(currency).unwrap_or(&self.default)
    }
}

pub struct PricingService;

impl PricingService {
    /// Compose the itemized price for a stay.
    ///
    /// Zero nights is the defined unpriced state and yields an all-zero
    /// breakdown; no partial totals are ever produced. For a fixed
    /// non-negative rate the total never decreases as nights grow, and the
    /// same inputs always produce the same breakdown.
    pub fn breakdown(rate: &CurrencyAmount, nights: u32, fees: &FeeSchedule) -> PriceBreakdown {
        if nights == 0 {
            return PriceBreakdown::empty(rate.currency.clone(), rate.amount);
        }

        let base_price = rate.amount * nights as f64;
        let total = base_price + fees.cleaning_fee + fees.service_fee + fees.taxes;

        PriceBreakdown {
            currency: rate.currency.clone(),
            nightly_rate: rate.amount,
            nights,
            base_price,
            cleaning_fee: fees.cleaning_fee,
            service_fee: fees.service_fee,
            taxes: fees.taxes,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(amount: f64) -> CurrencyAmount {
        CurrencyAmount::new(amount, "NGN")
    }

    #[test]
    fn test_breakdown_formula() {
        let fees = FeeSchedule::default();
        let breakdown = PricingService::breakdown(&rate(20000.0), 4, &fees);

        assert_eq!(breakdown.nights, 4);
        assert_eq!(breakdown.base_price, 80000.0);
        assert_eq!(breakdown.cleaning_fee, 5000.0);
        assert_eq!(breakdown.service_fee, 15000.0);
        assert_eq!(breakdown.taxes, 210.0);
        assert_eq!(breakdown.total, 100210.0);
        assert_eq!(breakdown.currency, "NGN");
    }

    #[test]
    fn test_zero_nights_is_all_zero() {
        let fees = FeeSchedule::default();
        let breakdown = PricingService::breakdown(&rate(20000.0), 0, &fees);

        assert_eq!(breakdown.base_price, 0.0);
        assert_eq!(breakdown.cleaning_fee, 0.0);
        assert_eq!(breakdown.service_fee, 0.0);
        assert_eq!(breakdown.taxes, 0.0);
        assert_eq!(breakdown.total, 0.0);
    }

    #[test]
    fn test_breakdown_is_idempotent() {
        let fees = FeeSchedule::default();
        let first = PricingService::breakdown(&rate(33500.5), 3, &fees);
        let second = PricingService::breakdown(&rate(33500.5), 3, &fees);
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_monotonic_in_nights() {
        let fees = FeeSchedule::default();
        let mut previous = 0.0;
        for nights in 0..30 {
            let total = PricingService::breakdown(&rate(12500.0), nights, &fees).total;
            assert!(total >= previous, "total decreased at {} nights", nights);
            previous = total;
        }
    }

    #[test]
    fn test_fee_table_override() {
        let table = FeeTable::new(FeeSchedule::default()).with_override(
            "USD",
            FeeSchedule {
                cleaning_fee: 40.0,
                service_fee: 25.0,
                taxes: 3.5,
            },
        );

        assert_eq!(table.fees_for("USD").cleaning_fee, 40.0);
        // No override falls back to the default schedule
        assert_eq!(table.fees_for("NGN").cleaning_fee, 5000.0);
        assert_eq!(table.fees_for("GBP").service_fee, 15000.0);
    }
}
