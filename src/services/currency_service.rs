use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// A currency code with no rate or formatting rule in the active table.
/// Callers decide whether to fall back or propagate; nothing in here ever
/// substitutes a default symbol silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCurrencyError {
    pub code: String,
}

impl UnknownCurrencyError {
    fn new(code: &str) -> Self {
        Self {
            code: code.to_string(),
        }
    }
}

impl fmt::Display for UnknownCurrencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown currency code: {}", self.code)
    }
}

impl std::error::Error for UnknownCurrencyError {}

/// Per-currency display rules: symbol and standard minor-unit precision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencySpec {
    pub symbol: String,
    pub minor_units: u8,
}

impl CurrencySpec {
    pub fn new(symbol: &str, minor_units: u8) -> Self {
        Self {
            symbol: symbol.to_string(),
            minor_units,
        }
    }
}

/// Immutable snapshot of exchange rates and display rules.
///
/// `rates` maps a currency code to the number of base-currency units one
/// unit of that currency is worth, so `NGN: 0.00067` with a USD base means
/// one naira is 0.067 US cents.
#[derive(Debug, Clone)]
pub struct RateTable {
    pub base: String,
    rates: HashMap<String, f64>,
    specs: HashMap<String, CurrencySpec>,
}

impl Default for RateTable {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), 1.0);
        rates.insert("NGN".to_string(), 0.00067);
        rates.insert("GBP".to_string(), 1.27);
        rates.insert("EUR".to_string(), 1.08);

        Self {
            base: "USD".to_string(),
            rates,
            specs: Self::default_specs(),
        }
    }
}

impl RateTable {
    /// Table built from an external rate feed, keeping the built-in display
    /// rules for the codes we know how to render.
    pub fn with_rates(base: String, rates: HashMap<String, f64>) -> Self {
        Self {
            base,
            rates,
            specs: Self::default_specs(),
        }
    }

    fn default_specs() -> HashMap<String, CurrencySpec> {
        let mut specs = HashMap::new();
        specs.insert("NGN".to_string(), CurrencySpec::new("₦", 0));
        specs.insert("USD".to_string(), CurrencySpec::new("$", 2));
        specs.insert("GBP".to_string(), CurrencySpec::new("£", 2));
        specs.insert("EUR".to_string(), CurrencySpec::new("€", 2));
        specs
    }

    pub fn insert_rate(&mut self, code: &str, rate: f64) {
        self.rates.insert(code.to_string(), rate);
    }

    pub fn insert_spec(&mut self, code: &str, spec: CurrencySpec) {
        self.specs.insert(code.to_string(), spec);
    }

    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

/// Pure conversion and formatting over one immutable `RateTable`.
pub struct CurrencyConverter {
    table: RateTable,
}

impl CurrencyConverter {
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    pub fn rate(&self, code: &str) -> Result<f64, UnknownCurrencyError> {
        self.table
            .rates
            .get(code)
            .copied()
            .ok_or_else(|| UnknownCurrencyError::new(code))
    }

    pub fn spec(&self, code: &str) -> Result<&CurrencySpec, UnknownCurrencyError> {
        self.table
            .specs
            .get(code)
            .ok_or_else(|| UnknownCurrencyError::new(code))
    }

    /// Convert an amount between currencies through the base currency.
    ///
    /// Same-currency conversion short-circuits to the input value so a no-op
    /// conversion can never accumulate floating-point error.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, UnknownCurrencyError> {
        if from == to {
            return Ok(amount);
        }

        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        Ok(amount * from_rate / to_rate)
    }

    /// Render an amount with the currency's symbol, thousands grouping and
    /// standard minor-unit precision. Ties round half-up (away from zero).
    pub fn format(&self, amount: f64, code: &str) -> Result<String, UnknownCurrencyError> {
        let spec = self.spec(code)?;
        let rounded = round_to(amount, spec.minor_units);

        let rendered = format!("{:.*}", spec.minor_units as usize, rounded.abs());
        let (int_part, frac_part) = match rendered.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (rendered.as_str(), None),
        };

        let mut out = String::new();
        if rounded < 0.0 {
            out.push('-');
        }
        out.push_str(&spec.symbol);
        out.push_str(&group_thousands(int_part));
        if let Some(frac) = frac_part {
            out.push('.');
            out.push_str(frac);
        }
        Ok(out)
    }

    /// Integer minor units for the payment-provider boundary (e.g. cents
    /// for USD, whole naira for NGN).
    pub fn to_minor_units(&self, amount: f64, code: &str) -> Result<i64, UnknownCurrencyError> {
        let spec = self.spec(code)?;
        let factor = 10f64.powi(spec.minor_units as i32);
        Ok((amount * factor).round() as i64)
    }
}

fn round_to(amount: f64, minor_units: u8) -> f64 {
    let factor = 10f64.powi(minor_units as i32);
    // f64::round is round-half-away-from-zero, the documented tie rule
    (amount * factor).round() / factor
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && i % 3 == offset {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Process-wide holder for the active rate table.
///
/// Readers take an `Arc` snapshot and compute against it; a refresh installs
/// a whole new converter in one swap, so an in-flight request sees either
/// the old table or the new one in full, never a mix.
pub struct CurrencyState {
    inner: RwLock<Arc<CurrencyConverter>>,
}

impl CurrencyState {
    pub fn new(table: RateTable) -> Self {
        Self {
            inner: RwLock::new(Arc::new(CurrencyConverter::new(table))),
        }
    }

    pub fn snapshot(&self) -> Arc<CurrencyConverter> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn install(&self, table: RateTable) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(CurrencyConverter::new(table));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter() -> CurrencyConverter {
        CurrencyConverter::new(RateTable::default())
    }

    #[test]
    fn test_same_currency_is_identity() {
        let c = converter();
        assert_eq!(c.convert(1234.56, "NGN", "NGN").unwrap(), 1234.56);
        assert_eq!(c.convert(0.0, "USD", "USD").unwrap(), 0.0);
        // Identity holds even for codes the table has never heard of
        assert_eq!(c.convert(99.0, "XXX", "XXX").unwrap(), 99.0);
    }

    #[test]
    fn test_conversion_through_base() {
        let c = converter();
        let usd = c.convert(100210.0, "NGN", "USD").unwrap();
        assert!((usd - 67.1407).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let c = converter();
        for amount in [0.01, 1.0, 999.99, 123456.78] {
            let there = c.convert(amount, "GBP", "NGN").unwrap();
            let back = c.convert(there, "NGN", "GBP").unwrap();
            assert!((back - amount).abs() < 1e-6, "round trip drifted: {}", amount);
        }
    }

    #[test]
    fn test_unknown_currency_names_the_code() {
        let c = converter();
        let err = c.convert(10.0, "NGN", "ZZZ").unwrap_err();
        assert_eq!(err.code, "ZZZ");
        assert_eq!(err.to_string(), "unknown currency code: ZZZ");

        let err = c.format(10.0, "ABC").unwrap_err();
        assert_eq!(err.code, "ABC");
    }

    #[test]
    fn test_format_ngn_whole_units_half_up() {
        let c = converter();
        assert_eq!(c.format(1234.5, "NGN").unwrap(), "₦1,235");
        assert_eq!(c.format(100210.0, "NGN").unwrap(), "₦100,210");
        assert_eq!(c.format(999.4, "NGN").unwrap(), "₦999");
    }

    #[test]
    fn test_format_two_minor_units() {
        let c = converter();
        assert_eq!(c.format(67.1407, "USD").unwrap(), "$67.14");
        assert_eq!(c.format(67.146, "USD").unwrap(), "$67.15");
        assert_eq!(c.format(1234567.891, "GBP").unwrap(), "£1,234,567.89");
        assert_eq!(c.format(0.5, "EUR").unwrap(), "€0.50");
    }

    #[test]
    fn test_format_negative_amount() {
        let c = converter();
        assert_eq!(c.format(-1234.5, "USD").unwrap(), "-$1,234.50");
    }

    #[test]
    fn test_to_minor_units() {
        let c = converter();
        assert_eq!(c.to_minor_units(67.14, "USD").unwrap(), 6714);
        assert_eq!(c.to_minor_units(100210.0, "NGN").unwrap(), 100210);
        assert_eq!(c.to_minor_units(10.006, "GBP").unwrap(), 1001);
    }

    #[test]
    fn test_snapshot_survives_install() {
        let state = CurrencyState::new(RateTable::default());
        let before = state.snapshot();

        let mut table = RateTable::default();
        table.insert_rate("NGN", 0.001);
        state.install(table);

        // The old snapshot still computes against the old table
        assert!((before.convert(1000.0, "NGN", "USD").unwrap() - 0.67).abs() < 1e-9);
        // A fresh snapshot sees the new table in full
        let after = state.snapshot();
        assert!((after.convert(1000.0, "NGN", "USD").unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_codes_are_sorted() {
        let table = RateTable::default();
        assert_eq!(table.codes(), vec!["EUR", "GBP", "NGN", "USD"]);
    }
}
