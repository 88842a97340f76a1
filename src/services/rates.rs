use std::collections::HashMap;

use serde::Deserialize;

use crate::services::currency_service::{CurrencyState, RateTable};

/// Wire shape of the exchange-rate feed: a base code plus how much base one
/// unit of each listed currency is worth.
#[derive(Debug, Deserialize)]
struct RatesFeed {
    base: String,
    rates: HashMap<String, f64>,
}

pub async fn fetch_rate_table(url: &str) -> Result<RateTable, reqwest::Error> {
    let feed = reqwest::Client::new()
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<RatesFeed>()
        .await?;

    Ok(RateTable::with_rates(feed.base, feed.rates))
}

/// Build the process-wide currency state at startup.
///
/// A configured feed is fetched once and installed as a whole table; if the
/// fetch fails the built-in table stays so the API still serves quotes.
/// Conversions themselves never perform I/O.
pub async fn load_currency_state() -> CurrencyState {
    let table = match std::env::var("EXCHANGE_RATES_URL") {
        Ok(url) => match fetch_rate_table(&url).await {
            Ok(table) => {
                println!(
                    "Loaded exchange rates from feed: {} currencies, base {}",
                    table.codes().len(),
                    table.base
                );
                table
            }
            Err(e) => {
                eprintln!("WARNING: exchange-rate feed fetch failed: {}", e);
                eprintln!("Falling back to the built-in rate table");
                RateTable::default()
            }
        },
        Err(_) => RateTable::default(),
    };

    CurrencyState::new(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_shape_deserializes() {
        let feed: RatesFeed = serde_json::from_str(
            r#"{"base":"USD","rates":{"NGN":0.00067,"USD":1.0,"GBP":1.27}}"#,
        )
        .unwrap();
        assert_eq!(feed.base, "USD");
        assert_eq!(feed.rates.len(), 3);

        let table = RateTable::with_rates(feed.base, feed.rates);
        assert_eq!(table.codes(), vec!["GBP", "NGN", "USD"]);
    }
}
