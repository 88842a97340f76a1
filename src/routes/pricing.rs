use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::bookings::PriceBreakdown;
use crate::models::currency::CurrencyAmount;
use crate::services::currency_service::{CurrencyConverter, CurrencyState, UnknownCurrencyError};
use crate::services::pricing_service::{FeeSchedule, FeeTable, PricingService};
use crate::services::stay_service::StayService;

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct QuoteInput {
    #[validate(range(min = 0.0))]
    pub nightly_rate: f64,
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    #[validate(range(min = 1, max = 10))]
    pub guests: u32,
    pub display_currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DisplayTotal {
    pub currency: String,
    pub amount: f64,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub quote_id: String,
    pub nights: u32,
    pub breakdown: PriceBreakdown,
    pub display: DisplayTotal,
}

/// One place composes nights -> breakdown -> conversion -> formatting, so
/// the stand-alone quote and the per-property quote can never drift apart.
pub fn build_quote(
    converter: &CurrencyConverter,
    fees: &FeeSchedule,
    rate: &CurrencyAmount,
    nights: u32,
    display_currency: Option<String>,
) -> Result<QuoteResponse, UnknownCurrencyError> {
    let breakdown = PricingService::breakdown(rate, nights, fees);

    let display_code = display_currency.unwrap_or_else(|| rate.currency.clone());
    let amount = converter.convert(breakdown.total, &rate.currency, &display_code)?;
    let formatted = converter.format(amount, &display_code)?;

    Ok(QuoteResponse {
        quote_id: Uuid::new_v4().to_string(),
        nights,
        breakdown,
        display: DisplayTotal {
            currency: display_code,
            amount,
            formatted,
        },
    })
}

pub async fn create_quote(
    currency: web::Data<CurrencyState>,
    fees: web::Data<FeeTable>,
    input: web::Json<QuoteInput>,
) -> impl Responder {
    let input = input.into_inner();
    if let Err(e) = input.validate() {
        return HttpResponse::BadRequest().json(e);
    }

    // Zero nights is the unpriced state, not an error; the quote comes back
    // with every amount at zero and the UI prompts for dates.
    let nights = StayService::nights_opt(input.check_in, input.check_out);
    let rate = CurrencyAmount::new(input.nightly_rate, input.currency.clone());

    let converter = currency.snapshot();
    match build_quote(
        &converter,
        fees.fees_for(&input.currency),
        &rate,
        nights,
        input.display_currency,
    ) {
        Ok(quote) => HttpResponse::Ok().json(quote),
        Err(e) => HttpResponse::BadRequest().json(ErrorResponse {
            error: e.to_string(),
        }),
    }
}

#[derive(Debug, Serialize)]
pub struct CurrencyInfo {
    pub code: String,
    pub symbol: Option<String>,
    pub minor_units: Option<u8>,
    /// Base-currency units per one unit of this currency.
    pub rate: f64,
}

pub async fn get_currencies(currency: web::Data<CurrencyState>) -> impl Responder {
    let converter = currency.snapshot();
    let table = converter.table();

    let mut currencies = Vec::new();
    for code in table.codes() {
        let rate = match converter.rate(code) {
            Ok(rate) => rate,
            Err(_) => continue,
        };
        let spec = converter.spec(code).ok();
        currencies.push(CurrencyInfo {
            code: code.to_string(),
            symbol: spec.map(|s| s.symbol.clone()),
            minor_units: spec.map(|s| s.minor_units),
            rate,
        });
    }

    HttpResponse::Ok().json(serde_json::json!({
        "base": table.base,
        "currencies": currencies,
    }))
}
