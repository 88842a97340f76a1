use std::fmt;

use chrono::NaiveDate;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Lifecycle status of a booking. Stored as a lowercase string; anything a
/// newer writer may have put in the field deserializes to `Unknown` instead
/// of failing the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Itemized decomposition of a booking's total cost. Persisted with the
/// booking so the amount charged can always be reconstructed line by line.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PriceBreakdown {
    pub currency: String,
    pub nightly_rate: f64,
    pub nights: u32,
    pub base_price: f64,
    pub cleaning_fee: f64,
    pub service_fee: f64,
    pub taxes: f64,
    pub total: f64,
}

impl PriceBreakdown {
    /// The defined unpriced state: no valid stay, every computed field zero.
    pub fn empty(currency: impl Into<String>, nightly_rate: f64) -> Self {
        Self {
            currency: currency.into(),
            nightly_rate,
            nights: 0,
            base_price: 0.0,
            cleaning_fee: 0.0,
            service_fee: 0.0,
            taxes: 0.0,
            total: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub property_id: ObjectId,
    pub guest_name: String,
    pub guest_email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub breakdown: PriceBreakdown,
    pub currency: String,
    pub customer_id: Option<String>,
    pub transaction_id: Option<String>,
    pub status: BookingStatus,
    /// Bumped on every status mutation; stale writers lose the
    /// compare-and-swap and get a conflict instead of clobbering.
    pub version: i64,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookingInput {
    #[validate(length(min = 1))]
    pub guest_name: String,
    #[validate(email)]
    pub guest_email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, max = 10))]
    pub guests: u32,
    pub customer_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutInput {
    #[validate(length(min = 1))]
    pub guest_name: String,
    #[validate(email)]
    pub guest_email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, max = 10))]
    pub guests: u32,
    pub customer_id: String,
    pub payment_intent_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateInput {
    pub status: BookingStatus,
    /// Version the caller last read; the update only applies if it still
    /// matches.
    pub version: i64,
}
