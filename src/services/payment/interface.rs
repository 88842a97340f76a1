use std::fmt;

use stripe::PaymentIntent;

/// Only a booking's final total, already reduced to minor units, ever
/// crosses this boundary. Pricing never calls back into it.
#[derive(Debug)]
pub enum PaymentError {
    NotFound,
    InvalidState(String),
    UnsupportedCurrency(String),
    Provider(String),
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::NotFound => write!(f, "payment object not found"),
            PaymentError::InvalidState(s) => write!(f, "payment is not in a usable state: {}", s),
            PaymentError::UnsupportedCurrency(code) => {
                write!(f, "currency not supported by the payment provider: {}", code)
            }
            PaymentError::Provider(e) => write!(f, "payment provider error: {}", e),
        }
    }
}

pub trait PaymentOperations {
    /// Create a manual-capture intent for the given amount in minor units.
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<PaymentIntent, PaymentError>;

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentError>;

    async fn capture_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentError>;
}
