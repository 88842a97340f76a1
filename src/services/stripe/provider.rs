use std::str::FromStr;

use stripe::{
    CapturePaymentIntent, CreatePaymentIntent, CustomerId, PaymentIntent, PaymentIntentCaptureMethod,
    PaymentIntentId, PaymentMethodId,
};

use crate::services::payment::interface::{PaymentError, PaymentOperations};

pub struct StripeProvider {
    pub client: stripe::Client,
}

impl StripeProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: stripe::Client::new(api_key.into()),
        }
    }
}

fn stripe_currency(code: &str) -> Result<stripe::Currency, PaymentError> {
    match code.to_ascii_uppercase().as_str() {
        "NGN" => Ok(stripe::Currency::NGN),
        "USD" => Ok(stripe::Currency::USD),
        "GBP" => Ok(stripe::Currency::GBP),
        "EUR" => Ok(stripe::Currency::EUR),
        other => Err(PaymentError::UnsupportedCurrency(other.to_string())),
    }
}

impl PaymentOperations for StripeProvider {
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        customer_id: &str,
        payment_method_id: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let currency = stripe_currency(currency)?;

        let mut create_intent = CreatePaymentIntent::new(amount_minor, currency);
        create_intent.customer =
            Some(CustomerId::from_str(customer_id).map_err(|_| PaymentError::NotFound)?);
        create_intent.payment_method =
            Some(PaymentMethodId::from_str(payment_method_id).map_err(|_| PaymentError::NotFound)?);
        // Manual, as checkout captures only after the booking row exists
        create_intent.capture_method = Some(PaymentIntentCaptureMethod::Manual);

        PaymentIntent::create(&self.client, create_intent)
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentError> {
        let id = PaymentIntentId::from_str(intent_id).map_err(|_| PaymentError::NotFound)?;

        PaymentIntent::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))
    }

    async fn capture_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentError> {
        let intent = self.retrieve_intent(intent_id).await?;

        if intent.status != stripe::PaymentIntentStatus::RequiresCapture {
            return Err(PaymentError::InvalidState(format!(
                "payment intent status is {:?}, expected requires_capture",
                intent.status
            )));
        }

        PaymentIntent::capture(&self.client, intent_id, CapturePaymentIntent::default())
            .await
            .map_err(|e| PaymentError::Provider(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_supported_currency_codes() {
        assert_eq!(stripe_currency("ngn").unwrap(), stripe::Currency::NGN);
        assert_eq!(stripe_currency("USD").unwrap(), stripe::Currency::USD);
    }

    #[test]
    fn rejects_unsupported_currency_codes() {
        match stripe_currency("XAU") {
            Err(PaymentError::UnsupportedCurrency(code)) => assert_eq!(code, "XAU"),
            other => panic!("expected UnsupportedCurrency, got {:?}", other.map(|_| ())),
        }
    }
}
