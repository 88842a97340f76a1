use actix_web::{web, HttpRequest, HttpResponse, Responder};
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stripe::{EventObject, EventType, Webhook};

use crate::models::bookings::{Booking, BookingStatus};
use crate::services::booking_status::BookingStatusPolicy;
use crate::services::currency_service::CurrencyState;
use crate::services::payment::interface::{PaymentError, PaymentOperations};
use crate::services::stripe::provider::StripeProvider;

#[derive(Serialize, Deserialize)]
pub struct PaymentIntentInput {
    booking_id: String,
    customer_id: String,
    payment_method_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct CapturePayment {
    booking_id: String,
    payment_intent_id: String,
}

#[derive(Clone)]
pub struct StripeConfig {
    pub webhook_secret: String,
}

fn bookings(client: &Client) -> mongodb::Collection<Booking> {
    client.database("Rentals").collection("Bookings")
}

/// The amount sent to the provider is the booking's stored total reduced to
/// minor units; nothing from the client request influences it.
pub async fn create_payment_intent(
    mongodb_data: web::Data<Arc<Client>>,
    stripe_data: web::Data<Arc<StripeProvider>>,
    currency: web::Data<CurrencyState>,
    input: web::Json<PaymentIntentInput>,
) -> impl Responder {
    println!("Creating payment intent...");

    let client = mongodb_data.into_inner();
    let provider = stripe_data.into_inner();
    let input = input.into_inner();

    let booking_id = match ObjectId::parse_str(&input.booking_id) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid booking ID format");
        }
    };

    let collection = bookings(&client);
    let booking = match collection.find_one(doc! { "_id": booking_id }).await {
        Ok(Some(booking)) => booking,
        Ok(None) => return HttpResponse::NotFound().body("Booking not found"),
        Err(err) => {
            eprintln!("Error fetching booking: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch booking");
        }
    };

    if booking.status != BookingStatus::Pending {
        return HttpResponse::BadRequest().body(format!(
            "Only pending bookings can be paid for; this one is {}",
            booking.status
        ));
    }

    let converter = currency.snapshot();
    let amount_minor = match converter.to_minor_units(booking.breakdown.total, &booking.currency) {
        Ok(amount) => amount,
        Err(e) => {
            return HttpResponse::BadRequest().body(e.to_string());
        }
    };

    match provider
        .create_intent(
            amount_minor,
            &booking.currency,
            &input.customer_id,
            &input.payment_method_id,
        )
        .await
    {
        Ok(intent) => {
            let update = doc! {
                "$set": { "transaction_id": intent.id.to_string(), "updated_at": DateTime::now() }
            };
            if let Err(err) = collection.update_one(doc! { "_id": booking_id }, update).await {
                eprintln!("Error storing transaction id on booking: {:?}", err);
            }
            HttpResponse::Ok().json(intent)
        }
        Err(PaymentError::UnsupportedCurrency(code)) => HttpResponse::BadRequest()
            .body(format!("Currency not supported by payment provider: {}", code)),
        Err(PaymentError::NotFound) => {
            HttpResponse::BadRequest().body("Invalid customer or payment method ID")
        }
        Err(e) => {
            eprintln!("Error creating payment intent: {}", e);
            HttpResponse::InternalServerError()
                .body(format!("Failed to create payment intent: {}", e))
        }
    }
}

pub async fn capture_payment(
    mongodb_data: web::Data<Arc<Client>>,
    stripe_data: web::Data<Arc<StripeProvider>>,
    input: web::Json<CapturePayment>,
) -> impl Responder {
    println!("Capturing payment...");

    let client = mongodb_data.into_inner();
    let provider = stripe_data.into_inner();
    let input = input.into_inner();

    let booking_id = match ObjectId::parse_str(&input.booking_id) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid booking ID format");
        }
    };

    let collection = bookings(&client);
    let booking = match collection.find_one(doc! { "_id": booking_id }).await {
        Ok(Some(booking)) => booking,
        Ok(None) => return HttpResponse::NotFound().body("Booking not found"),
        Err(err) => {
            eprintln!("Error fetching booking: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch booking");
        }
    };

    // Capturing confirms the booking, so the transition must be legal first
    if let Err(e) = BookingStatusPolicy::check_transition(booking.status, BookingStatus::Confirmed)
    {
        return HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "error": e.to_string(),
            "allowed_actions": BookingStatusPolicy::allowed_actions(booking.status),
        }));
    }

    match provider.capture_intent(&input.payment_intent_id).await {
        Ok(captured_intent) => {
            let filter = doc! { "_id": booking_id, "version": booking.version };
            let update = doc! {
                "$set": {
                    "status": BookingStatus::Confirmed.as_str(),
                    "updated_at": DateTime::now(),
                },
                "$inc": { "version": 1 },
            };
            match collection.update_one(filter, update).await {
                Ok(result) if result.matched_count == 0 => {
                    HttpResponse::Conflict().json(serde_json::json!({
                        "error": "Booking was modified concurrently; re-read and retry",
                        "payment_intent": captured_intent,
                    }))
                }
                Ok(_) => HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "status": "confirmed",
                    "payment_intent": captured_intent,
                })),
                Err(err) => {
                    eprintln!("Error confirming booking after capture: {:?}", err);
                    HttpResponse::Ok().json(serde_json::json!({
                        "success": true,
                        "warning": "Payment captured, but failed to update booking status",
                        "payment_intent": captured_intent,
                    }))
                }
            }
        }
        Err(PaymentError::InvalidState(s)) => HttpResponse::BadRequest().body(s),
        Err(PaymentError::NotFound) => {
            HttpResponse::BadRequest().body("Invalid payment intent ID")
        }
        Err(e) => {
            eprintln!("Error capturing payment: {}", e);
            HttpResponse::InternalServerError().body(format!("Failed to capture payment: {}", e))
        }
    }
}

pub async fn handle_stripe_webhook(
    req: HttpRequest,
    payload: web::Bytes,
    mongodb_data: web::Data<Arc<Client>>,
    stripe_config: web::Data<StripeConfig>,
) -> impl Responder {
    let signature = match req.headers().get("stripe-signature") {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            return HttpResponse::BadRequest().body("Missing stripe-signature header");
        }
    };

    let payload_str = match String::from_utf8(payload.to_vec()) {
        Ok(s) => s,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid payload encoding");
        }
    };

    let event =
        match Webhook::construct_event(&payload_str, signature, &stripe_config.webhook_secret) {
            Ok(event) => event,
            Err(e) => {
                eprintln!("Webhook error: {:?}", e);
                return HttpResponse::BadRequest().body(format!("Webhook error: {}", e));
            }
        };

    let client = mongodb_data.into_inner();
    let collection = bookings(&client);

    match event.type_ {
        EventType::PaymentIntentSucceeded => {
            if let EventObject::PaymentIntent(payment_intent) = event.data.object {
                let intent_id = payment_intent.id.to_string();
                match collection.find_one(doc! { "transaction_id": &intent_id }).await {
                    Ok(Some(booking))
                        if BookingStatusPolicy::can_transition(
                            booking.status,
                            BookingStatus::Confirmed,
                        ) =>
                    {
                        let filter =
                            doc! { "_id": booking.id, "version": booking.version };
                        let update = doc! {
                            "$set": {
                                "status": BookingStatus::Confirmed.as_str(),
                                "updated_at": DateTime::now(),
                            },
                            "$inc": { "version": 1 },
                        };
                        if let Err(err) = collection.update_one(filter, update).await {
                            eprintln!("Error confirming booking from webhook: {:?}", err);
                        }
                    }
                    Ok(_) => {
                        println!("No pending booking for payment intent {}", intent_id);
                    }
                    Err(err) => {
                        eprintln!("Error looking up booking for webhook: {:?}", err);
                    }
                }
                HttpResponse::Ok().json(serde_json::json!({ "received": true }))
            } else {
                HttpResponse::BadRequest().body("Invalid payment intent object")
            }
        }

        EventType::PaymentIntentPaymentFailed => {
            if let EventObject::PaymentIntent(payment_intent) = event.data.object {
                eprintln!("Payment failed: {}", payment_intent.id);
                HttpResponse::Ok().json(serde_json::json!({ "received": true }))
            } else {
                HttpResponse::BadRequest().body("Invalid payment intent object")
            }
        }

        _ => {
            println!("Unhandled event type: {:?}", event.type_);
            HttpResponse::Ok().json(serde_json::json!({ "received": true }))
        }
    }
}
