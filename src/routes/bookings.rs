use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::Client;
use std::sync::Arc;
use validator::Validate;

use crate::models::bookings::{
    Booking, BookingInput, BookingStatus, CheckoutInput, StatusUpdateInput,
};
use crate::models::currency::CurrencyAmount;
use crate::models::property::Property;
use crate::services::booking_status::BookingStatusPolicy;
use crate::services::payment::interface::{PaymentError, PaymentOperations};
use crate::services::pricing_service::{FeeTable, PricingService};
use crate::services::stay_service::StayService;
use crate::services::stripe::provider::StripeProvider;

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

fn properties(client: &Client) -> mongodb::Collection<Property> {
    client.database("Rentals").collection("Properties")
}

fn bookings(client: &Client) -> mongodb::Collection<Booking> {
    client.database("Rentals").collection("Bookings")
}

/// A booking occupies the nights [check_in, check_out); two stays collide
/// when the intervals overlap and the earlier one is still alive.
fn overlap_filter(property_id: ObjectId, input_check_in: &str, input_check_out: &str) -> bson::Document {
    doc! {
        "property_id": property_id,
        "status": { "$in": ["pending", "confirmed"] },
        "check_in": { "$lt": input_check_out },
        "check_out": { "$gt": input_check_in },
    }
}

pub async fn add_booking(
    data: web::Data<Arc<Client>>,
    fees: web::Data<FeeTable>,
    path: web::Path<String>,
    input: web::Json<BookingInput>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    if let Err(e) = input.validate() {
        return HttpResponse::BadRequest().json(e);
    }

    let nights = StayService::nights(input.check_in, input.check_out);
    if nights == 0 {
        // A quote may be zero, but an actual reservation needs a real stay
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Check-out must be after check-in".to_string(),
        });
    }

    let property_id = match ObjectId::parse_str(path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid property ID format");
        }
    };

    let property = match properties(&client).find_one(doc! { "_id": property_id }).await {
        Ok(Some(property)) => property,
        Ok(None) => return HttpResponse::NotFound().body("Property not found"),
        Err(err) => {
            eprintln!("Error fetching property: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch property");
        }
    };

    if input.guests > property.max_guests {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: format!("Property sleeps at most {} guests", property.max_guests),
        });
    }

    let collection = bookings(&client);
    let filter = overlap_filter(
        property_id,
        &input.check_in.to_string(),
        &input.check_out.to_string(),
    );

    match collection.find_one(filter).await {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "Property is already booked for those dates".to_string(),
            });
        }
        Ok(None) => {}
        Err(err) => {
            eprintln!("Error checking for existing booking: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to check for bookings");
        }
    }

    // The server recomputes the price; client-sent totals are never trusted
    let rate = CurrencyAmount::new(property.nightly_rate, property.currency.clone());
    let breakdown = PricingService::breakdown(&rate, nights, fees.fees_for(&property.currency));

    let time = DateTime::now();
    let mut booking = Booking {
        id: None,
        property_id,
        guest_name: input.guest_name,
        guest_email: input.guest_email,
        check_in: input.check_in,
        check_out: input.check_out,
        guests: input.guests,
        currency: breakdown.currency.clone(),
        breakdown,
        customer_id: input.customer_id,
        transaction_id: None,
        status: BookingStatus::Pending,
        version: 1,
        created_at: Some(time),
        updated_at: Some(time),
    };

    match collection.insert_one(&booking).await {
        Ok(insert_result) => {
            booking.id = insert_result.inserted_id.as_object_id();
            HttpResponse::Ok().json(booking)
        }
        Err(err) => {
            eprintln!("Error creating booking: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create booking")
        }
    }
}

pub async fn get_booking_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();

    let booking_id = match ObjectId::parse_str(path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid booking ID format");
        }
    };

    match bookings(&client).find_one(doc! { "_id": booking_id }).await {
        Ok(Some(booking)) => {
            let allowed = BookingStatusPolicy::allowed_actions(booking.status);
            HttpResponse::Ok().json(serde_json::json!({
                "booking": booking,
                "allowed_actions": allowed,
            }))
        }
        Ok(None) => HttpResponse::NotFound().body("Booking not found"),
        Err(err) => {
            eprintln!("Error fetching booking: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch booking")
        }
    }
}

#[derive(serde::Deserialize)]
pub struct BookingQuery {
    guest_email: Option<String>,
    status: Option<BookingStatus>,
}

pub async fn list_bookings(
    data: web::Data<Arc<Client>>,
    params: web::Query<BookingQuery>,
) -> impl Responder {
    let client = data.into_inner();

    let mut filter = doc! {};
    if let Some(guest_email) = &params.guest_email {
        filter.insert("guest_email", guest_email.as_str());
    }
    if let Some(status) = params.status {
        filter.insert("status", status.as_str());
    }

    match bookings(&client).find(filter).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Booking>>().await {
            Ok(results) => HttpResponse::Ok().json(results),
            Err(err) => {
                eprintln!("Error retrieving bookings: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve bookings")
            }
        },
        Err(err) => {
            eprintln!("Error fetching bookings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
    }
}

pub async fn property_bookings(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();

    let property_id = match ObjectId::parse_str(path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid property ID format");
        }
    };

    match bookings(&client).find(doc! { "property_id": property_id }).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Booking>>().await {
            Ok(results) => HttpResponse::Ok().json(results),
            Err(err) => {
                eprintln!("Error retrieving bookings: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve bookings")
            }
        },
        Err(err) => {
            eprintln!("Error fetching bookings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch bookings")
        }
    }
}

/// Status mutation with optimistic concurrency: the caller sends the version
/// it last read and the write only lands if the booking has not moved since.
pub async fn update_booking_status(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
    input: web::Json<StatusUpdateInput>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();

    let booking_id = match ObjectId::parse_str(path.into_inner()) {
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

    if let Err(e) = BookingStatusPolicy::check_transition(booking.status, input.status) {
        return HttpResponse::UnprocessableEntity().json(serde_json::json!({
            "error": e.to_string(),
            "allowed_actions": BookingStatusPolicy::allowed_actions(booking.status),
        }));
    }

    let filter = doc! { "_id": booking_id, "version": input.version };
    let update = doc! {
        "$set": { "status": input.status.as_str(), "updated_at": DateTime::now() },
        "$inc": { "version": 1 },
    };

    match collection.update_one(filter, update).await {
        Ok(result) if result.matched_count == 0 => {
            // The booking exists but moved under us: stale version
            HttpResponse::Conflict().json(serde_json::json!({
                "error": "Booking was modified concurrently; re-read and retry",
                "current_version": booking.version,
            }))
        }
        Ok(_) => match collection.find_one(doc! { "_id": booking_id }).await {
            Ok(Some(updated)) => HttpResponse::Ok().json(updated),
            Ok(None) => HttpResponse::NotFound().body("Booking not found"),
            Err(err) => {
                eprintln!("Error re-fetching booking: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch updated booking")
            }
        },
        Err(err) => {
            eprintln!("Error updating booking status: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update booking")
        }
    }
}

/// Guest checkout: verify the payment intent is capturable, create the
/// booking in `pending`, capture, then confirm. A failed capture cancels the
/// booking instead of leaving it half-paid.
pub async fn checkout(
    mongodb_data: web::Data<Arc<Client>>,
    stripe_data: web::Data<Arc<StripeProvider>>,
    fees: web::Data<FeeTable>,
    path: web::Path<String>,
    input: web::Json<CheckoutInput>,
) -> impl Responder {
    let client = mongodb_data.into_inner();
    let provider = stripe_data.into_inner();
    let input = input.into_inner();

    if let Err(e) = input.validate() {
        return HttpResponse::BadRequest().json(e);
    }

    let nights = StayService::nights(input.check_in, input.check_out);
    if nights == 0 {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Check-out must be after check-in".to_string(),
        });
    }

    let property_id = match ObjectId::parse_str(path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid property ID format");
        }
    };

    // 1. The intent must exist and be capturable before anything persists
    println!("Verifying payment intent: {}", input.payment_intent_id);
    match provider.retrieve_intent(&input.payment_intent_id).await {
        Ok(intent) => {
            if intent.status != stripe::PaymentIntentStatus::RequiresCapture {
                return HttpResponse::BadRequest().json(ErrorResponse {
                    error: format!(
                        "Payment intent is not in a capturable state. Current status: {:?}",
                        intent.status
                    ),
                });
            }
        }
        Err(PaymentError::NotFound) => {
            return HttpResponse::BadRequest().body("Invalid payment intent ID");
        }
        Err(e) => {
            eprintln!("Error retrieving payment intent: {}", e);
            return HttpResponse::InternalServerError()
                .body(format!("Failed to retrieve payment intent: {}", e));
        }
    }

    // 2. The property supplies the rate and currency for the breakdown
    let property = match properties(&client).find_one(doc! { "_id": property_id }).await {
        Ok(Some(property)) => property,
        Ok(None) => return HttpResponse::NotFound().body("Property not found"),
        Err(err) => {
            eprintln!("Error fetching property: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch property");
        }
    };

    if input.guests > property.max_guests {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: format!("Property sleeps at most {} guests", property.max_guests),
        });
    }

    let collection = bookings(&client);
    let filter = overlap_filter(
        property_id,
        &input.check_in.to_string(),
        &input.check_out.to_string(),
    );
    match collection.find_one(filter).await {
        Ok(Some(_)) => {
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "Property is already booked for those dates".to_string(),
            });
        }
        Ok(None) => {}
        Err(err) => {
            eprintln!("Error checking for existing booking: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to check for bookings");
        }
    }

    let rate = CurrencyAmount::new(property.nightly_rate, property.currency.clone());
    let breakdown = PricingService::breakdown(&rate, nights, fees.fees_for(&property.currency));

    // 3. Create the booking in pending before money moves
    let time = DateTime::now();
    let booking = Booking {
        id: None,
        property_id,
        guest_name: input.guest_name,
        guest_email: input.guest_email,
        check_in: input.check_in,
        check_out: input.check_out,
        guests: input.guests,
        currency: breakdown.currency.clone(),
        breakdown,
        customer_id: Some(input.customer_id),
        transaction_id: Some(input.payment_intent_id.clone()),
        status: BookingStatus::Pending,
        version: 1,
        created_at: Some(time),
        updated_at: Some(time),
    };

    let inserted_id = match collection.insert_one(&booking).await {
        Ok(insert_result) => insert_result.inserted_id,
        Err(err) => {
            eprintln!("Error creating booking: {:?}", err);
            return HttpResponse::InternalServerError()
                .body(format!("Failed to create booking: {}", err));
        }
    };
    let booking_id = inserted_id
        .as_object_id()
        .map(|id| id.to_string())
        .unwrap_or_default();

    // 4. Capture the payment, then move the booking along the legal path:
    //    pending -> confirmed on success, pending -> cancelled on failure
    println!("Capturing payment intent: {}", input.payment_intent_id);
    match provider.capture_intent(&input.payment_intent_id).await {
        Ok(captured_intent) => {
            let update = doc! {
                "$set": {
                    "status": BookingStatus::Confirmed.as_str(),
                    "updated_at": DateTime::now(),
                },
                "$inc": { "version": 1 },
            };
            match collection
                .update_one(doc! { "_id": inserted_id.clone(), "version": 1 }, update)
                .await
            {
                Ok(_) => HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "booking_id": booking_id,
                    "status": "confirmed",
                    "payment_intent": captured_intent,
                })),
                Err(update_err) => {
                    eprintln!("Error updating booking status: {:?}", update_err);
                    // Payment was captured but status update failed
                    HttpResponse::Ok().json(serde_json::json!({
                        "success": true,
                        "warning": "Booking created and payment captured, but failed to update booking status",
                        "booking_id": booking_id,
                        "payment_intent": captured_intent,
                    }))
                }
            }
        }
        Err(capture_err) => {
            eprintln!("Error capturing payment: {}", capture_err);
            let update = doc! {
                "$set": {
                    "status": BookingStatus::Cancelled.as_str(),
                    "updated_at": DateTime::now(),
                },
                "$inc": { "version": 1 },
            };
            let _ = collection
                .update_one(doc! { "_id": inserted_id.clone(), "version": 1 }, update)
                .await;

            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "booking_id": booking_id,
                "error": format!("Booking created but payment capture failed: {}", capture_err),
            }))
        }
    }
}
