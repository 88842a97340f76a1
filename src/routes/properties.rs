use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::{options::FindOptions, Client};
use std::sync::Arc;
use validator::Validate;

use crate::models::currency::CurrencyAmount;
use crate::models::property::{Property, PropertyInput};
use crate::services::currency_service::CurrencyState;
use crate::services::pricing_service::FeeTable;
use crate::services::stay_service::StayService;

use super::pricing::build_quote;

#[derive(serde::Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(serde::Deserialize)]
pub struct QueryParams {
    limit: Option<u16>,
    city: Option<String>,
}

pub async fn get_properties(
    data: web::Data<Arc<Client>>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Property> =
        client.database("Rentals").collection("Properties");

    let mut options = FindOptions::default();
    if let Some(limit) = params.limit {
        options.limit = Some(limit.into());
    }
    let filter = match &params.city {
        Some(city) if !city.is_empty() => {
            doc! {
                "city": {
                    "$regex": format!("^{}", regex::escape(city)),
                    "$options": "i"
                }
            }
        }
        _ => doc! {},
    };

    match collection.find(filter).with_options(options).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Property>>().await {
            Ok(properties) => HttpResponse::Ok().json(properties),
            Err(err) => {
                eprintln!("Failed to collect documents: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect properties.")
            }
        },
        Err(err) => {
            eprintln!("Failed to find documents: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find properties.")
        }
    }
}

pub async fn get_property_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<String>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Property> =
        client.database("Rentals").collection("Properties");

    let property_id = match ObjectId::parse_str(path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid property ID format");
        }
    };

    match collection.find_one(doc! { "_id": property_id }).await {
        Ok(Some(property)) => HttpResponse::Ok().json(property),
        Ok(None) => HttpResponse::NotFound().body("Property not found"),
        Err(err) => {
            eprintln!("Error fetching property: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch property")
        }
    }
}

pub async fn add_property(
    data: web::Data<Arc<Client>>,
    input: web::Json<PropertyInput>,
) -> impl Responder {
    let input = input.into_inner();
    if let Err(e) = input.validate() {
        return HttpResponse::BadRequest().json(e);
    }

    let host_id = match ObjectId::parse_str(&input.host_id) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid host ID format");
        }
    };

    let client = data.into_inner();
    let collection: mongodb::Collection<Property> =
        client.database("Rentals").collection("Properties");

    let time = DateTime::now();
    let property = Property {
        id: None,
        host_id,
        title: input.title,
        description: input.description,
        city: input.city,
        country: input.country,
        nightly_rate: input.nightly_rate,
        currency: input.currency.to_ascii_uppercase(),
        max_guests: input.max_guests,
        amenities: input.amenities,
        created_at: Some(time),
        updated_at: Some(time),
    };

    match collection.insert_one(&property).await {
        Ok(insert_result) => HttpResponse::Ok().json(serde_json::json!({
            "id": insert_result.inserted_id.as_object_id().map(|id| id.to_string()),
            "message": "Property created"
        })),
        Err(err) => {
            eprintln!("Error creating property: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create property")
        }
    }
}

#[derive(serde::Deserialize)]
pub struct StayQuery {
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    guests: Option<u32>,
    display_currency: Option<String>,
}

/// Quote a stay against a stored listing: the property supplies the nightly
/// rate and its currency, everything else is the same chain the stand-alone
/// quote endpoint runs.
pub async fn property_quote(
    data: web::Data<Arc<Client>>,
    currency: web::Data<CurrencyState>,
    fees: web::Data<FeeTable>,
    path: web::Path<String>,
    params: web::Query<StayQuery>,
) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Property> =
        client.database("Rentals").collection("Properties");

    let property_id = match ObjectId::parse_str(path.into_inner()) {
        Ok(id) => id,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid property ID format");
        }
    };

    let property = match collection.find_one(doc! { "_id": property_id }).await {
        Ok(Some(property)) => property,
        Ok(None) => return HttpResponse::NotFound().body("Property not found"),
        Err(err) => {
            eprintln!("Error fetching property: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch property");
        }
    };

    let guests = params.guests.unwrap_or(1);
    if guests == 0 || guests > 10 {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Guest count must be between 1 and 10".to_string(),
        });
    }
    if guests > property.max_guests {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: format!("Property sleeps at most {} guests", property.max_guests),
        });
    }

    let nights = StayService::nights_opt(params.check_in, params.check_out);
    let rate = CurrencyAmount::new(property.nightly_rate, property.currency.clone());

    let converter = currency.snapshot();
    match build_quote(
        &converter,
        fees.fees_for(&property.currency),
        &rate,
        nights,
        params.display_currency.clone(),
    ) {
        Ok(quote) => HttpResponse::Ok().json(quote),
        Err(e) => HttpResponse::BadRequest().json(ErrorResponse {
            error: e.to_string(),
        }),
    }
}
