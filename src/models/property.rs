use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize)]
pub struct Property {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub host_id: ObjectId,
    pub title: String,
    pub description: String,
    pub city: String,
    pub country: String,
    /// Price per calendar night, denominated in `currency`.
    pub nightly_rate: f64,
    pub currency: String,
    pub max_guests: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PropertyInput {
    pub host_id: String,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub country: String,
    #[validate(range(min = 0.0))]
    pub nightly_rate: f64,
    #[validate(length(min = 3, max = 3))]
    pub currency: String,
    #[validate(range(min = 1, max = 10))]
    pub max_guests: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
}
