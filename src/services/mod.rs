pub mod booking_status;
pub mod currency_service;
pub mod payment;
pub mod pricing_service;
pub mod rates;
pub mod stay_service;
pub mod stripe;
