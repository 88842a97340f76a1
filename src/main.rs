use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use havenstay_api::db;
use havenstay_api::routes;
use havenstay_api::routes::payment::StripeConfig;
use havenstay_api::services::pricing_service::FeeTable;
use havenstay_api::services::rates;
use havenstay_api::services::stripe::provider::StripeProvider;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let stripe_key = env::var("STRIPE_SECRET_KEY").unwrap_or_else(|_| {
        eprintln!("WARNING: STRIPE_SECRET_KEY not set; payment routes will fail");
        String::new()
    });
    let stripe_provider = Arc::new(StripeProvider::new(stripe_key));
    let stripe_config = StripeConfig {
        webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
    };

    // One immutable snapshot for the whole process; a refresh would install
    // a new table in a single swap
    let currency_state = web::Data::new(rates::load_currency_state().await);
    let fee_table = web::Data::new(FeeTable::from_env());

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(stripe_provider.clone()))
            .app_data(web::Data::new(stripe_config.clone()))
            .app_data(currency_state.clone())
            .app_data(fee_table.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(routes::health::health_check))
                    .service(
                        web::scope("/pricing")
                            .route("/quote", web::post().to(routes::pricing::create_quote))
                            .route(
                                "/currencies",
                                web::get().to(routes::pricing::get_currencies),
                            ),
                    )
                    .service(
                        web::scope("/properties")
                            .route("", web::get().to(routes::properties::get_properties))
                            .route("/add", web::post().to(routes::properties::add_property))
                            .route(
                                "/{id}",
                                web::get().to(routes::properties::get_property_by_id),
                            )
                            .route(
                                "/{id}/quote",
                                web::get().to(routes::properties::property_quote),
                            )
                            .route(
                                "/{id}/bookings",
                                web::post().to(routes::bookings::add_booking),
                            )
                            .route(
                                "/{id}/bookings",
                                web::get().to(routes::bookings::property_bookings),
                            )
                            .route(
                                "/{id}/bookings/checkout",
                                web::post().to(routes::bookings::checkout),
                            ),
                    )
                    .service(
                        web::scope("/bookings")
                            .route("", web::get().to(routes::bookings::list_bookings))
                            .route("/{id}", web::get().to(routes::bookings::get_booking_by_id))
                            .route(
                                "/{id}/status",
                                web::put().to(routes::bookings::update_booking_status),
                            ),
                    )
                    .service(
                        web::scope("/payment")
                            .route(
                                "/payment-intent",
                                web::post().to(routes::payment::create_payment_intent),
                            )
                            .route(
                                "/capture-payment",
                                web::post().to(routes::payment::capture_payment),
                            )
                            .route(
                                "/webhook",
                                web::post().to(routes::payment::handle_stripe_webhook),
                            ),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
