use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App};

use havenstay_api::routes;
use havenstay_api::services::currency_service::{CurrencyState, RateTable};
use havenstay_api::services::pricing_service::FeeTable;

/// Test harness around the routes that need no external services: the quote
/// chain and the currency table run entirely in process.
pub struct TestApp {
    pub currency: web::Data<CurrencyState>,
    pub fees: web::Data<FeeTable>,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            currency: web::Data::new(CurrencyState::new(RateTable::default())),
            fees: web::Data::new(FeeTable::default()),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.currency.clone())
            .app_data(self.fees.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(|| async { "OK" }))
            .service(
                web::scope("/api").service(
                    web::scope("/pricing")
                        .route("/quote", web::post().to(routes::pricing::create_quote))
                        .route(
                            "/currencies",
                            web::get().to(routes::pricing::get_currencies),
                        ),
                ),
            )
    }
}
