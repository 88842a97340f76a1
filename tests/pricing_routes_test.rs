mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;

use common::TestApp;

#[actix_rt::test]
#[serial]
async fn test_health_endpoint() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
#[serial]
async fn test_quote_end_to_end_ngn_to_usd() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/pricing/quote")
        .set_json(&json!({
            "nightly_rate": 20000.0,
            "currency": "NGN",
            "check_in": "2024-09-01",
            "check_out": "2024-09-05",
            "guests": 2,
            "display_currency": "USD"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["nights"], 4);
    assert_eq!(body["breakdown"]["base_price"], 80000.0);
    assert_eq!(body["breakdown"]["cleaning_fee"], 5000.0);
    assert_eq!(body["breakdown"]["service_fee"], 15000.0);
    assert_eq!(body["breakdown"]["taxes"], 210.0);
    assert_eq!(body["breakdown"]["total"], 100210.0);
    assert_eq!(body["display"]["currency"], "USD");
    let amount = body["display"]["amount"].as_f64().unwrap();
    assert!((amount - 67.1407).abs() < 1e-6);
    assert_eq!(body["display"]["formatted"], "$67.14");
}

#[actix_rt::test]
#[serial]
async fn test_quote_same_day_is_unpriced() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/pricing/quote")
        .set_json(&json!({
            "nightly_rate": 20000.0,
            "currency": "NGN",
            "check_in": "2024-09-01",
            "check_out": "2024-09-01",
            "guests": 2
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["nights"], 0);
    assert_eq!(body["breakdown"]["total"], 0.0);
    assert_eq!(body["breakdown"]["base_price"], 0.0);
    assert_eq!(body["display"]["formatted"], "₦0");
}

#[actix_rt::test]
#[serial]
async fn test_quote_missing_dates_is_unpriced() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/pricing/quote")
        .set_json(&json!({
            "nightly_rate": 45000.0,
            "currency": "NGN",
            "guests": 3
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["nights"], 0);
    assert_eq!(body["breakdown"]["total"], 0.0);
}

#[actix_rt::test]
#[serial]
async fn test_quote_native_currency_display() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/pricing/quote")
        .set_json(&json!({
            "nightly_rate": 20000.0,
            "currency": "NGN",
            "check_in": "2024-09-01",
            "check_out": "2024-09-05",
            "guests": 2
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["display"]["currency"], "NGN");
    assert_eq!(body["display"]["amount"], 100210.0);
    assert_eq!(body["display"]["formatted"], "₦100,210");
}

#[actix_rt::test]
#[serial]
async fn test_quote_rejects_invalid_guest_count() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    for guests in [0, 11] {
        let req = test::TestRequest::post()
            .uri("/api/pricing/quote")
            .set_json(&json!({
                "nightly_rate": 20000.0,
                "currency": "NGN",
                "check_in": "2024-09-01",
                "check_out": "2024-09-05",
                "guests": guests
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "guest count {} should be rejected", guests);
    }
}

#[actix_rt::test]
#[serial]
async fn test_quote_rejects_negative_rate() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/pricing/quote")
        .set_json(&json!({
            "nightly_rate": -100.0,
            "currency": "NGN",
            "check_in": "2024-09-01",
            "check_out": "2024-09-05",
            "guests": 2
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_quote_unknown_display_currency_names_code() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/pricing/quote")
        .set_json(&json!({
            "nightly_rate": 20000.0,
            "currency": "NGN",
            "check_in": "2024-09-01",
            "check_out": "2024-09-05",
            "guests": 2,
            "display_currency": "ZZZ"
        }))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("ZZZ"), "error should name the code: {}", error);
}

#[actix_rt::test]
#[serial]
async fn test_currencies_endpoint() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/pricing/currencies")
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["base"], "USD");

    let currencies = body["currencies"].as_array().unwrap();
    let ngn = currencies
        .iter()
        .find(|c| c["code"] == "NGN")
        .expect("NGN should be listed");
    assert_eq!(ngn["symbol"], "₦");
    assert_eq!(ngn["minor_units"], 0);
    assert_eq!(ngn["rate"], 0.00067);
}
