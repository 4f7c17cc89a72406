use std::sync::Arc;

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use commerce_engine::{
    db_types::Cents,
    test_utils::{fakes::FakePaymentProvider, prepare_env::in_memory_db},
    PaymentApi,
    PaymentProjection,
    SqliteDatabase,
};
use serde_json::json;

use super::helpers::{json_body, send_request};
use crate::routes::{health, CheckoutRoute, CustomerPortalRoute};

async fn payment_api(provider: Arc<FakePaymentProvider>) -> PaymentApi<SqliteDatabase> {
    let api = PaymentApi::new(in_memory_db().await, provider);
    api.register_product("A", "Widget", None, Cents::from(1000)).await.unwrap();
    api
}

fn payment_app(api: PaymentApi<SqliteDatabase>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(api))
            .service(health)
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(CustomerPortalRoute::<SqliteDatabase>::new());
    }
}

fn checkout_body(products: serde_json::Value) -> serde_json::Value {
    json!({
        "user_id": 7,
        "email": "alice@example.com",
        "name": "Alice",
        "order_id": 42,
        "redirect_url": "https://shop.example.com/thanks",
        "products": products
    })
}

#[actix_web::test]
async fn health_check() {
    let api = payment_api(Arc::new(FakePaymentProvider::default())).await;
    let (status, body) = send_request(TestRequest::get().uri("/health"), payment_app(api)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn checkout_returns_a_redirect_url() {
    let provider = Arc::new(FakePaymentProvider::default());
    let api = payment_api(provider.clone()).await;
    let req = TestRequest::post().uri("/checkout").set_json(checkout_body(json!([{"product_id": "A", "quantity": 2}])));
    let (status, body) = send_request(req, payment_app(api.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let url = json_body(&body)["url"].as_str().unwrap().to_string();
    assert!(url.contains("order=42"));
    assert!(url.contains("user=7"));
    assert_eq!(provider.customers_created(), 1);

    // The second checkout reuses the customer
    let req = TestRequest::post().uri("/checkout").set_json(checkout_body(json!([{"product_id": "A", "quantity": 1}])));
    let (status, _) = send_request(req, payment_app(api)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.customers_created(), 1);
}

#[actix_web::test]
async fn checkout_with_unregistered_product() {
    let api = payment_api(Arc::new(FakePaymentProvider::default())).await;
    let req = TestRequest::post()
        .uri("/checkout")
        .set_json(checkout_body(json!([{"product_id": "A", "quantity": 1}, {"product_id": "Z", "quantity": 1}])));
    let (status, body) = send_request(req, payment_app(api)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Z"));
}

#[actix_web::test]
async fn checkout_while_provider_is_down() {
    let provider = Arc::new(FakePaymentProvider::default());
    let api = payment_api(provider.clone()).await;
    provider.set_unavailable(true);
    let req = TestRequest::post().uri("/checkout").set_json(checkout_body(json!([{"product_id": "A", "quantity": 1}])));
    let (status, _) = send_request(req, payment_app(api)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn checkout_with_malformed_body() {
    let api = payment_api(Arc::new(FakePaymentProvider::default())).await;
    let req = TestRequest::post().uri("/checkout").set_json(json!({"order_id": "not a number"}));
    let (status, _) = send_request(req, payment_app(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn customer_portal() {
    let api = payment_api(Arc::new(FakePaymentProvider::default())).await;
    let req = TestRequest::post()
        .uri("/customer_portal")
        .set_json(json!({"user_id": 7, "email": "alice@example.com", "name": "Alice"}));
    let (status, body) = send_request(req, payment_app(api.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let url = json_body(&body)["url"].as_str().unwrap().to_string();
    let stored = api.db().fetch_customer(7).await.unwrap().unwrap();
    assert_eq!(url, format!("https://portal.test/{}", stored.provider_customer_id));
}
