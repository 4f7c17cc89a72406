use std::{sync::Arc, time::Duration};

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use commerce_common::Secret;
use commerce_engine::{
    db_types::TransactionStatus,
    test_utils::{
        fakes::{FakePaymentProvider, RecordingOrderStatusUpdater},
        prepare_env::in_memory_db,
    },
    PaymentApi,
    PaymentProjection,
    ProjectionError,
    SqliteDatabase,
};
use payment_provider::webhook::{calculate_hmac, SIGNATURE_HEADER};

use super::helpers::send_request;
use crate::{
    endpoint_tests::mocks::MockProjectionStore,
    webhook::{PaymentWebhookRoute, WebhookContext},
};

const SECRET: &str = "whsec_endpoint_tests";

fn webhook_body(event: &str, payment_id: &str) -> String {
    format!(
        r#"{{"type":"{event}","data":{{"customer":{{"customer_id":"cus_9","email":"bob@example.com","name":"Bob"}},
        "product_cart":[{{"product_id":"pdt_1","quantity":1}}],"payment_id":"{payment_id}",
        "metadata":{{"order_id":"42","user_id":"7"}},"total_amount":2500,"settled_amount":2450,"currency":"USD"}}}}"#
    )
}

fn signed(body: &str) -> TestRequest {
    let signature = calculate_hmac(SECRET, body.as_bytes()).unwrap();
    TestRequest::post()
        .uri("/webhook/payment")
        .insert_header((SIGNATURE_HEADER, signature))
        .set_payload(body.to_string())
}

struct Harness {
    api: PaymentApi<SqliteDatabase>,
    orders: Arc<RecordingOrderStatusUpdater>,
}

impl Harness {
    async fn new() -> Self {
        let api = PaymentApi::new(in_memory_db().await, Arc::new(FakePaymentProvider::default()));
        Self { api, orders: Arc::new(RecordingOrderStatusUpdater::default()) }
    }

    fn app(&self) -> impl FnOnce(&mut ServiceConfig) {
        webhook_app(self.api.clone(), self.orders.clone())
    }

    async fn transactions(&self) -> Vec<commerce_engine::db_types::Transaction> {
        self.api.transactions_for_order(42).await.unwrap()
    }
}

fn webhook_app<B: PaymentProjection + 'static>(
    api: PaymentApi<B>,
    orders: Arc<RecordingOrderStatusUpdater>,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let context = WebhookContext::new(Secret::new(SECRET.to_string()), orders, Duration::from_secs(2));
        cfg.app_data(web::Data::new(api))
            .app_data(web::Data::new(context))
            .service(PaymentWebhookRoute::<B>::new());
    }
}

#[actix_web::test]
async fn successful_payment_is_recorded_and_forwarded() {
    let harness = Harness::new().await;
    let body = webhook_body("payment.succeeded", "pay_1");
    let (status, body) = send_request(signed(&body), harness.app()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"success\":true"));
    let transactions = harness.transactions().await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].provider_payment_id, "pay_1");
    assert_eq!(transactions[0].user_id, 7);
    assert_eq!(transactions[0].status, TransactionStatus::Success);
    assert_eq!(harness.orders.updates(), vec![(42, TransactionStatus::Success)]);
}

#[actix_web::test]
async fn missing_signature() {
    let harness = Harness::new().await;
    let req = TestRequest::post().uri("/webhook/payment").set_payload(webhook_body("payment.succeeded", "pay_1"));
    let (status, _) = send_request(req, harness.app()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(harness.transactions().await.is_empty());
    assert!(harness.orders.updates().is_empty());
}

#[actix_web::test]
async fn tampered_body() {
    let harness = Harness::new().await;
    let body = webhook_body("payment.succeeded", "pay_1");
    let signature = calculate_hmac(SECRET, body.as_bytes()).unwrap();
    let req = TestRequest::post()
        .uri("/webhook/payment")
        .insert_header((SIGNATURE_HEADER, signature))
        .set_payload(body.replace("2500", "25"));
    let (status, _) = send_request(req, harness.app()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(harness.transactions().await.is_empty());
}

#[actix_web::test]
async fn signed_garbage() {
    let harness = Harness::new().await;
    let (status, _) = send_request(signed("{\"type\": \"payment.succeeded\""), harness.app()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(harness.orders.updates().is_empty());
}

#[actix_web::test]
async fn only_post_is_allowed() {
    let harness = Harness::new().await;
    let (status, _) = send_request(TestRequest::get().uri("/webhook/payment"), harness.app()).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn replays_update_the_same_transaction() {
    let harness = Harness::new().await;
    let succeeded = webhook_body("payment.succeeded", "pay_1");
    let failed = webhook_body("payment.failed", "pay_1");
    for body in [&succeeded, &succeeded, &failed] {
        let (status, _) = send_request(signed(body), harness.app()).await;
        assert_eq!(status, StatusCode::OK);
    }
    let transactions = harness.transactions().await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].status, TransactionStatus::Failed);
    assert_eq!(harness.orders.updates().len(), 3);
}

#[actix_web::test]
async fn events_without_an_outcome_are_not_forwarded() {
    let harness = Harness::new().await;
    let body = webhook_body("payment.processing", "pay_2");
    let (status, _) = send_request(signed(&body), harness.app()).await;
    assert_eq!(status, StatusCode::OK);
    let transactions = harness.transactions().await;
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].status, TransactionStatus::Pending);
    assert!(harness.orders.updates().is_empty());
}

#[actix_web::test]
async fn order_service_outage_still_acknowledges() {
    let harness = Harness::new().await;
    harness.orders.set_unavailable(true);
    let body = webhook_body("payment.failed", "pay_3");
    let (status, _) = send_request(signed(&body), harness.app()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.transactions().await[0].status, TransactionStatus::Failed);
    assert!(harness.orders.updates().is_empty());
}

#[actix_web::test]
async fn database_failure_still_forwards_the_outcome() {
    let mut store = MockProjectionStore::new();
    store.expect_upsert_transaction().times(1).returning(|_| Err(ProjectionError::DatabaseError("disk full".into())));
    let api = PaymentApi::new(store, Arc::new(FakePaymentProvider::default()));
    let orders = Arc::new(RecordingOrderStatusUpdater::default());
    let body = webhook_body("payment.succeeded", "pay_4");
    let (status, _) = send_request(signed(&body), webhook_app(api, orders.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.updates(), vec![(42, TransactionStatus::Success)]);
}
