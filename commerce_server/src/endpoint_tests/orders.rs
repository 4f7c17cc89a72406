use std::sync::Arc;

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use commerce_engine::{
    db_types::{Cents, LineItem, NewLineItem, NewOrder, Order, OrderStatusType, OrderWithItems, TransactionStatus},
    events::EventProducers,
    test_utils::fakes::{InMemoryCatalog, StaticAccountDirectory},
    OrderFlowApi,
    OrderStoreError,
};
use serde_json::json;

use super::helpers::{json_body, send_request};
use crate::{
    endpoint_tests::mocks::MockOrderStore,
    routes::{OrderByIdRoute, OrdersForAccountRoute, PlaceOrderRoute, UpdateOrderStatusRoute},
};

#[actix_web::test]
async fn place_order_freezes_catalog_prices() {
    let mut store = MockOrderStore::new();
    store.expect_insert_order().times(1).returning(|order| Ok(stored(order)));
    let req = TestRequest::post().uri("/orders").set_json(json!({
        "account_id": 1,
        "products": [
            {"product_id": "A", "quantity": 2},
            {"product_id": "B", "quantity": 1},
            {"product_id": "not-in-catalog", "quantity": 4}
        ]
    }));
    let (status, body) = send_request(req, order_app(store, catalog())).await;
    assert_eq!(status, StatusCode::OK);
    let order = json_body(&body);
    assert_eq!(order["account_id"], 1);
    assert_eq!(order["total_price"], 2500);
    assert_eq!(order["status"], "New");
    assert_eq!(order["payment_status"], "pending");
    let items = order["line_items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i["product_id"] != "not-in-catalog"));
}

#[actix_web::test]
async fn place_order_for_unknown_account() {
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let req = TestRequest::post()
        .uri("/orders")
        .set_json(json!({"account_id": 99, "products": [{"product_id": "A", "quantity": 1}]}));
    let (status, body) = send_request(req, order_app(store, catalog())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("99"));
}

#[actix_web::test]
async fn place_order_with_empty_cart() {
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let req = TestRequest::post().uri("/orders").set_json(json!({"account_id": 1, "products": []}));
    let (status, _) = send_request(req, order_app(store, catalog())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn place_order_with_total_out_of_range() {
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let req = TestRequest::post()
        .uri("/orders")
        .set_json(json!({"account_id": 1, "products": [{"product_id": "A", "quantity": i64::MAX / 100}]}));
    let (status, body) = send_request(req, order_app(store, catalog())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("too large"));
}

#[actix_web::test]
async fn place_order_while_catalog_is_down() {
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let catalog = catalog();
    catalog.set_unavailable(true);
    let req = TestRequest::post()
        .uri("/orders")
        .set_json(json!({"account_id": 1, "products": [{"product_id": "A", "quantity": 1}]}));
    let (status, _) = send_request(req, order_app(store, catalog)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn orders_only_accepts_post() {
    let req = TestRequest::get().uri("/orders");
    let (status, _) = send_request(req, order_app(MockOrderStore::new(), catalog())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn fetch_missing_order() {
    let mut store = MockOrderStore::new();
    store.expect_fetch_order().returning(|_| Ok(None));
    let req = TestRequest::get().uri("/orders/12");
    let (status, _) = send_request(req, order_app(store, catalog())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn account_orders_show_live_catalog_details() {
    let mut store = MockOrderStore::new();
    store.expect_fetch_orders_for_account().withf(|id| *id == 1).returning(|_| {
        Ok(vec![stored(NewOrder::try_new(1, vec![line_item("A", 2, 900), line_item("retired", 1, 300)]).unwrap())])
    });
    let req = TestRequest::get().uri("/orders/account/1");
    let (status, body) = send_request(req, order_app(store, catalog())).await;
    assert_eq!(status, StatusCode::OK);
    let orders = json_body(&body);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["total_price"], 2100);
    let products = orders[0]["products"].as_array().unwrap();
    assert_eq!(products[0]["product_id"], "A");
    assert_eq!(products[0]["price"], 1000);
    assert_eq!(products[0]["in_catalog"], true);
    assert_eq!(products[0]["purchased"]["unit_price"], 900);
    assert_eq!(products[1]["product_id"], "retired");
    assert_eq!(products[1]["price"], 300);
    assert_eq!(products[1]["in_catalog"], false);
}

#[actix_web::test]
async fn update_status() {
    let mut store = MockOrderStore::new();
    store
        .expect_update_order_status()
        .withf(|id, status| *id == 7 && *status == TransactionStatus::Success)
        .times(1)
        .returning(|id, status| {
            let mut order = stored(NewOrder::try_new(1, vec![line_item("A", 1, 1000)]).unwrap()).order;
            order.id = id;
            order.payment_status = status;
            order.status = OrderStatusType::from(status);
            Ok(order)
        });
    let req = TestRequest::put().uri("/orders/7/status").set_json(json!({"status": "success"}));
    let (status, body) = send_request(req, order_app(store, catalog())).await;
    assert_eq!(status, StatusCode::OK);
    let order = json_body(&body);
    assert_eq!(order["id"], 7);
    assert_eq!(order["status"], "Paid");
    assert_eq!(order["payment_status"], "success");
}

#[actix_web::test]
async fn update_status_rejects_unknown_statuses() {
    let mut store = MockOrderStore::new();
    store.expect_update_order_status().never();
    let req = TestRequest::put().uri("/orders/7/status").set_json(json!({"status": "refunded"}));
    let (status, _) = send_request(req, order_app(store, catalog())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn update_status_of_missing_order() {
    let mut store = MockOrderStore::new();
    store.expect_update_order_status().returning(|id, _| Err(OrderStoreError::OrderNotFound(id)));
    let req = TestRequest::put().uri("/orders/5/status").set_json(json!({"status": "failed"}));
    let (status, _) = send_request(req, order_app(store, catalog())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn catalog() -> Arc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::default();
    catalog.add_product("A", "Widget", 1000);
    catalog.add_product("B", "Gadget", 500);
    Arc::new(catalog)
}

fn order_app(store: MockOrderStore, catalog: Arc<InMemoryCatalog>) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        let accounts = Arc::new(StaticAccountDirectory::with_accounts(&[1]));
        let api = OrderFlowApi::new(store, catalog, accounts, EventProducers::default());
        cfg.app_data(web::Data::new(api))
            .service(PlaceOrderRoute::<MockOrderStore>::new())
            .service(OrdersForAccountRoute::<MockOrderStore>::new())
            .service(UpdateOrderStatusRoute::<MockOrderStore>::new())
            .service(OrderByIdRoute::<MockOrderStore>::new());
    }
}

fn line_item(id: &str, quantity: i64, price: i64) -> NewLineItem {
    NewLineItem {
        product_id: id.to_string(),
        quantity,
        name: id.to_string(),
        description: String::new(),
        unit_price: Cents::from(price),
    }
}

// What the store would hand back for a freshly inserted order
fn stored(order: NewOrder) -> OrderWithItems {
    let timestamp = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let line_items = order
        .line_items
        .into_iter()
        .enumerate()
        .map(|(i, item)| LineItem {
            id: i as i64 + 1,
            order_id: 1,
            product_id: item.product_id,
            quantity: item.quantity,
            name: item.name,
            description: item.description,
            unit_price: item.unit_price,
        })
        .collect();
    OrderWithItems {
        order: Order {
            id: 1,
            account_id: order.account_id,
            total_price: order.total_price,
            status: OrderStatusType::New,
            payment_status: TransactionStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
        },
        line_items,
    }
}
