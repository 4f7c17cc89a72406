use std::{sync::Arc, time::Duration};

use commerce_engine::{
    db_types::{Cents, NewTransaction, TransactionStatus},
    events::{CatalogEventConsumer, MessageBroker},
    order_objects::CartEntry,
    payment_objects::{BillingDetails, CheckoutRequest},
    OrderFlowError,
    PaymentProjection,
};
use cucumber::{given, then, when};
use serde_json::json;
use tokio::sync::watch;

use crate::cucumber::CommerceWorld;

const PRODUCT_EVENTS: &str = "product_events";

fn cents(amount: f64) -> Cents {
    Cents::from_major_units(amount).expect("Not a valid amount")
}

#[given(expr = "the catalog contains product '{word}' priced at {float}")]
async fn catalog_product(world: &mut CommerceWorld, product_id: String, price: f64) {
    world.system().catalog.put(&product_id, cents(price));
}

#[given(expr = "account {int} exists")]
async fn account_exists(world: &mut CommerceWorld, account_id: i64) {
    world.system().accounts.add(account_id);
}

#[given(expr = "product '{word}' is registered with the payment provider at {float}")]
async fn registered_product(world: &mut CommerceWorld, product_id: String, price: f64) {
    world
        .system()
        .payments
        .register_product(&product_id, &format!("Product {product_id}"), None, cents(price))
        .await
        .expect("Error registering product");
}

#[when(expr = "account {int} orders {int} of '{word}' and {int} of '{word}'")]
async fn place_order(world: &mut CommerceWorld, account_id: i64, qty_a: i64, a: String, qty_b: i64, b: String) {
    let cart = vec![CartEntry::new(&a, qty_a), CartEntry::new(&b, qty_b)];
    let result = world.system().orders.place_order(account_id, cart).await;
    world.last_order = Some(result);
}

#[when(expr = "product '{word}' is removed from the catalog")]
async fn remove_product(world: &mut CommerceWorld, product_id: String) {
    world.system().catalog.remove(&product_id);
}

#[then(expr = "the order total is {float}")]
async fn order_total(world: &mut CommerceWorld, total: f64) {
    assert_eq!(world.last_order().order.total_price, cents(total));
}

#[then(expr = "the order has {int} line items")]
async fn line_item_count(world: &mut CommerceWorld, count: usize) {
    assert_eq!(world.last_order().line_items.len(), count);
}

#[then("the order is rejected because the account does not exist")]
async fn order_rejected(world: &mut CommerceWorld) {
    assert!(matches!(world.last_order, Some(Err(OrderFlowError::AccountNotFound(_)))), "{:?}", world.last_order);
}

#[then(expr = "the order history for account {int} shows '{word}' at its purchase price of {float}")]
async fn history_shows_snapshot(world: &mut CommerceWorld, account_id: i64, product_id: String, price: f64) {
    let history = world.system().orders.orders_for_account(account_id).await.expect("Error fetching orders");
    let product = history
        .iter()
        .flat_map(|o| o.products.iter())
        .find(|p| p.product_id == product_id)
        .expect("Product is not in the order history");
    assert!(!product.in_catalog);
    assert_eq!(product.price, cents(price));
    assert_eq!(product.purchased.unit_price, cents(price));
}

#[then(expr = "the order history for account {int} has a total of {float}")]
async fn history_total(world: &mut CommerceWorld, account_id: i64, total: f64) {
    let history = world.system().orders.orders_for_account(account_id).await.expect("Error fetching orders");
    let sum = history.iter().map(|o| o.order.total_price).sum::<Cents>();
    assert_eq!(sum, cents(total));
}

#[when(expr = "payment '{word}' for order {int} is reported as {word}")]
async fn payment_reported(world: &mut CommerceWorld, payment_id: String, order_id: i64, status: String) {
    let status = status.parse::<TransactionStatus>().expect("Not a valid status");
    let tx = NewTransaction {
        order_id,
        user_id: 1,
        customer_id: "cus_1".into(),
        provider_payment_id: payment_id,
        total_price: Cents::from(2500),
        settled_price: Cents::from(2500),
        currency: "USD".into(),
        status: Some(status),
    };
    world.system().payments.record_transaction(tx).await.expect("Error recording transaction");
}

#[then(expr = "there is {int} transaction for order {int}")]
async fn transaction_count(world: &mut CommerceWorld, count: usize, order_id: i64) {
    let txs = world.system().payments.transactions_for_order(order_id).await.expect("Error fetching transactions");
    assert_eq!(txs.len(), count);
}

#[then(expr = "payment '{word}' has status {word}")]
async fn payment_status(world: &mut CommerceWorld, payment_id: String, status: String) {
    let tx = world
        .system()
        .payments
        .fetch_transaction(&payment_id)
        .await
        .expect("Error fetching transaction")
        .expect("Transaction does not exist");
    assert_eq!(tx.status.to_string(), status);
}

#[when(expr = "user {int} checks out order {int} with {int} of '{word}'")]
async fn checkout(world: &mut CommerceWorld, user_id: i64, order_id: i64, quantity: i64, product_id: String) {
    let request = CheckoutRequest {
        billing: BillingDetails { user_id, email: format!("user{user_id}@example.com"), name: format!("User {user_id}") },
        order_id,
        redirect_url: "https://shop.example.com/thanks".into(),
        products: vec![CartEntry::new(&product_id, quantity)],
    };
    let url = world.system().payments.create_checkout_session(request).await.expect("Error creating checkout");
    assert!(url.ends_with(&format!("/{order_id}")));
}

#[then(expr = "the payment provider created {int} customer(s)")]
async fn customers_created(world: &mut CommerceWorld, count: usize) {
    assert_eq!(world.system().provider.customers_created(), count);
}

#[then(expr = "the payment provider created {int} product(s)")]
async fn products_created(world: &mut CommerceWorld, count: usize) {
    assert_eq!(world.system().provider.products_created(), count);
}

#[when(expr = "the catalog publishes product_created for '{word}' priced at {float}")]
async fn publish_created(world: &mut CommerceWorld, product_id: String, price: f64) {
    let event = json!({"type": "product_created", "data": {"product_id": product_id, "name": "Thing", "price": price}});
    world
        .system()
        .broker
        .publish(PRODUCT_EVENTS, Some(&product_id), event.to_string().into_bytes())
        .await
        .expect("Error publishing event");
}

#[when("the catalog event consumer drains the topic")]
async fn drain_catalog_events(world: &mut CommerceWorld) {
    let system = world.system();
    let last = system.broker.latest_offset(PRODUCT_EVENTS);
    let consumer = CatalogEventConsumer::new(system.payments.clone(), Arc::new(system.broker.clone()), PRODUCT_EVENTS);
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(async move { consumer.run(rx).await });
    for _ in 0..500 {
        if system.broker.committed_offset(PRODUCT_EVENTS) == last {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tx.send(true).expect("Consumer has gone away");
    task.await.expect("Consumer panicked").expect("Consumer failed");
    assert_eq!(system.broker.committed_offset(PRODUCT_EVENTS), last);
}

#[then(expr = "product '{word}' is mapped to a provider product")]
async fn product_mapped(world: &mut CommerceWorld, product_id: String) {
    let product = world.system().payments.db().fetch_product(&product_id).await.expect("Error fetching product");
    assert!(product.is_some(), "Product {product_id} is not mapped");
}
