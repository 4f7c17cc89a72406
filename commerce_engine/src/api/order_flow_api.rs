use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    sync::Arc,
};

use log::*;

use crate::{
    api::{
        errors::OrderFlowError,
        order_objects::{CartEntry, OrderDetails, OrderedProduct},
    },
    db::traits::OrderManagement,
    db_types::{NewLineItem, NewOrder, Order, OrderWithItems, TransactionStatus},
    events::{EventProducers, OrderPlacedEvent},
    traits::{AccountDirectory, CatalogClient, CatalogProduct, RemoteCallError},
};

/// `OrderFlowApi` places orders on behalf of an account and serves the stored orders back.
///
/// Prices, names and descriptions are copied from the catalog when the order is placed, so an order stays valid even
/// after the catalog changes or drops a product.
pub struct OrderFlowApi<B> {
    db: B,
    catalog: Arc<dyn CatalogClient>,
    accounts: Arc<dyn AccountDirectory>,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(
        db: B,
        catalog: Arc<dyn CatalogClient>,
        accounts: Arc<dyn AccountDirectory>,
        producers: EventProducers,
    ) -> Self {
        Self { db, catalog, accounts, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Places a new order for `account_id`.
    ///
    /// Products the catalog does not know about are dropped from the order. The total is the sum of
    /// `unit price x quantity` over the remaining line items. The order and its line items are written in one
    /// transaction. Once stored, a `purchase` interaction is emitted for every line item, without waiting for delivery.
    pub async fn place_order(&self, account_id: i64, cart: Vec<CartEntry>) -> Result<OrderWithItems, OrderFlowError> {
        let cart = consolidate_cart(cart)?;
        self.ensure_account_exists(account_id).await?;
        let ids = cart.iter().map(|(id, _)| id.clone()).collect::<Vec<String>>();
        let products = self.catalog.fetch_products(&ids).await.map_err(|e| {
            warn!("📦️ Catalog lookup for account #{account_id}'s order failed. {e}");
            OrderFlowError::from(e)
        })?;
        let by_id = products.iter().map(|p| (p.id.as_str(), p)).collect::<HashMap<&str, &CatalogProduct>>();
        let line_items = cart
            .into_iter()
            .filter_map(|(product_id, quantity)| match by_id.get(product_id.as_str()) {
                Some(product) => Some(NewLineItem {
                    product_id,
                    quantity,
                    name: product.name.clone(),
                    description: product.description.clone(),
                    unit_price: product.price,
                }),
                None => {
                    warn!("📦️ Product {product_id} is not in the catalog. It has been left out of the order.");
                    None
                },
            })
            .collect::<Vec<NewLineItem>>();
        if line_items.is_empty() {
            warn!("📦️ None of the products ordered by account #{account_id} are in the catalog. Storing an empty order.");
        }
        let order = NewOrder::try_new(account_id, line_items).ok_or_else(|| {
            warn!("📦️ The order total for account #{account_id} does not fit in the supported price range");
            OrderFlowError::InvalidArgument("The order total is too large".into())
        })?;
        let placed = self.db.insert_order(order).await?;
        info!(
            "📦️ Order #{} placed for account #{account_id}. {} line items, total {}",
            placed.order.id,
            placed.line_items.len(),
            placed.order.total_price
        );
        self.call_order_placed_hook(&placed);
        Ok(placed)
    }

    fn call_order_placed_hook(&self, order: &OrderWithItems) {
        for emitter in &self.producers.order_placed_producer {
            debug!("📦️ Notifying order placed hook subscribers");
            emitter.try_publish_event(OrderPlacedEvent::new(order.clone()));
        }
    }

    async fn ensure_account_exists(&self, account_id: i64) -> Result<(), OrderFlowError> {
        match self.accounts.account_exists(account_id).await {
            Ok(true) => Ok(()),
            Ok(false) | Err(RemoteCallError::NotFound(_)) => {
                debug!("📦️ Account #{account_id} does not exist");
                Err(OrderFlowError::AccountNotFound(account_id))
            },
            Err(e) => {
                warn!("📦️ Could not check whether account #{account_id} exists. {e}");
                Err(e.into())
            },
        }
    }

    pub async fn fetch_order(&self, order_id: i64) -> Result<OrderWithItems, OrderFlowError> {
        self.db.fetch_order(order_id).await?.ok_or(OrderFlowError::OrderNotFound(order_id))
    }

    /// Every order for the account, oldest first, with each line item decorated with the product's current catalog
    /// details. Line items whose product has left the catalog keep their purchase-time details.
    pub async fn orders_for_account(&self, account_id: i64) -> Result<Vec<OrderDetails>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_account(account_id).await?;
        let mut seen = HashSet::new();
        let ids = orders
            .iter()
            .flat_map(|o| o.line_items.iter().map(|item| item.product_id.clone()))
            .filter(|id| seen.insert(id.clone()))
            .collect::<Vec<String>>();
        let products = if ids.is_empty() {
            vec![]
        } else {
            self.catalog.fetch_products(&ids).await.map_err(|e| {
                warn!("📦️ Catalog lookup for account #{account_id}'s order history failed. {e}");
                OrderFlowError::from(e)
            })?
        };
        let by_id = products.iter().map(|p| (p.id.as_str(), p)).collect::<HashMap<&str, &CatalogProduct>>();
        let details = orders
            .into_iter()
            .map(|OrderWithItems { order, line_items }| {
                let products = line_items
                    .into_iter()
                    .map(|item| {
                        let current = by_id.get(item.product_id.as_str()).copied();
                        OrderedProduct::decorate(item, current)
                    })
                    .collect();
                OrderDetails { order, products }
            })
            .collect();
        Ok(details)
    }

    /// Records a payment outcome against the order.
    pub async fn update_order_status(&self, order_id: i64, status: TransactionStatus) -> Result<Order, OrderFlowError> {
        let order = self.db.update_order_status(order_id, status).await?;
        info!("📦️ Order #{order_id} payment status is now {status}. Order status: {}", order.status);
        Ok(order)
    }
}

/// Merges repeated product ids by adding up their quantities, keeping the order in which products first appear.
fn consolidate_cart(cart: Vec<CartEntry>) -> Result<Vec<(String, i64)>, OrderFlowError> {
    if cart.is_empty() {
        return Err(OrderFlowError::InvalidArgument("An order must contain at least one product".into()));
    }
    let mut result: Vec<(String, i64)> = Vec::with_capacity(cart.len());
    for CartEntry { product_id, quantity } in cart {
        if product_id.trim().is_empty() {
            return Err(OrderFlowError::InvalidArgument("Product ids cannot be empty".into()));
        }
        if quantity <= 0 {
            return Err(OrderFlowError::InvalidArgument(format!(
                "Quantity for product {product_id} must be positive, not {quantity}"
            )));
        }
        match result.iter_mut().find(|(id, _)| *id == product_id) {
            Some((_, q)) => {
                *q = q.checked_add(quantity).ok_or_else(|| {
                    OrderFlowError::InvalidArgument(format!("Total quantity for product {product_id} is too large"))
                })?
            },
            None => result.push((product_id, quantity)),
        }
    }
    Ok(result)
}
