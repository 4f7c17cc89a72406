use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{LineItem, NewLineItem, NewOrder, Order, OrderStatusType, OrderWithItems, TransactionStatus},
};

/// Inserts the order row and then each line item, using the given connection. This is not atomic on its own. Call it
/// inside a transaction and pass `&mut *tx` as the connection if the order must be all-or-nothing.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<OrderWithItems, SqliteDatabaseError> {
    let NewOrder { account_id, total_price, line_items } = order;
    let order = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (account_id, total_price, status, payment_status)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(account_id)
    .bind(total_price)
    .bind(OrderStatusType::New)
    .bind(TransactionStatus::Pending)
    .fetch_one(&mut *conn)
    .await?;
    trace!("🗃️ Order #{} inserted for account {account_id}", order.id);
    let mut items = Vec::with_capacity(line_items.len());
    for item in line_items {
        let item = insert_line_item(order.id, item, &mut *conn).await?;
        items.push(item);
    }
    debug!("🗃️ Order #{} stored with {} line items", order.id, items.len());
    Ok(OrderWithItems { order, line_items: items })
}

pub async fn insert_line_item(
    order_id: i64,
    item: NewLineItem,
    conn: &mut SqliteConnection,
) -> Result<LineItem, SqliteDatabaseError> {
    let item = sqlx::query_as::<_, LineItem>(
        r#"
            INSERT INTO line_items (order_id, product_id, quantity, name, description, unit_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.name)
    .bind(item.description)
    .bind(item.unit_price)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_orders_for_account(
    account_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE account_id = $1 ORDER BY created_at, id")
        .bind(account_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Fetches the line items for all the given orders, grouped by order and in insertion order within each group.
pub async fn fetch_line_items(order_ids: &[i64], conn: &mut SqliteConnection) -> Result<Vec<LineItem>, SqliteDatabaseError> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM line_items WHERE order_id IN (");
    let mut separated = builder.separated(", ");
    for id in order_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY order_id, id");
    let items = builder.build_query_as::<LineItem>().fetch_all(conn).await?;
    Ok(items)
}

/// Attaches line items to their orders, preserving the order of `orders`.
pub fn group_line_items(orders: Vec<Order>, mut items: Vec<LineItem>) -> Vec<OrderWithItems> {
    orders
        .into_iter()
        .map(|order| {
            let (mine, rest): (Vec<_>, Vec<_>) = items.drain(..).partition(|item| item.order_id == order.id);
            items = rest;
            OrderWithItems { order, line_items: mine }
        })
        .collect()
}

pub async fn update_payment_status(
    order_id: i64,
    status: TransactionStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
            UPDATE orders
            SET payment_status = $1, status = $2, updated_at = CURRENT_TIMESTAMP
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(OrderStatusType::from(status))
    .bind(order_id)
    .fetch_optional(conn)
    .await?
    .ok_or(SqliteDatabaseError::OrderNotFound(order_id))?;
    debug!("🗃️ Order #{order_id} payment status is now {status} ({})", order.status);
    Ok(order)
}
