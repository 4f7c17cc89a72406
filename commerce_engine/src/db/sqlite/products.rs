use log::debug;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db::{sqlite::SqliteDatabaseError, traits::InsertOutcome},
    db_types::{Cents, NewPaymentProduct, PaymentProduct},
};

pub async fn fetch_product(
    product_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentProduct>, SqliteDatabaseError> {
    let product = sqlx::query_as::<_, PaymentProduct>("SELECT * FROM payment_products WHERE product_id = $1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

pub async fn fetch_products(
    product_ids: &[String],
    conn: &mut SqliteConnection,
) -> Result<Vec<PaymentProduct>, SqliteDatabaseError> {
    if product_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM payment_products WHERE product_id IN (");
    let mut separated = builder.separated(", ");
    for id in product_ids {
        separated.push_bind(id.as_str());
    }
    separated.push_unseparated(")");
    let products = builder.build_query_as::<PaymentProduct>().fetch_all(conn).await?;
    Ok(products)
}

pub async fn insert_product(
    product: NewPaymentProduct,
    conn: &mut SqliteConnection,
) -> Result<InsertOutcome, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            INSERT INTO payment_products (product_id, provider_product_id, name, price, currency)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (product_id) DO NOTHING;
        "#,
    )
    .bind(&product.product_id)
    .bind(&product.provider_product_id)
    .bind(&product.name)
    .bind(product.price)
    .bind(&product.currency)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        debug!("🗃️ Product {} is already mapped to a provider product", product.product_id);
        Ok(InsertOutcome::AlreadyExists)
    } else {
        debug!("🗃️ Product {} mapped to provider product {}", product.product_id, product.provider_product_id);
        Ok(InsertOutcome::Inserted)
    }
}

pub async fn update_details(
    product_id: &str,
    name: &str,
    price: Cents,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentProduct>, SqliteDatabaseError> {
    let product = sqlx::query_as::<_, PaymentProduct>(
        r#"
            UPDATE payment_products
            SET name = $1, price = $2, updated_at = CURRENT_TIMESTAMP
            WHERE product_id = $3
            RETURNING *;
        "#,
    )
    .bind(name)
    .bind(price)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    Ok(product)
}

pub async fn delete_product(product_id: &str, conn: &mut SqliteConnection) -> Result<bool, SqliteDatabaseError> {
    let result =
        sqlx::query("DELETE FROM payment_products WHERE product_id = $1").bind(product_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
