use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewTransaction, Transaction},
};

pub async fn fetch_transaction(
    provider_payment_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, SqliteDatabaseError> {
    let tx = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE provider_payment_id = $1")
        .bind(provider_payment_id)
        .fetch_optional(conn)
        .await?;
    Ok(tx)
}

pub async fn fetch_transactions_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Transaction>, SqliteDatabaseError> {
    let txs = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(txs)
}

/// Inserts or updates the transaction keyed on `provider_payment_id`. A missing status leaves the stored one alone,
/// and new rows default to `pending`.
pub async fn upsert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, SqliteDatabaseError> {
    let tx = sqlx::query_as::<_, Transaction>(
        r#"
            INSERT INTO transactions (
                order_id,
                user_id,
                customer_id,
                provider_payment_id,
                total_price,
                settled_price,
                currency,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 'pending'))
            ON CONFLICT (provider_payment_id) DO UPDATE SET
                order_id = excluded.order_id,
                user_id = excluded.user_id,
                customer_id = excluded.customer_id,
                total_price = excluded.total_price,
                settled_price = excluded.settled_price,
                currency = excluded.currency,
                status = COALESCE($9, transactions.status),
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(transaction.order_id)
    .bind(transaction.user_id)
    .bind(&transaction.customer_id)
    .bind(&transaction.provider_payment_id)
    .bind(transaction.total_price)
    .bind(transaction.settled_price)
    .bind(&transaction.currency)
    .bind(transaction.status)
    .bind(transaction.status)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Transaction {} for order #{} is {}", tx.provider_payment_id, tx.order_id, tx.status);
    Ok(tx)
}
