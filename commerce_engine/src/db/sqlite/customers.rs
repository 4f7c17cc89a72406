use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db::{sqlite::SqliteDatabaseError, traits::InsertOutcome},
    db_types::{NewPaymentCustomer, PaymentCustomer},
};

pub async fn fetch_customer_by_user_id(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentCustomer>, SqliteDatabaseError> {
    let customer = sqlx::query_as::<_, PaymentCustomer>("SELECT * FROM payment_customers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(customer)
}

/// Inserts the customer. If another writer got there first, the existing row is kept and `AlreadyExists` is returned.
pub async fn insert_customer(
    customer: NewPaymentCustomer,
    conn: &mut SqliteConnection,
) -> Result<InsertOutcome, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            INSERT INTO payment_customers (user_id, provider_customer_id, billing_email, billing_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO NOTHING;
        "#,
    )
    .bind(customer.user_id)
    .bind(&customer.provider_customer_id)
    .bind(&customer.billing_email)
    .bind(&customer.billing_name)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        debug!("🗃️ A payment customer for user {} already exists", customer.user_id);
        Ok(InsertOutcome::AlreadyExists)
    } else {
        debug!("🗃️ Payment customer {} saved for user {}", customer.provider_customer_id, customer.user_id);
        Ok(InsertOutcome::Inserted)
    }
}
