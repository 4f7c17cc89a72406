use std::{collections::HashMap, fmt::Debug, sync::Arc};

use log::*;

use crate::{
    api::{
        errors::PaymentApiError,
        order_objects::CartEntry,
        payment_objects::{BillingDetails, CheckoutRequest, ProductSyncOutcome},
    },
    db::traits::{InsertOutcome, PaymentProjection, UpsertOutcome},
    db_types::{Cents, NewPaymentCustomer, NewPaymentProduct, NewTransaction, PaymentCustomer, Transaction},
    traits::{CheckoutLine, PaymentProvider, ProviderProductDetails, RemoteCallError},
};

/// `PaymentApi` keeps the hosted payment provider and the local payment projection consistent.
///
/// Every provider-side object the payment service creates (customers, products) is recorded locally, keyed on the
/// local id, so that repeated calls reuse the same provider object instead of creating duplicates.
pub struct PaymentApi<B> {
    db: B,
    provider: Arc<dyn PaymentProvider>,
}

impl<B> Debug for PaymentApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentApi")
    }
}

impl<B: Clone> Clone for PaymentApi<B> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), provider: Arc::clone(&self.provider) }
    }
}

impl<B> PaymentApi<B> {
    pub fn new(db: B, provider: Arc<dyn PaymentProvider>) -> Self {
        Self { db, provider }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> PaymentApi<B>
where B: PaymentProjection
{
    /// Creates the product at the provider and records the mapping. A product that is already mapped is left alone.
    pub async fn register_product(
        &self,
        product_id: &str,
        name: &str,
        description: Option<&str>,
        price: Cents,
    ) -> Result<ProductSyncOutcome, PaymentApiError> {
        if self.db.fetch_product(product_id).await?.is_some() {
            debug!("💳️ Product {product_id} is already registered with the payment provider");
            return Ok(ProductSyncOutcome::AlreadyRegistered);
        }
        let details = ProviderProductDetails {
            name: name.to_string(),
            description: description.map(String::from),
            price,
        };
        let provider_product_id = self.provider.create_product(details).await?;
        let product = NewPaymentProduct {
            product_id: product_id.to_string(),
            provider_product_id: provider_product_id.clone(),
            name: name.to_string(),
            price,
            currency: self.provider.currency(),
        };
        match self.db.insert_product(product).await? {
            InsertOutcome::Inserted => {
                info!("💳️ Product {product_id} registered with the payment provider as {provider_product_id}");
                Ok(ProductSyncOutcome::Registered)
            },
            InsertOutcome::AlreadyExists => {
                warn!(
                    "💳️ Product {product_id} was registered concurrently. Provider product {provider_product_id} is \
                     unused."
                );
                Ok(ProductSyncOutcome::AlreadyRegistered)
            },
        }
    }

    /// Pushes a name and/or price change to the provider. Only values that differ from the ones last sent are pushed.
    pub async fn update_product(
        &self,
        product_id: &str,
        name: Option<&str>,
        price: Option<Cents>,
    ) -> Result<ProductSyncOutcome, PaymentApiError> {
        let Some(existing) = self.db.fetch_product(product_id).await? else {
            warn!("💳️ Product {product_id} is not registered with the payment provider. Ignoring the update.");
            return Ok(ProductSyncOutcome::NotTracked);
        };
        let new_name = name.filter(|n| *n != existing.name);
        let new_price = price.filter(|p| *p != existing.price);
        if new_name.is_none() && new_price.is_none() {
            debug!("💳️ Nothing to update for product {product_id}");
            return Ok(ProductSyncOutcome::Unchanged);
        }
        self.provider.update_product(&existing.provider_product_id, new_name.map(String::from), new_price).await?;
        let name = new_name.unwrap_or(existing.name.as_str());
        let price = new_price.unwrap_or(existing.price);
        self.db.update_product_details(product_id, name, price).await?;
        info!("💳️ Product {product_id} updated at the payment provider");
        Ok(ProductSyncOutcome::Updated)
    }

    /// Archives the product at the provider, then forgets the mapping. Archiving is idempotent at the provider, so a
    /// failure between the two steps is fixed by calling this again.
    pub async fn archive_product(&self, product_id: &str) -> Result<ProductSyncOutcome, PaymentApiError> {
        let Some(existing) = self.db.fetch_product(product_id).await? else {
            debug!("💳️ Product {product_id} is not registered with the payment provider. Nothing to archive.");
            return Ok(ProductSyncOutcome::NotTracked);
        };
        match self.provider.archive_product(&existing.provider_product_id).await {
            Ok(()) => {},
            Err(RemoteCallError::NotFound(_)) => {
                warn!("💳️ Provider product {} no longer exists. Removing the mapping.", existing.provider_product_id);
            },
            Err(e) => return Err(e.into()),
        }
        self.db.delete_product(product_id).await?;
        info!("💳️ Product {product_id} archived");
        Ok(ProductSyncOutcome::Archived)
    }

    /// Returns the customer record for the user, creating it at the provider first if there isn't one yet.
    pub async fn find_or_create_customer(&self, billing: &BillingDetails) -> Result<PaymentCustomer, PaymentApiError> {
        let user_id = billing.user_id;
        if let Some(customer) = self.db.fetch_customer(user_id).await? {
            trace!("💳️ Reusing provider customer {} for user #{user_id}", customer.provider_customer_id);
            return Ok(customer);
        }
        let provider_customer_id = self.provider.create_customer(&billing.email, &billing.name).await?;
        let customer = NewPaymentCustomer {
            user_id,
            provider_customer_id: provider_customer_id.clone(),
            billing_email: billing.email.clone(),
            billing_name: billing.name.clone(),
        };
        match self.db.insert_customer(customer).await? {
            InsertOutcome::Inserted => {
                info!("💳️ Created provider customer {provider_customer_id} for user #{user_id}")
            },
            InsertOutcome::AlreadyExists => warn!(
                "💳️ A customer for user #{user_id} was created concurrently. Provider customer \
                 {provider_customer_id} is unused."
            ),
        }
        self.db.fetch_customer(user_id).await?.ok_or_else(|| {
            error!("💳️ Customer for user #{user_id} was not found straight after inserting it.");
            PaymentApiError::DatabaseError(format!("Customer for user #{user_id} is missing"))
        })
    }

    /// Opens a hosted checkout for the order and returns its URL. The order and user ids travel with the payment and
    /// come back in the provider's webhook.
    pub async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<String, PaymentApiError> {
        let CheckoutRequest { billing, order_id, redirect_url, products } = request;
        let lines = self.checkout_lines(&products).await?;
        let customer = self.find_or_create_customer(&billing).await?;
        let url = self
            .provider
            .create_checkout_session(&customer.provider_customer_id, lines, &redirect_url, order_id, billing.user_id)
            .await?;
        info!("💳️ Checkout session created for order #{order_id}");
        Ok(url)
    }

    async fn checkout_lines(&self, products: &[CartEntry]) -> Result<Vec<CheckoutLine>, PaymentApiError> {
        if products.is_empty() {
            return Err(PaymentApiError::InvalidArgument("A checkout must contain at least one product".into()));
        }
        if let Some(entry) = products.iter().find(|e| e.quantity <= 0) {
            return Err(PaymentApiError::InvalidArgument(format!(
                "Quantity for product {} must be positive",
                entry.product_id
            )));
        }
        let ids = products.iter().map(|e| e.product_id.clone()).collect::<Vec<String>>();
        let mapped = self.db.fetch_products(&ids).await?;
        let by_id = mapped.iter().map(|p| (p.product_id.as_str(), p.provider_product_id.as_str())).collect::<HashMap<_, _>>();
        products
            .iter()
            .map(|entry| match by_id.get(entry.product_id.as_str()) {
                Some(provider_id) => {
                    Ok(CheckoutLine { provider_product_id: provider_id.to_string(), quantity: entry.quantity })
                },
                None => Err(PaymentApiError::ProductNotFound(entry.product_id.clone())),
            })
            .collect()
    }

    /// Returns the URL of the provider's self-service portal for the user.
    pub async fn create_customer_portal_session(&self, billing: &BillingDetails) -> Result<String, PaymentApiError> {
        let customer = self.find_or_create_customer(billing).await?;
        let url = self.provider.create_customer_portal_session(&customer.provider_customer_id).await?;
        debug!("💳️ Customer portal session created for user #{}", billing.user_id);
        Ok(url)
    }

    /// Stores the payment outcome. Replays of the same provider payment id update the existing row.
    pub async fn record_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<(Transaction, UpsertOutcome), PaymentApiError> {
        let payment_id = transaction.provider_payment_id.clone();
        let (tx, outcome) = self.db.upsert_transaction(transaction).await?;
        match outcome {
            UpsertOutcome::Inserted => info!("💳️ Payment {payment_id} for order #{} recorded as {}", tx.order_id, tx.status),
            UpsertOutcome::Updated => info!("💳️ Payment {payment_id} for order #{} is now {}", tx.order_id, tx.status),
        }
        Ok((tx, outcome))
    }

    pub async fn fetch_transaction(&self, provider_payment_id: &str) -> Result<Option<Transaction>, PaymentApiError> {
        Ok(self.db.fetch_transaction(provider_payment_id).await?)
    }

    pub async fn transactions_for_order(&self, order_id: i64) -> Result<Vec<Transaction>, PaymentApiError> {
        Ok(self.db.fetch_transactions_for_order(order_id).await?)
    }
}
