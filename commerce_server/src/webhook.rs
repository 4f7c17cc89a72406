//! Payment webhook reconciler.
//!
//! The payment provider calls `POST /webhook/payment` whenever a payment settles or fails. The raw body is
//! authenticated against the `webhook-signature` header before it is parsed. Once a webhook is authentic the provider
//! always gets a 200, even if recording it locally or forwarding it to the order service fails.
use std::{sync::Arc, time::Duration};

use actix_web::{web, HttpRequest, HttpResponse};
use commerce_common::Secret;
use commerce_engine::{
    db_types::{Cents, NewTransaction, TransactionStatus},
    traits::OrderStatusUpdater,
    PaymentApi,
    PaymentProjection,
};
use log::*;
use payment_provider::{
    webhook::{verify_and_parse, SIGNATURE_HEADER},
    WebhookEventType,
    WebhookPayload,
};

use crate::{data_objects::JsonResponse, errors::ServerError};

/// Everything the reconciler needs beyond the payment projection.
#[derive(Clone)]
pub struct WebhookContext {
    pub secret: Secret<String>,
    pub order_status: Arc<dyn OrderStatusUpdater>,
    /// Deadline for forwarding the outcome to the order service
    pub propagation_timeout: Duration,
}

impl WebhookContext {
    pub fn new(secret: Secret<String>, order_status: Arc<dyn OrderStatusUpdater>, propagation_timeout: Duration) -> Self {
        Self { secret, order_status, propagation_timeout }
    }
}

/// `payment.succeeded` and `payment.failed` carry an outcome. Anything else is recorded without one.
pub fn outcome_for(event: &WebhookEventType) -> Option<TransactionStatus> {
    match event {
        WebhookEventType::PaymentSucceeded => Some(TransactionStatus::Success),
        WebhookEventType::PaymentFailed => Some(TransactionStatus::Failed),
        WebhookEventType::Other(_) => None,
    }
}

pub fn new_transaction_from_webhook(payload: &WebhookPayload) -> NewTransaction {
    let data = &payload.data;
    NewTransaction {
        order_id: data.metadata.order_id,
        user_id: data.metadata.user_id,
        customer_id: data.customer.customer_id.clone(),
        provider_payment_id: data.payment_id.clone(),
        total_price: Cents::from(data.total_amount),
        settled_price: Cents::from(data.settled_amount),
        currency: data.currency.clone(),
        status: outcome_for(&payload.event()),
    }
}

crate::route!(payment_webhook => Post "/webhook/payment" impl PaymentProjection);
pub async fn payment_webhook<B: PaymentProjection>(
    req: HttpRequest,
    body: web::Bytes,
    api: web::Data<PaymentApi<B>>,
    context: web::Data<WebhookContext>,
) -> Result<HttpResponse, ServerError> {
    trace!("🪝️ Received payment webhook ({} bytes)", body.len());
    let signature = req.headers().get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let payload = verify_and_parse(context.secret.reveal(), &body, signature).map_err(|e| {
        warn!("🪝️ Rejected payment webhook. {e}");
        ServerError::from(e)
    })?;
    let event = payload.event();
    let transaction = new_transaction_from_webhook(&payload);
    let order_id = transaction.order_id;
    let payment_id = transaction.provider_payment_id.clone();
    let outcome = transaction.status;
    info!("🪝️ Payment webhook '{}' for payment {payment_id}, order #{order_id}", payload.event_type);

    if let Err(e) = api.record_transaction(transaction).await {
        error!("🪝️ Could not record payment {payment_id} for order #{order_id}. {e}");
    }

    match outcome {
        Some(status) => propagate_outcome(&context, order_id, status).await,
        None => debug!("🪝️ Webhook event {event:?} carries no payment outcome. Order #{order_id} is left as is."),
    }
    Ok(HttpResponse::Ok().json(JsonResponse::success("Webhook processed")))
}

async fn propagate_outcome(context: &WebhookContext, order_id: i64, status: TransactionStatus) {
    let update = context.order_status.update_order_status(order_id, status);
    match tokio::time::timeout(context.propagation_timeout, update).await {
        Ok(Ok(())) => info!("🪝️ Order #{order_id} marked as {status}"),
        Ok(Err(e)) => error!("🪝️ Could not mark order #{order_id} as {status}. {e}"),
        Err(_) => error!(
            "🪝️ Timed out after {}ms marking order #{order_id} as {status}",
            context.propagation_timeout.as_millis()
        ),
    }
}
