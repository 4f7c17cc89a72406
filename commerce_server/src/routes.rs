//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module (see [`crate::webhook`]). Keep this module
//! neat and tidy 🙏
//!
//! Handlers never block. Every database or remote call is awaited, so a worker thread keeps serving other requests
//! while one is waiting on I/O.
use actix_web::{get, web, HttpResponse, Responder};
use commerce_engine::{
    db_types::TransactionStatus,
    payment_objects::{BillingDetails, CheckoutRequest},
    OrderFlowApi,
    OrderManagement,
    PaymentApi,
    PaymentProjection,
};
use log::*;

use crate::{
    data_objects::{OrderStatusUpdate, PlaceOrderRequest, UrlResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
// The handler is attached as a method-guarded route, so other methods on the same path get a 405.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .route(actix_web::web::route().guard(actix_web::guard::$method()).to($name::< $( [< T $bounds:camel >], )+>));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/orders" impl OrderManagement);
/// Places an order for the account. The response carries the stored order and its frozen line items.
pub async fn place_order<B: OrderManagement>(
    body: web::Json<PlaceOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let PlaceOrderRequest { account_id, products } = body.into_inner();
    debug!("💻️ Received order for account #{account_id} with {} products", products.len());
    let order = api.place_order(account_id, products).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    trace!("💻️ GET order #{order_id}");
    let order = api.fetch_order(order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(orders_for_account => Get "/orders/account/{account_id}" impl OrderManagement);
pub async fn orders_for_account<B: OrderManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let account_id = path.into_inner();
    trace!("💻️ GET orders for account #{account_id}");
    let orders = api.orders_for_account(account_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(update_order_status => Put "/orders/{order_id}/status" impl OrderManagement);
pub async fn update_order_status<B: OrderManagement>(
    path: web::Path<i64>,
    body: web::Json<OrderStatusUpdate>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let status = body.status.parse::<TransactionStatus>().map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    debug!("💻️ Order #{order_id} payment status update: {status}");
    let order = api.update_order_status(order_id, status).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(checkout => Post "/checkout" impl PaymentProjection);
/// Opens a hosted checkout for an order. The caller is redirected to the returned URL.
pub async fn checkout<B: PaymentProjection>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ Checkout requested for order #{} by user #{}", request.order_id, request.billing.user_id);
    let url = api.create_checkout_session(request).await?;
    Ok(HttpResponse::Ok().json(UrlResponse { url }))
}

route!(customer_portal => Post "/customer_portal" impl PaymentProjection);
pub async fn customer_portal<B: PaymentProjection>(
    body: web::Json<BillingDetails>,
    api: web::Data<PaymentApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let billing = body.into_inner();
    debug!("💻️ Customer portal requested by user #{}", billing.user_id);
    let url = api.create_customer_portal_session(&billing).await?;
    Ok(HttpResponse::Ok().json(UrlResponse { url }))
}
