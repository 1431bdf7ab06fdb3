//! Request handler definitions
//!
//! Define each route and its handler here. Handlers stay thin: they authenticate, translate the request into an
//! engine call, and translate the result back. Anything with business logic belongs in the provisioning engine.
//!
//! Every handler awaits network and database I/O, so none of them block a worker thread.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use provisioning_engine::{
    order_objects::CheckoutRequest,
    HostingDatabase,
    OrderFlowApi,
    PaymentGateway,
    ProvisioningGateway,
};

use crate::{
    auth::{JwtClaims, Role},
    data_objects::{CaptureOrderParams, CaptureOrderResponse, CreateOrderParams, CreateOrderResponse, ServerView},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
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
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),*]) => {
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
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
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
route!(create_order => Post "/orders" impl HostingDatabase, PaymentGateway, ProvisioningGateway);
/// Starts a checkout for the authenticated customer.
///
/// Body: `{planId, serverName, billingCycle?, orderType?, userServerId?}`. Responds with the PayPal order id and the
/// link the buyer must follow to approve the payment.
pub async fn create_order<B, P, G>(
    claims: JwtClaims,
    body: web::Json<CreateOrderParams>,
    api: web::Data<OrderFlowApi<B, P, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: HostingDatabase,
    P: PaymentGateway,
    G: ProvisioningGateway,
{
    debug!("💻️ POST create_order for {}", claims.sub);
    let request = CheckoutRequest::try_from(body.into_inner())?;
    let session = api.create_order(&claims.caller(), request).await?;
    Ok(HttpResponse::Ok().json(CreateOrderResponse::from(session)))
}

route!(capture_order => Post "/orders/capture" impl HostingDatabase, PaymentGateway, ProvisioningGateway);
/// Captures an approved PayPal order and provisions what was bought.
///
/// A `200` means the customer has paid. Whether the server is running is a separate question, answered by the
/// `error` field of the response.
pub async fn capture_order<B, P, G>(
    claims: JwtClaims,
    body: web::Json<CaptureOrderParams>,
    api: web::Data<OrderFlowApi<B, P, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: HostingDatabase,
    P: PaymentGateway,
    G: ProvisioningGateway,
{
    let params = body.into_inner();
    debug!("💻️ POST capture_order {} for {}", params.paypal_order_id, claims.sub);
    let outcome = api.capture_order(&claims.caller(), params.paypal_order_id.trim()).await?;
    if let Some(e) = &outcome.error {
        warn!("💻️ Capture for server #{} succeeded but provisioning did not. {e}", outcome.user_server_id);
    }
    Ok(HttpResponse::Ok().json(CaptureOrderResponse::from(outcome)))
}

//----------------------------------------------   Servers  ----------------------------------------------------
route!(my_servers => Get "/servers" impl HostingDatabase, PaymentGateway, ProvisioningGateway);
/// The authenticated customer's servers, newest first. Credentials are never included.
pub async fn my_servers<B, P, G>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B, P, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: HostingDatabase,
    P: PaymentGateway,
    G: ProvisioningGateway,
{
    debug!("💻️ GET my_servers for {}", claims.sub);
    let servers = api.servers_for_user(&claims.caller()).await?;
    let servers = servers.into_iter().map(ServerView::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(servers))
}

route!(retry_provisioning => Post "/admin/servers/{id}/provision" impl HostingDatabase, PaymentGateway, ProvisioningGateway where requires [Role::Admin]);
/// Operator endpoint. Runs provisioning again for a paid server that is still `pending`, typically after a failed
/// attempt has been investigated and the cause fixed.
pub async fn retry_provisioning<B, P, G>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, P, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: HostingDatabase,
    P: PaymentGateway,
    G: ProvisioningGateway,
{
    let server_id = path.into_inner();
    info!("💻️ {} requested a provisioning retry for server #{server_id}", claims.sub);
    let outcome = api.retry_provisioning(server_id).await?;
    Ok(HttpResponse::Ok().json(CaptureOrderResponse::from(outcome)))
}
