//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that are more than a line or two MUST go into a separate module.
//!
//! Handlers run on the actix worker threads, so anything slow (upstream calls in particular) must be awaited, never
//! blocked on.
use actix_web::{routes, web, HttpResponse, Responder};
use log::*;

use crate::{
    data_objects::{HealthResponse, JsonResponse, RegisterRequest, UnregisterRequest},
    errors::ServerError,
    traits::{OrderSource, PushNotifier},
    watcher::{short_token, WatcherApi},
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
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[routes]
#[get("/")]
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().json(HealthResponse::running())
}

//----------------------------------------------   Register  ----------------------------------------------------
route!(register => Post "/register" impl OrderSource, PushNotifier);
/// Route handler for the register endpoint
///
/// Validates the supplied credentials against the order API and, if they are accepted, starts polling for new orders
/// on the user's behalf. New orders are announced with a push notification to `fcmToken`.
///
/// Registering an `fcmToken` that is already registered replaces the stored credentials.
///
/// * `200 {"success": true, "message": "Registration successful"}`
/// * `401 {"error": "Invalid credentials"}` if the order API refuses the credentials.
pub async fn register<O, P>(
    body: web::Json<RegisterRequest>,
    api: web::Data<WatcherApi<O, P>>,
) -> Result<HttpResponse, ServerError>
where
    O: OrderSource + 'static,
    P: PushNotifier + 'static,
{
    let RegisterRequest { username, password, fcm_token } = body.into_inner();
    debug!("💻️ Received registration request for {username}");
    if fcm_token.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("fcmToken must not be empty".to_string()));
    }
    let replaced = api.register(&fcm_token, &username, password).await?;
    trace!("💻️ {} registered. Replaced an earlier registration: {replaced}", short_token(&fcm_token));
    Ok(HttpResponse::Ok().json(JsonResponse::success("Registration successful")))
}

//----------------------------------------------   Unregister  ----------------------------------------------------
route!(unregister => Post "/unregister" impl OrderSource, PushNotifier);
/// Route handler for the unregister endpoint
///
/// Stops polling for the given `fcmToken`. Always succeeds, including for tokens that were never registered and for
/// requests without a readable JSON body, which are treated as carrying no token.
pub async fn unregister<O, P>(
    body: Option<web::Json<UnregisterRequest>>,
    api: web::Data<WatcherApi<O, P>>,
) -> HttpResponse
where
    O: OrderSource + 'static,
    P: PushNotifier + 'static,
{
    match body.and_then(|b| b.into_inner().fcm_token) {
        Some(token) => {
            let was_registered = api.unregister(&token).await;
            debug!("💻️ Unregistered {}. Was registered: {was_registered}", short_token(&token));
        },
        None => debug!("💻️ Unregister request without a token"),
    }
    HttpResponse::Ok().json(JsonResponse::ok())
}
