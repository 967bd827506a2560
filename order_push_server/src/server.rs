use std::time::Duration;

use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
};
use fcm_tools::FcmClient;
use ghazaresan_tools::GhazaresanApi;
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{health, RegisterRoute, UnregisterRoute},
    traits::{OrderSource, PushNotifier},
    watcher::WatcherApi,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let orders = GhazaresanApi::new(config.ghazaresan.clone())?;
    let push = FcmClient::new(config.fcm.clone())?;
    let api = WatcherApi::new(orders, push, config.poll_interval);
    info!("🕰️ Orders will be checked every {}s for each registered user", config.poll_interval.as_secs());
    let srv = create_server_instance(&config, api.clone())?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("🕰️ Server stopped. Cancelling {} order watchers", api.watched_count().await);
    api.shutdown().await;
    result
}

pub fn create_server_instance<O, P>(config: &ServerConfig, api: WatcherApi<O, P>) -> Result<Server, ServerError>
where
    O: OrderSource + 'static,
    P: PushNotifier + 'static,
{
    let api = web::Data::new(api);
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("opn::access_log"))
            .app_data(json_config())
            .app_data(api.clone())
            .service(health)
            .service(RegisterRoute::<O, P>::new())
            .service(UnregisterRoute::<O, P>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Unreadable JSON bodies get the same `{"error": ...}` shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        debug!("💻️ Rejecting request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}
