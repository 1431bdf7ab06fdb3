use std::time::Duration;

use actix_web::{
    dev::Server,
    error::{JsonPayloadError, PathError},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    Error,
    HttpRequest,
    HttpServer,
};
use log::*;
use provisioning_engine::{
    events::{EventHandlers, EventProducers},
    OrderFlowApi,
    SqliteDatabase,
};

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    integrations::{events::logging_hooks, PanelGateway, PaypalGateway},
    routes::{health, CaptureOrderRoute, CreateOrderRoute, MyServersRoute, RetryProvisioningRoute},
};

const EVENT_BUFFER_SIZE: usize = 64;

pub type HostingApi = OrderFlowApi<SqliteDatabase, PaypalGateway, PanelGateway>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if config.run_migrations {
        SqliteDatabase::create_if_missing(&config.database_url)
            .await
            .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let payments =
        PaypalGateway::new(config.paypal.clone()).map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
    let panel = PanelGateway::new(config.panel.clone()).map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, logging_hooks());
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, payments, panel, producers)?;
    srv.await.map_err(|e| ServerError::BackendError(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    payments: PaypalGateway,
    panel: PanelGateway,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let settings = config.checkout_settings();
    info!("🪛️ Buyers return to {} after approving a payment", settings.return_url);
    let auth = config.auth.clone();
    let srv = HttpServer::new(move || {
        let orders_api: HostingApi =
            OrderFlowApi::new(db.clone(), payments.clone(), panel.clone(), producers.clone(), settings.clone());
        let token_issuer = TokenIssuer::new(&auth);
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase, PaypalGateway, PanelGateway>::new())
            .service(CaptureOrderRoute::<SqliteDatabase, PaypalGateway, PanelGateway>::new())
            .service(MyServersRoute::<SqliteDatabase, PaypalGateway, PanelGateway>::new())
            .service(RetryProvisioningRoute::<SqliteDatabase, PaypalGateway, PanelGateway>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("hosting::access_log"))
            .app_data(json_config())
            .app_data(path_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(token_issuer))
            .service(api_scope)
            .service(health)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed bodies get the same `{"error": ...}` treatment as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| -> Error {
        debug!("💻️ Rejected request body. {err}");
        ServerError::InvalidRequestBody(format!("Could not read request body. {err}")).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| -> Error {
        ServerError::InvalidRequestBody(format!("Invalid path. {err}")).into()
    })
}
