use std::sync::Arc;

use survey_webhook::{
    database::Database,
    routes::{create_router, AppState},
    store::WEBHOOK_URL_SETTING,
    Configuration, ConfigStore, EventSource, HttpDispatcher, PluginRegistry, WebHook,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("survey_webhook=info")),
        )
        .init();

    let configuration = Configuration::from_env().expect("Failed to load configuration");

    let database = Database::initialize(
        configuration.database_url.clone(),
        configuration.database_auth_token.clone(),
    )
    .await
    .expect("Failed to initialize database");
    let database = Arc::new(database);

    if let Some(default_webhook_url) = &configuration.default_webhook_url {
        database
            .set_global_setting(WEBHOOK_URL_SETTING, default_webhook_url)
            .await
            .expect("Failed to store default webhook URL");
        tracing::info!("Default webhook URL set to {default_webhook_url}");
    }

    let dispatcher = HttpDispatcher::new(configuration.webhook_timeout)
        .expect("Failed to create HTTP client");

    let mut registry = PluginRegistry::new();
    registry.subscribe(Arc::new(WebHook::new(
        database.clone(),
        database.clone(),
        Arc::new(dispatcher),
    )));

    let app = create_router(AppState {
        settings: database,
        registry: Arc::new(registry),
    });

    let listener = tokio::net::TcpListener::bind(configuration.listen_address)
        .await
        .expect("Failed to bind listen address");
    tracing::info!(
        "listening on http://{}",
        listener
            .local_addr()
            .expect("Listener should have a local address")
    );
    axum::serve(listener, app).await.expect("Server error");
}
