use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use campus_core::config::Config;
use campus_core::tracing::init_tracing;
use campus_provisioning::config::ProvisioningConfig;
use campus_provisioning::infra::identity::HttpIdentityStore;
use campus_provisioning::router::build_router;
use campus_provisioning::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing("campus_provisioning=info,tower_http=info");

    let config = ProvisioningConfig::from_env();
    info!(?config, "loaded configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.identity_timeout_secs))
        .build()
        .expect("failed to build HTTP client");

    let state = AppState {
        db,
        identity_store: HttpIdentityStore::new(client, &config.auth_url, config.auth_service_key),
        jwt_secret: config.jwt_secret,
        login_domain: config.login_domain,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.provisioning_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("provisioning service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
