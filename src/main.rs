use anyhow::Result;
use sqlx::migrate::Migrator;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fx_pipeline::adapters::PostgresTransactionStore;
use fx_pipeline::config::Config;
use fx_pipeline::services::identity::HttpIdentityProvider;
use fx_pipeline::services::report::ReportServiceClient;
use fx_pipeline::services::storage::SignedUrlFileStore;
use fx_pipeline::{create_app, db, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fx_pipeline=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    Migrator::new(Path::new("./migrations")).await?.run(&pool).await?;
    tracing::info!("database migrations applied");

    let state = AppState {
        db: Some(pool.clone()),
        store: Arc::new(PostgresTransactionStore::new(pool)),
        identity: Arc::new(HttpIdentityProvider::new(config.identity_base_url.clone())),
        files: Arc::new(SignedUrlFileStore::new(
            config.storage_base_url.clone(),
            config.storage_signing_secret.clone(),
        )),
        reports: Arc::new(ReportServiceClient::new(config.report_service_url.clone())),
        policy: config.policy(),
    };

    let app = create_app(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
