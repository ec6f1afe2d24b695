pub mod adapters;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod services;
pub mod use_cases;
pub mod validation;

use axum::{
    Router, middleware::from_fn_with_state,
    routing::{get, patch, post},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::domain::PolicyConfig;
use crate::ports::{FileStore, IdentityProvider, ReportGenerator, TransactionStore};

#[derive(Clone)]
pub struct AppState {
    /// Present when backed by Postgres; drives the health report.
    pub db: Option<PgPool>,
    pub store: Arc<dyn TransactionStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub files: Arc<dyn FileStore>,
    pub reports: Arc<dyn ReportGenerator>,
    pub policy: PolicyConfig,
}

pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/transactions",
            get(handlers::transactions::list_transactions)
                .post(handlers::transactions::create_transaction),
        )
        .route("/transactions/:id", get(handlers::transactions::get_transaction))
        .route(
            "/transactions/:id/verify",
            post(handlers::transactions::verify_transaction),
        )
        .route(
            "/transactions/:id/approve",
            post(handlers::transactions::approve_transaction),
        )
        .route(
            "/transactions/:id/deny",
            post(handlers::transactions::deny_transaction),
        )
        .route(
            "/transactions/:id/financials",
            patch(handlers::transactions::correct_financials),
        )
        .route("/files", post(handlers::files::upload_file))
        .route("/files/access-url", get(handlers::files::file_access_url))
        .route("/reports/generate", post(handlers::reports::generate_report))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/login", post(handlers::auth::login))
        .merge(protected)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
