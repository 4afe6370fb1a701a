//! HRM leave service.
//!
//! Main entry point for the leave balance and approval API.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hrm_api::{AppState, create_router};
use hrm_core::leave::{LeaveCoordinator, LeaveQueryService, LeaveRules};
use hrm_db::{LeaveQueryRepository, LeaveRepository, connect};
use hrm_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hrm_core=debug,hrm_db=debug,hrm_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    let rules = LeaveRules::from(&config.leave);
    info!(
        min_reason_len = rules.min_reason_len,
        max_attachments = rules.max_attachments,
        max_attachment_bytes = rules.max_attachment_bytes,
        "Leave rules configured"
    );

    let coordinator =
        LeaveCoordinator::new(Arc::new(LeaveRepository::new(db.clone()))).with_rules(rules);
    let queries = LeaveQueryService::new(Arc::new(LeaveQueryRepository::new(db)));

    let state = AppState {
        coordinator: Arc::new(coordinator),
        queries: Arc::new(queries),
        jwt_service: Arc::new(jwt_service),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
