//! Reg-Router API Server
//!
//! Main entry point for the compliance routing service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use regrouter_api::{AppState, create_router};
use regrouter_core::payment::StripeClient;
use regrouter_db::{PgComplianceStore, connect_with};
use regrouter_shared::{AppConfig, EmailService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "regrouter=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    let payments = StripeClient::new(&config.payment).context("failed to build payment client")?;
    info!(base_url = %config.payment.api_base_url, "Payment provider configured");

    let email_service = EmailService::new(config.email.clone());
    info!(
        enabled = config.email.enabled,
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    let state = AppState::new(
        Arc::new(PgComplianceStore::new(db, config.database.max_connections)),
        Arc::new(payments),
        Arc::new(email_service),
        &config,
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
