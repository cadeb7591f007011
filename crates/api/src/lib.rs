//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Authentication middleware
//! - Request extractors
//! - Error-to-response mapping

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use regrouter_core::campaign::CampaignService;
use regrouter_core::investment::InvestmentService;
use regrouter_core::investor::InvestorService;
use regrouter_core::payment::{PaymentProvider, WebhookVerifier};
use regrouter_core::settlement::SettlementReconciler;
use regrouter_core::store::ComplianceStore;
use regrouter_shared::{AppConfig, JwtConfig, JwtService, Notifier};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Investor profiles and accreditation.
    pub investors: Arc<InvestorService>,
    /// Campaign management.
    pub campaigns: Arc<CampaignService>,
    /// Invest, cancel and trade orchestration.
    pub investments: Arc<InvestmentService>,
    /// Webhook ingestion.
    pub reconciler: Arc<SettlementReconciler>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
}

impl AppState {
    /// Wires the services over a store, a payment provider and a notifier.
    #[must_use]
    pub fn new(
        store: Arc<dyn ComplianceStore>,
        payments: Arc<dyn PaymentProvider>,
        notifier: Arc<dyn Notifier>,
        config: &AppConfig,
    ) -> Self {
        let reconciler = Arc::new(SettlementReconciler::new(
            Arc::clone(&store),
            WebhookVerifier::new(
                config.payment.webhook_secret.clone(),
                config.payment.webhook_tolerance_secs,
            ),
            config.compliance.settlement_delay(),
        ));

        let investments = InvestmentService::new(
            Arc::clone(&store),
            payments,
            notifier,
            Arc::clone(&reconciler),
            config.compliance.clone(),
            &config.payment,
        );

        Self {
            investors: Arc::new(InvestorService::new(
                Arc::clone(&store),
                config.compliance.accreditation_validity(),
            )),
            campaigns: Arc::new(CampaignService::new(store)),
            investments: Arc::new(investments),
            reconciler,
            jwt_service: Arc::new(JwtService::new(JwtConfig::from(&config.jwt))),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
