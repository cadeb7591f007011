//! Payment provider webhook.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};

use crate::{AppState, error::ApiError};
use regrouter_core::settlement::WebhookAck;

/// Header carrying `t=<unix>,v1=<hex>`.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Creates the webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks/stripe", post(stripe_webhook))
}

/// Verifies the signature over the raw body, then applies the event.
/// Unmatched and unknown events are acknowledged the same way.
async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let ack = state.reconciler.handle_webhook(&body, signature).await?;
    Ok(Json(ack))
}
