//! Ledger routes: invest, cancel, trade and listing.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser};
use regrouter_core::ledger::{LedgerEntry, LedgerStatus, TradeRequest};
use regrouter_shared::AppError;
use regrouter_shared::types::{PageRequest, PageResponse};

/// Creates the ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/invest", post(create_investment))
        .route("/ledger/investments/{id}/cancel", post(cancel_investment))
        .route("/ledger/trade", post(create_trade))
        .route("/ledger/{investor_id}", get(list_entries))
}

/// Request body for an investment.
#[derive(Debug, Deserialize, Validate)]
pub struct InvestRequest {
    /// Target campaign.
    pub campaign_id: Uuid,
    /// Amount in major units.
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
}

/// Request body for a secondary-market trade.
#[derive(Debug, Deserialize, Validate)]
pub struct TradeBody {
    /// Campaign whose interest is traded.
    pub campaign_id: Uuid,
    /// Trade amount.
    #[validate(custom(function = "positive"))]
    pub amount: Decimal,
    /// Purchase date of the interest being sold.
    pub original_transaction_date: DateTime<Utc>,
    /// Recorded status, `pending_settlement` when omitted.
    pub status: Option<String>,
}

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("positive").with_message("must be positive".into()));
    }
    Ok(())
}

async fn create_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<InvestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = state
        .investments
        .invest(auth.investor_id(), payload.campaign_id, payload.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn cancel_investment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LedgerEntry>, ApiError> {
    Ok(Json(state.investments.cancel(auth.investor_id(), id).await?))
}

async fn create_trade(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<TradeBody>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match payload.status.as_deref() {
        None => LedgerStatus::PendingSettlement,
        Some(raw) => LedgerStatus::parse(raw)
            .ok_or_else(|| AppError::InvalidStatus(raw.to_string()))?,
    };

    let entry = state
        .investments
        .trade(
            auth.investor_id(),
            TradeRequest {
                campaign_id: payload.campaign_id,
                amount: payload.amount,
                original_transaction_date: payload.original_transaction_date,
                status,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn list_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(investor_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<LedgerEntry>>, ApiError> {
    Ok(Json(
        state
            .investments
            .list_entries(auth.investor_id(), investor_id, &page)
            .await?,
    ))
}
