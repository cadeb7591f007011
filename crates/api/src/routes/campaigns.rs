//! Campaign routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser};
use regrouter_core::campaign::NewCampaign;
use regrouter_core::compliance::{Campaign, RegulationLane};
use regrouter_core::investment::EscrowStatus;
use regrouter_shared::types::{PageRequest, PageResponse};

/// Creates the campaign routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/campaigns", get(list_campaigns).post(create_campaign))
        .route("/campaigns/{id}", get(get_campaign))
        .route("/campaigns/{id}/escrow", get(escrow_status))
}

/// Request body for creating a campaign.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Funding target.
    #[validate(custom(function = "positive"))]
    pub target_amount: Decimal,
    /// Funding deadline.
    pub deadline: DateTime<Utc>,
    /// Regulation lane code, `REG_CF` when omitted.
    #[validate(length(min = 1, max = 32))]
    pub regulation_type: Option<String>,
}

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("positive").with_message("must be positive".into()));
    }
    Ok(())
}

async fn create_campaign(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateCampaignRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = NewCampaign {
        name: payload.name,
        target_amount: payload.target_amount,
        deadline: payload.deadline,
        regulation_type: payload
            .regulation_type
            .unwrap_or_else(|| RegulationLane::RegCf.as_str().to_string()),
    };

    let campaign = state.campaigns.create(auth.investor_id(), input).await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

async fn list_campaigns(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<Campaign>>, ApiError> {
    Ok(Json(state.campaigns.list(&page).await?))
}

async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError> {
    Ok(Json(state.campaigns.get(id).await?))
}

async fn escrow_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EscrowStatus>, ApiError> {
    Ok(Json(state.investments.escrow_status(id).await?))
}
