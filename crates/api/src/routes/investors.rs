//! Investor profile and accreditation routes.

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{AppState, error::ApiError, extractors::ValidatedJson, middleware::AuthUser};
use regrouter_core::compliance::{AccreditationGrant, InvestorProfile, KycStatus};
use regrouter_core::investor::NewInvestor;

/// Public investor routes.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/investors", post(register_investor))
}

/// Investor routes behind authentication.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/investors/{id}", get(get_investor))
        .route("/investors/{id}/kyc", post(update_kyc))
        .route(
            "/investors/me/accreditation/self-certify",
            post(self_certify),
        )
        .route("/investors/me/accreditation/upload", post(upload_accreditation))
        .route("/admin/investors/{id}/verify", post(verify_accreditation))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for registering an investor.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInvestorRequest {
    /// Contact email.
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    /// Initial KYC status.
    #[serde(default)]
    pub kyc_status: KycStatus,
    /// Declared accreditation flag.
    #[serde(default)]
    pub is_accredited: bool,
    /// Declared net worth.
    #[validate(custom(function = "non_negative"))]
    pub net_worth: Option<Decimal>,
    /// Declared annual income.
    #[validate(custom(function = "non_negative"))]
    pub annual_income: Option<Decimal>,
}

/// Request body for a KYC status update.
#[derive(Debug, Deserialize)]
pub struct UpdateKycRequest {
    /// New status.
    pub kyc_status: KycStatus,
}

/// Response for an admin verification.
#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    /// Updated profile.
    pub investor: InvestorProfile,
    /// Verification details.
    pub accreditation: AccreditationGrant,
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("non_negative").with_message("must not be negative".into()));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn register_investor(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterInvestorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let investor = state
        .investors
        .register(NewInvestor {
            email: payload.email,
            kyc_status: payload.kyc_status,
            is_accredited: payload.is_accredited,
            net_worth: payload.net_worth,
            annual_income: payload.annual_income,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(investor)))
}

async fn get_investor(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InvestorProfile>, ApiError> {
    Ok(Json(state.investors.get(id).await?))
}

async fn update_kyc(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateKycRequest>,
) -> Result<Json<InvestorProfile>, ApiError> {
    auth.require_admin()?;
    Ok(Json(state.investors.update_kyc(id, payload.kyc_status).await?))
}

async fn self_certify(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<InvestorProfile>, ApiError> {
    Ok(Json(state.investors.self_certify(auth.investor_id()).await?))
}

/// Accepts a PDF in the `file` field. The content is read and discarded;
/// only the review request is recorded.
async fn upload_accreditation(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<InvestorProfile>, ApiError> {
    let investor_id = auth.investor_id();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?;

        let investor = state
            .investors
            .submit_documents(investor_id, &content_type)
            .await?;
        tracing::info!(%investor_id, %filename, size = bytes.len(), "accreditation proof received");
        return Ok(Json(investor));
    }

    Err(ApiError::validation("multipart field `file` is required"))
}

async fn verify_accreditation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<VerificationResponse>, ApiError> {
    auth.require_admin()?;
    let (investor, accreditation) = state.investors.verify(id, auth.investor_id()).await?;
    Ok(Json(VerificationResponse {
        investor,
        accreditation,
    }))
}
