//! Investor profile and accreditation operations.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::compliance::{
    AccreditationGrant, AccreditationService, AccreditationStatus, InvestorProfile, KycStatus,
};
use crate::investor::error::InvestorError;
use crate::store::ComplianceStore;

/// Registration input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInvestor {
    /// Contact email, unique across investors.
    pub email: String,
    /// Initial KYC status.
    #[serde(default)]
    pub kyc_status: KycStatus,
    /// Declared accreditation flag.
    #[serde(default)]
    pub is_accredited: bool,
    /// Declared net worth.
    pub net_worth: Option<Decimal>,
    /// Declared annual income.
    pub annual_income: Option<Decimal>,
}

/// Manages investor profiles, KYC and the accreditation lifecycle.
pub struct InvestorService {
    store: Arc<dyn ComplianceStore>,
    accreditation_validity: Duration,
}

impl InvestorService {
    /// Creates the service. `accreditation_validity` is applied on admin
    /// verification.
    #[must_use]
    pub fn new(store: Arc<dyn ComplianceStore>, accreditation_validity: Duration) -> Self {
        Self {
            store,
            accreditation_validity,
        }
    }

    /// Registers a new investor with no accreditation claim.
    pub async fn register(&self, input: NewInvestor) -> Result<InvestorProfile, InvestorError> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(InvestorError::InvalidInput("email is invalid".to_string()));
        }
        for (field, value) in [
            ("net_worth", input.net_worth),
            ("annual_income", input.annual_income),
        ] {
            if value.is_some_and(|v| v.is_sign_negative()) {
                return Err(InvestorError::InvalidInput(format!(
                    "{field} must not be negative"
                )));
            }
        }

        let investor = self
            .store
            .insert_investor(InvestorProfile {
                id: Uuid::now_v7(),
                email,
                kyc_status: input.kyc_status,
                is_accredited: input.is_accredited,
                net_worth: input.net_worth,
                annual_income: input.annual_income,
                accreditation_status: AccreditationStatus::None,
                accreditation_verified_at: None,
                accreditation_verified_by: None,
                accreditation_expiry: None,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(investor_id = %investor.id, "investor registered");
        Ok(investor)
    }

    /// Fetches an investor.
    pub async fn get(&self, id: Uuid) -> Result<InvestorProfile, InvestorError> {
        self.store
            .find_investor(id)
            .await?
            .ok_or(InvestorError::NotFound)
    }

    /// Sets the KYC status reported by the identity provider.
    pub async fn update_kyc(
        &self,
        id: Uuid,
        status: KycStatus,
    ) -> Result<InvestorProfile, InvestorError> {
        let mut investor = self.get(id).await?;
        investor.kyc_status = status;
        let saved = self.save(&investor).await?;
        tracing::info!(investor_id = %id, kyc_status = %status, "kyc status updated");
        Ok(saved)
    }

    /// `NONE → SELF_CERTIFIED`.
    pub async fn self_certify(&self, id: Uuid) -> Result<InvestorProfile, InvestorError> {
        let mut investor = self.get(id).await?;
        AccreditationService::self_certify(&mut investor)?;
        self.save(&investor).await
    }

    /// Accepts accreditation documents and queues them for review.
    pub async fn submit_documents(
        &self,
        id: Uuid,
        content_type: &str,
    ) -> Result<InvestorProfile, InvestorError> {
        let mut investor = self.get(id).await?;
        AccreditationService::submit_documents(&mut investor, content_type)?;
        let saved = self.save(&investor).await?;
        tracing::info!(investor_id = %id, "accreditation documents submitted for review");
        Ok(saved)
    }

    /// Admin verification: `VERIFIED_DOCS` with a fresh expiry.
    pub async fn verify(
        &self,
        id: Uuid,
        admin_id: Uuid,
    ) -> Result<(InvestorProfile, AccreditationGrant), InvestorError> {
        self.verify_at(id, admin_id, Utc::now()).await
    }

    /// [`Self::verify`] with an explicit clock.
    pub async fn verify_at(
        &self,
        id: Uuid,
        admin_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(InvestorProfile, AccreditationGrant), InvestorError> {
        let mut investor = self.get(id).await?;
        let grant =
            AccreditationService::verify(&mut investor, admin_id, now, self.accreditation_validity)?;
        let saved = self.save(&investor).await?;
        tracing::info!(
            investor_id = %id,
            %admin_id,
            expiry = %grant.expiry,
            "accreditation verified"
        );
        Ok((saved, grant))
    }

    async fn save(&self, investor: &InvestorProfile) -> Result<InvestorProfile, InvestorError> {
        self.store
            .update_investor(investor)
            .await?
            .ok_or(InvestorError::NotFound)
    }
}
