//! Campaign creation and queries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use regrouter_shared::types::{PageRequest, PageResponse};

use crate::campaign::error::CampaignError;
use crate::compliance::{Campaign, FundingStatus, RegulationLane};
use crate::store::ComplianceStore;

/// Creation input.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCampaign {
    /// Display name.
    pub name: String,
    /// Funding target.
    pub target_amount: Decimal,
    /// Funding deadline.
    pub deadline: DateTime<Utc>,
    /// Regulation lane code, `REG_CF` when omitted.
    #[serde(default = "default_regulation_type")]
    pub regulation_type: String,
}

fn default_regulation_type() -> String {
    RegulationLane::RegCf.as_str().to_string()
}

/// Creates and reads campaigns.
pub struct CampaignService {
    store: Arc<dyn ComplianceStore>,
}

impl CampaignService {
    /// Creates the service.
    #[must_use]
    pub fn new(store: Arc<dyn ComplianceStore>) -> Self {
        Self { store }
    }

    /// Creates an active campaign owned by `issuer_id`.
    ///
    /// The regulation type is stored verbatim; an unrecognized value is
    /// rejected when someone tries to invest.
    pub async fn create(
        &self,
        issuer_id: Uuid,
        input: NewCampaign,
    ) -> Result<Campaign, CampaignError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CampaignError::InvalidInput("name is required".to_string()));
        }
        if input.target_amount <= Decimal::ZERO {
            return Err(CampaignError::InvalidInput(
                "target_amount must be positive".to_string(),
            ));
        }

        let campaign = self
            .store
            .insert_campaign(Campaign {
                id: Uuid::now_v7(),
                issuer_id,
                name: name.to_string(),
                target_amount: input.target_amount,
                deadline: input.deadline,
                regulation_type: input.regulation_type,
                funding_status: FundingStatus::Active,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            campaign_id = %campaign.id,
            %issuer_id,
            regulation_type = %campaign.regulation_type,
            "campaign created"
        );
        Ok(campaign)
    }

    /// Fetches a campaign.
    pub async fn get(&self, id: Uuid) -> Result<Campaign, CampaignError> {
        self.store
            .find_campaign(id)
            .await?
            .ok_or(CampaignError::NotFound)
    }

    /// Lists campaigns.
    pub async fn list(&self, page: &PageRequest) -> Result<PageResponse<Campaign>, CampaignError> {
        let (campaigns, total) = self.store.list_campaigns(page).await?;
        Ok(PageResponse::new(campaigns, page.page, page.per_page, total))
    }
}
