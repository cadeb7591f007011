//! Stripe HTTP client.
//!
//! Holds are PaymentIntents with `capture_method=manual`, so funds are
//! authorized but not captured until the campaign closes.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use regrouter_shared::PaymentConfig;
use regrouter_shared::types::Currency;

use crate::payment::error::PaymentError;
use crate::payment::provider::{HoldMetadata, PaymentHold, PaymentProvider, RefundOutcome};

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    base_url: String,
    secret_key: String,
    currency: Currency,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[hidden]")
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    /// Creates a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Provider` if the HTTP client cannot be built.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("regrouter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PaymentError::Provider(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
            currency: config.currency,
        })
    }

    async fn post_form<T>(&self, path: &str, form: &[(&str, String)]) -> Result<T, PaymentError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            tracing::warn!(%url, %status, %message, "stripe request failed");
            return Err(PaymentError::Provider(message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PaymentError::Malformed(e.to_string()))
    }
}

fn map_transport_error(err: reqwest::Error) -> PaymentError {
    if err.is_timeout() {
        PaymentError::Timeout
    } else {
        PaymentError::Provider(err.to_string())
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_hold(
        &self,
        amount_cents: i64,
        metadata: HoldMetadata,
    ) -> Result<PaymentHold, PaymentError> {
        let form = [
            ("amount", amount_cents.to_string()),
            ("currency", self.currency.as_provider_code().to_string()),
            ("capture_method", "manual".to_string()),
            ("metadata[investor_id]", metadata.investor_id.to_string()),
            ("metadata[campaign_id]", metadata.campaign_id.to_string()),
            (
                "metadata[transaction_type]",
                metadata.transaction_kind.as_str().to_string(),
            ),
        ];
        let hold: PaymentHold = self.post_form("/v1/payment_intents", &form).await?;
        tracing::debug!(reference = %hold.reference, amount_cents, "payment hold created");
        Ok(hold)
    }

    async fn refund(&self, reference: &str) -> Result<RefundOutcome, PaymentError> {
        let form = [("payment_intent", reference.to_string())];
        let outcome: RefundOutcome = self.post_form("/v1/refunds", &form).await?;
        tracing::debug!(reference, refund = %outcome.reference, status = %outcome.status, "refund issued");
        Ok(outcome)
    }
}
