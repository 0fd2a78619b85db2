//! The rate-limited extraction client and its HTTP transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ConfigError, ExtractError};
use crate::limiter::{self, QUOTA_MESSAGE, RateLimiter};
use crate::payload::ExtractionPayload;
use crate::table::ExtractedTable;

use super::wire::{ExtractionRequest, ExtractionResponse};

/// Transport seam for the extraction service, so tests and alternative
/// deployments can substitute the HTTP implementation.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    async fn fetch(&self, request: &ExtractionRequest)
    -> Result<ExtractionResponse, ExtractError>;
}

/// Talks to the deployed extraction endpoint over HTTPS. The timeout lives
/// on the client, so a hung service surfaces as `Upstream` instead of
/// blocking the session forever.
pub struct HttpExtractionService {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpExtractionService {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "http client".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl ExtractionService for HttpExtractionService {
    async fn fetch(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResponse, ExtractError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ExtractError::Upstream {
                    reason: "request timed out".to_string(),
                }
            } else {
                ExtractError::Upstream {
                    reason: format!("request failed: {e}"),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "extraction service returned an error");
            return Err(ExtractError::Upstream {
                reason: format!("service returned {status}: {body}"),
            });
        }

        response
            .json::<ExtractionResponse>()
            .await
            .map_err(|e| ExtractError::Upstream {
                reason: format!("failed to parse service response: {e}"),
            })
    }
}

/// Wraps a transport with the guest quota gate and response normalization.
///
/// Quota accounting brackets the call: `check` before anything goes on the
/// wire, `record` exactly once and only after the service call has produced
/// a usable table. Failed conversions never consume quota.
pub struct ExtractionClient {
    service: Arc<dyn ExtractionService>,
    limiter: Arc<dyn RateLimiter>,
}

impl ExtractionClient {
    pub fn new(service: Arc<dyn ExtractionService>, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { service, limiter }
    }

    /// Run one extraction. Logged-in callers bypass the quota entirely.
    pub async fn extract(
        &self,
        payload: &ExtractionPayload,
        is_logged_in: bool,
        forwarded_for: Option<&str>,
    ) -> Result<ExtractedTable, ExtractError> {
        let caller = limiter::client_id(forwarded_for);

        if !is_logged_in {
            let decision = self.limiter.check(&caller);
            if !decision.allowed {
                tracing::info!(client = %caller, "guest quota exhausted");
                return Err(ExtractError::RateLimited(QUOTA_MESSAGE.to_string()));
            }
            tracing::debug!(client = %caller, remaining = decision.remaining, "quota check passed");
        }

        let request = ExtractionRequest::new(payload, is_logged_in);
        let response = self.service.fetch(&request).await?;
        let table = response.into_table()?;
        if table.is_empty() {
            return Err(ExtractError::EmptyResult);
        }

        if !is_logged_in {
            self.limiter.record(&caller);
        }

        tracing::info!(
            rows = table.row_count(),
            columns = table.headers().len(),
            "extraction succeeded"
        );
        Ok(table)
    }
}
