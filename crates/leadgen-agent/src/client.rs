//! HTTP client for the remote campaign agent service.
//!
//! Wraps `reqwest` with one typed method per agent operation. Every call is a
//! single JSON POST; there is no automatic retry, so a failed call surfaces
//! immediately and the caller decides whether to re-trigger it.

use std::time::Duration;

use leadgen_core::{
    AnalysisResult, AppConfig, CampaignInput, KeywordCategory, KeywordProposal, LeadBatch,
    LeadRequest, StrategyRequest, StrategyResult,
};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AgentError;

/// Longest slice of a non-JSON error body kept in [`AgentError::Status`].
const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// The four remote operations of the agent service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Analyze,
    DiscoverKeywords,
    BuildStrategy,
    GenerateLeads,
}

impl Operation {
    /// Endpoint path relative to the base URL.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Operation::Analyze => "analyze",
            Operation::DiscoverKeywords => "keywords",
            Operation::BuildStrategy => "strategy",
            Operation::GenerateLeads => "generate-leads",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Analyze => "analyze",
            Operation::DiscoverKeywords => "discover_keywords",
            Operation::BuildStrategy => "build_strategy",
            Operation::GenerateLeads => "generate_leads",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client for the remote campaign agent.
///
/// Use [`AgentClient::from_config`] in the binary or [`AgentClient::new`] to
/// point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct AgentClient {
    client: Client,
    base_url: Url,
}

impl AgentClient {
    /// Creates a client for the agent service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AgentError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: exactly one trailing slash so `Url::join` appends the
        // endpoint instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| AgentError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(AgentError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`AgentClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, AgentError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Runs the strategic analysis of the operator's company.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Status`] on a non-2xx response.
    /// - [`AgentError::Http`] on network failure.
    /// - [`AgentError::Deserialize`] if the body is not a valid analysis.
    pub async fn analyze(&self, input: &CampaignInput) -> Result<AnalysisResult, AgentError> {
        self.post_json(Operation::Analyze, input).await
    }

    /// Proposes keyword categories for a committed analysis.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Status`] on a non-2xx response.
    /// - [`AgentError::Http`] on network failure.
    /// - [`AgentError::Deserialize`] if the body is not a keyword proposal.
    pub async fn discover_keywords(
        &self,
        analysis: &AnalysisResult,
    ) -> Result<Vec<KeywordCategory>, AgentError> {
        let proposal: KeywordProposal = self.post_json(Operation::DiscoverKeywords, analysis).await?;
        Ok(proposal.grouped_keywords)
    }

    /// Ranks outreach channels for the selected keywords.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Status`] on a non-2xx response.
    /// - [`AgentError::Http`] on network failure.
    /// - [`AgentError::Deserialize`] if the body is not a strategy.
    pub async fn build_strategy(
        &self,
        request: &StrategyRequest,
    ) -> Result<StrategyResult, AgentError> {
        self.post_json(Operation::BuildStrategy, request).await
    }

    /// Generates and enriches company leads from the selected channels.
    ///
    /// The returned batch is normalized: every lead's enrichment status is
    /// derived from its contact detail.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Status`] on a non-2xx response.
    /// - [`AgentError::Http`] on network failure.
    /// - [`AgentError::Deserialize`] if the body is not a lead batch.
    pub async fn generate_leads(&self, request: &LeadRequest) -> Result<LeadBatch, AgentError> {
        let mut batch: LeadBatch = self.post_json(Operation::GenerateLeads, request).await?;
        batch.normalize();
        Ok(batch)
    }

    fn endpoint_url(&self, operation: Operation) -> Url {
        // Joining a fixed relative path onto a validated base cannot fail.
        self.base_url
            .join(operation.path())
            .unwrap_or_else(|_| self.base_url.clone())
    }

    /// Sends a JSON POST, maps non-2xx statuses to [`AgentError::Status`],
    /// and decodes the response body.
    async fn post_json<B, T>(&self, operation: Operation, body: &B) -> Result<T, AgentError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint_url(operation);
        tracing::debug!(%operation, %url, "calling agent");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .inspect_err(|e| tracing::warn!(%operation, error = %e, "agent request failed"))?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let detail = error_detail(&text);
            tracing::warn!(%operation, status = status.as_u16(), %detail, "agent returned error status");
            return Err(AgentError::Status {
                operation,
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(%operation, error = %e, "agent response did not decode");
            AgentError::Deserialize {
                operation,
                source: e,
            }
        })
    }
}

/// Extracts a readable message from an error body.
///
/// Prefers a JSON `detail` field (string or structured), falling back to the
/// start of the raw body.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        match value.get("detail") {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(other) => return other.to_string(),
            None => {}
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_ERROR_DETAIL_CHARS).collect()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
