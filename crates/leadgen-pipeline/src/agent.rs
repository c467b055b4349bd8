use async_trait::async_trait;
use leadgen_agent::{AgentClient, AgentError};
use leadgen_core::{
    AnalysisResult, CampaignInput, KeywordCategory, LeadBatch, LeadRequest, StrategyRequest,
    StrategyResult,
};

/// The remote operations the sequencer drives.
///
/// Implemented for [`AgentClient`]; tests substitute an in-process fake.
#[async_trait]
pub trait CampaignAgent: Send + Sync {
    async fn analyze(&self, input: &CampaignInput) -> Result<AnalysisResult, AgentError>;

    async fn discover_keywords(
        &self,
        analysis: &AnalysisResult,
    ) -> Result<Vec<KeywordCategory>, AgentError>;

    async fn build_strategy(&self, request: &StrategyRequest)
        -> Result<StrategyResult, AgentError>;

    async fn generate_leads(&self, request: &LeadRequest) -> Result<LeadBatch, AgentError>;
}

#[async_trait]
impl CampaignAgent for AgentClient {
    async fn analyze(&self, input: &CampaignInput) -> Result<AnalysisResult, AgentError> {
        AgentClient::analyze(self, input).await
    }

    async fn discover_keywords(
        &self,
        analysis: &AnalysisResult,
    ) -> Result<Vec<KeywordCategory>, AgentError> {
        AgentClient::discover_keywords(self, analysis).await
    }

    async fn build_strategy(
        &self,
        request: &StrategyRequest,
    ) -> Result<StrategyResult, AgentError> {
        AgentClient::build_strategy(self, request).await
    }

    async fn generate_leads(&self, request: &LeadRequest) -> Result<LeadBatch, AgentError> {
        AgentClient::generate_leads(self, request).await
    }
}
