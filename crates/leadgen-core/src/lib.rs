//! Shared domain types and configuration for the lead generation campaign
//! orchestrator.

pub mod app_config;
pub mod campaign;
pub mod config;
pub mod validation;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use campaign::{
    load_campaign_input, AnalysisResult, Branch, CampaignInput, Channel, CompanyLead,
    EnrichmentStatus, KeywordCategory, KeywordProposal, LeadBatch, LeadRequest, PersonContact,
    PhoneNumber, StrategyRequest, StrategyResult, StrategySnapshot,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use validation::{validate_campaign_input, FieldError, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read campaign file {path}: {source}")]
    CampaignFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse campaign file: {0}")]
    CampaignFileParse(#[source] serde_yaml::Error),
}
