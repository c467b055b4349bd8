//! Campaign data model shared by the agent client and the pipeline.
//!
//! Every type mirrors a JSON structure exchanged with the remote agent
//! service. Response types decode leniently: a missing or `null` string or
//! collection becomes empty, so downstream code never has to branch on
//! whether a field was present.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ConfigError;

/// Decodes `null` the same way as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Stage 0: company profile
// ---------------------------------------------------------------------------

/// Company profile supplied by the operator before analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignInput {
    #[serde(default, deserialize_with = "nullable")]
    pub company_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub website: String,
    #[serde(default, deserialize_with = "nullable")]
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_customers: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub social_urls: Vec<String>,
}

impl CampaignInput {
    /// Appends social profile URLs that are not already present.
    ///
    /// Returns the number of URLs added.
    pub fn append_social_urls<'a, I>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut added = 0;
        for url in urls {
            let url = url.trim();
            if url.is_empty() || self.social_urls.iter().any(|u| u == url) {
                continue;
            }
            self.social_urls.push(url.to_owned());
            added += 1;
        }
        added
    }
}

/// Load a [`CampaignInput`] from a YAML or JSON file.
///
/// JSON is a subset of YAML, so both formats go through `serde_yaml`.
///
/// # Errors
///
/// Returns [`ConfigError::CampaignFileIo`] if the file cannot be read and
/// [`ConfigError::CampaignFileParse`] if it is not a valid campaign document.
pub fn load_campaign_input(path: &Path) -> Result<CampaignInput, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CampaignFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    serde_yaml::from_str(&content).map_err(ConfigError::CampaignFileParse)
}

// ---------------------------------------------------------------------------
// Stage 1: analysis
// ---------------------------------------------------------------------------

/// Strategic analysis of the operator's company returned by `analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "nullable")]
    pub company_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub company_summary: String,
    /// Unique selling proposition.
    #[serde(default, deserialize_with = "nullable")]
    pub usp: String,
    /// Ideal customer profiles.
    #[serde(default, deserialize_with = "nullable")]
    pub icp_profile: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub target_industries: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub target_companies: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub pain_points: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub sources: Vec<String>,
    /// Agent confidence in `[0.0, 1.0]`.
    #[serde(default, deserialize_with = "nullable")]
    pub confidence_score: f64,
    #[serde(default)]
    pub main_address: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone_numbers: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub email_addresses: Vec<String>,
    /// Branch or office locations found on the company website.
    #[serde(default, deserialize_with = "nullable")]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub whatsapp_url: Option<String>,
    #[serde(default)]
    pub tiktok_url: Option<String>,
    #[serde(default)]
    pub pinterest_url: Option<String>,
    #[serde(default)]
    pub snapchat_url: Option<String>,
    #[serde(default)]
    pub threads_url: Option<String>,
    #[serde(default)]
    pub tripadvisor_url: Option<String>,
}

impl AnalysisResult {
    /// Social profile URLs discovered by the analysis, in a fixed platform order.
    #[must_use]
    pub fn social_urls(&self) -> Vec<&str> {
        [
            &self.linkedin_url,
            &self.twitter_url,
            &self.facebook_url,
            &self.instagram_url,
            &self.youtube_url,
            &self.github_url,
            &self.whatsapp_url,
            &self.tiktok_url,
            &self.pinterest_url,
            &self.snapchat_url,
            &self.threads_url,
            &self.tripadvisor_url,
        ]
        .into_iter()
        .filter_map(|url| url.as_deref())
        .filter(|url| !url.trim().is_empty())
        .collect()
    }
}

// ---------------------------------------------------------------------------
// Stage 2: keyword discovery
// ---------------------------------------------------------------------------

/// A named group of keywords proposed by discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCategory {
    #[serde(default, deserialize_with = "nullable")]
    pub category_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub keywords: Vec<String>,
}

/// Response envelope of the `keywords` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordProposal {
    #[serde(default, deserialize_with = "nullable")]
    pub grouped_keywords: Vec<KeywordCategory>,
}

// ---------------------------------------------------------------------------
// Stage 3: channel strategy
// ---------------------------------------------------------------------------

/// Request body of the `strategy` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyRequest {
    pub selected_keywords: Vec<String>,
    pub company_summary: String,
    pub target_industries: Vec<String>,
}

/// An outreach platform with its relevance to the campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    /// Relevance in `0..=100`.
    #[serde(default, deserialize_with = "relevance_score")]
    pub relevance_score: u8,
}

/// Accepts any JSON number (or `null`) and clamps it into `0..=100`.
fn relevance_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or_default();
    if raw.is_nan() {
        return Ok(0);
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = raw.round().clamp(0.0, 100.0) as u8;
    Ok(clamped)
}

/// Channel strategy returned by `strategy`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    #[serde(default, deserialize_with = "nullable")]
    pub channels: Vec<Channel>,
    #[serde(default, deserialize_with = "nullable")]
    pub strategy_summary: String,
}

impl StrategyResult {
    /// Channel names in the order the agent ranked them.
    #[must_use]
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name.clone()).collect()
    }
}

/// Committed form of the strategy stage: the strategy merged with the
/// keyword selection and the analysis fields lead generation needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategySnapshot {
    #[serde(default, deserialize_with = "nullable")]
    pub channels: Vec<Channel>,
    #[serde(default, deserialize_with = "nullable")]
    pub strategy_summary: String,
    #[serde(default, deserialize_with = "nullable")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub company_summary: String,
    #[serde(default, deserialize_with = "nullable")]
    pub target_industries: Vec<String>,
}

impl StrategySnapshot {
    #[must_use]
    pub fn new(strategy: &StrategyResult, keywords: &[String], analysis: &AnalysisResult) -> Self {
        Self {
            channels: strategy.channels.clone(),
            strategy_summary: strategy.strategy_summary.clone(),
            keywords: keywords.to_vec(),
            company_summary: analysis.company_summary.clone(),
            target_industries: analysis.target_industries.clone(),
        }
    }

    /// The strategy part of the snapshot.
    #[must_use]
    pub fn strategy(&self) -> StrategyResult {
        StrategyResult {
            channels: self.channels.clone(),
            strategy_summary: self.strategy_summary.clone(),
        }
    }

    #[must_use]
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Stage 4: lead generation
// ---------------------------------------------------------------------------

/// Request body of the `generate-leads` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadRequest {
    pub selected_channels: Vec<String>,
    pub selected_keywords: Vec<String>,
    pub target_industries: Vec<String>,
    pub company_summary: String,
    pub max_leads_per_channel: u32,
}

impl LeadRequest {
    /// Builds a request from a committed strategy snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &StrategySnapshot, max_leads_per_channel: u32) -> Self {
        Self {
            selected_channels: snapshot.channel_names(),
            selected_keywords: snapshot.keywords.clone(),
            target_industries: snapshot.target_industries.clone(),
            company_summary: snapshot.company_summary.clone(),
            max_leads_per_channel,
        }
    }
}

/// Whether a lead carries any contact detail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStatus {
    #[default]
    Pending,
    Enriched,
}

impl EnrichmentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EnrichmentStatus::Pending => "pending",
            EnrichmentStatus::Enriched => "enriched",
        }
    }
}

impl std::fmt::Display for EnrichmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EnrichmentStatus {
    /// Anything other than `"enriched"` (including `"failed"`) decodes as
    /// `Pending`; [`CompanyLead::refresh_enrichment_status`] settles the
    /// final value from the lead's data.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("enriched") => EnrichmentStatus::Enriched,
            _ => EnrichmentStatus::Pending,
        })
    }
}

/// A phone number and whether it is reachable on `WhatsApp`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    #[serde(default, deserialize_with = "nullable")]
    pub number: String,
    #[serde(default, deserialize_with = "nullable")]
    pub has_whatsapp: bool,
}

/// A branch or office location of a lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A person at a lead company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonContact {
    #[serde(default, deserialize_with = "nullable")]
    pub full_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub designation: String,
    /// e.g. "Decision Maker", "Technical Lead".
    #[serde(default, deserialize_with = "nullable")]
    pub role_category: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub data_source: String,
}

/// A discovered company with whatever contact detail enrichment found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyLead {
    #[serde(default, deserialize_with = "nullable")]
    pub company_name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub company_size: Option<String>,
    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub main_address: Option<String>,
    #[serde(default)]
    pub headquarters: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub branches: Vec<Branch>,

    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub whatsapp_url: Option<String>,
    #[serde(default)]
    pub tiktok_url: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub email_addresses: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone_numbers: Vec<PhoneNumber>,
    #[serde(default, deserialize_with = "nullable")]
    pub key_contacts: Vec<PersonContact>,

    #[serde(default, deserialize_with = "nullable")]
    pub channel_source: String,
    #[serde(default, deserialize_with = "nullable")]
    pub keywords_matched: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub confidence_score: f64,
    #[serde(default)]
    pub enrichment_status: EnrichmentStatus,
    #[serde(default, deserialize_with = "nullable")]
    pub data_sources: Vec<String>,
    /// ISO-8601 timestamp set by the agent.
    #[serde(default)]
    pub discovered_at: Option<String>,
}

impl CompanyLead {
    /// `true` if any email, phone number, or key contact is attached.
    #[must_use]
    pub fn has_contact_detail(&self) -> bool {
        !self.email_addresses.is_empty()
            || !self.phone_numbers.is_empty()
            || !self.key_contacts.is_empty()
    }

    /// Recomputes `enrichment_status` from the attached contact detail.
    pub fn refresh_enrichment_status(&mut self) {
        self.enrichment_status = if self.has_contact_detail() {
            EnrichmentStatus::Enriched
        } else {
            EnrichmentStatus::Pending
        };
    }
}

/// Response of the `generate-leads` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadBatch {
    #[serde(default, deserialize_with = "nullable")]
    pub companies: Vec<CompanyLead>,
    #[serde(default, deserialize_with = "nullable")]
    pub total_leads: usize,
    #[serde(default, deserialize_with = "nullable")]
    pub leads_by_channel: BTreeMap<String, usize>,
    #[serde(default, deserialize_with = "nullable")]
    pub generation_summary: String,
}

impl LeadBatch {
    /// Settles derived fields after decoding: every lead's enrichment status
    /// is recomputed, and a missing `total_leads` falls back to the number
    /// of companies.
    pub fn normalize(&mut self) {
        for lead in &mut self.companies {
            lead.refresh_enrichment_status();
        }
        if self.total_leads == 0 {
            self.total_leads = self.companies.len();
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

#[cfg(test)]
#[path = "campaign_test.rs"]
mod tests;
