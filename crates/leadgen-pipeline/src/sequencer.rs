//! The campaign stage machine.
//!
//! A campaign moves forward through nine stages. Review stages hold data the
//! operator inspects or edits; processing stages are only observable when
//! their remote call failed. Each forward step commits the reviewed data to
//! the session store before the next remote call, so a failure later on never
//! loses what was already accepted.

use std::fmt;
use std::sync::Arc;

use leadgen_agent::{AgentError, Operation};
use leadgen_core::{
    validate_campaign_input, AnalysisResult, AppConfig, CampaignInput, KeywordCategory, LeadBatch,
    LeadRequest, StrategyRequest, StrategyResult, StrategySnapshot,
};

use crate::agent::CampaignAgent;
use crate::error::TransitionError;
use crate::keywords::SelectedKeywords;
use crate::record::{Edit, EditableRecord};
use crate::session::{SessionKey, SessionStore, SessionStoreExt};

/// Position of a campaign in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Analyzing,
    AnalysisReview,
    Discovering,
    KeywordReview,
    StrategyBuilding,
    StrategyReview,
    LeadGenerating,
    LeadReview,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Analyzing => "analyzing",
            Stage::AnalysisReview => "analysis_review",
            Stage::Discovering => "discovering",
            Stage::KeywordReview => "keyword_review",
            Stage::StrategyBuilding => "strategy_building",
            Stage::StrategyReview => "strategy_review",
            Stage::LeadGenerating => "lead_generating",
            Stage::LeadReview => "lead_review",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed remote call, kept in the stage it happened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub operation: Operation,
    pub message: String,
}

impl StageFailure {
    fn new(operation: Operation, error: &AgentError) -> Self {
        Self {
            operation,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.message)
    }
}

/// Campaign state. Each variant carries the data its stage works on.
#[derive(Debug, Clone)]
pub enum CampaignState {
    Input,
    Analyzing {
        input: CampaignInput,
        failure: Option<StageFailure>,
    },
    AnalysisReview {
        record: EditableRecord<AnalysisResult>,
    },
    Discovering {
        analysis: Arc<AnalysisResult>,
        failure: Option<StageFailure>,
    },
    KeywordReview {
        analysis: Arc<AnalysisResult>,
        categories: Vec<KeywordCategory>,
        selected: SelectedKeywords,
    },
    StrategyBuilding {
        analysis: Arc<AnalysisResult>,
        categories: Vec<KeywordCategory>,
        selected: SelectedKeywords,
        failure: Option<StageFailure>,
    },
    StrategyReview {
        analysis: Arc<AnalysisResult>,
        categories: Vec<KeywordCategory>,
        selected: SelectedKeywords,
        strategy: StrategyResult,
    },
    LeadGenerating {
        snapshot: StrategySnapshot,
        failure: Option<StageFailure>,
    },
    LeadReview {
        snapshot: StrategySnapshot,
        batch: LeadBatch,
    },
}

impl CampaignState {
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            CampaignState::Input => Stage::Input,
            CampaignState::Analyzing { .. } => Stage::Analyzing,
            CampaignState::AnalysisReview { .. } => Stage::AnalysisReview,
            CampaignState::Discovering { .. } => Stage::Discovering,
            CampaignState::KeywordReview { .. } => Stage::KeywordReview,
            CampaignState::StrategyBuilding { .. } => Stage::StrategyBuilding,
            CampaignState::StrategyReview { .. } => Stage::StrategyReview,
            CampaignState::LeadGenerating { .. } => Stage::LeadGenerating,
            CampaignState::LeadReview { .. } => Stage::LeadReview,
        }
    }

    /// The recorded remote failure, if the current stage has one.
    #[must_use]
    pub fn failure(&self) -> Option<&StageFailure> {
        match self {
            CampaignState::Analyzing { failure, .. }
            | CampaignState::Discovering { failure, .. }
            | CampaignState::StrategyBuilding { failure, .. }
            | CampaignState::LeadGenerating { failure, .. } => failure.as_ref(),
            _ => None,
        }
    }
}

/// Operator actions accepted by [`Sequencer::dispatch`].
#[derive(Debug, Clone)]
pub enum Action {
    Submit(CampaignInput),
    Retry,
    Edit(Edit),
    Advance,
    ToggleKeyword(String),
    AddKeyword(String),
    RemoveKeyword(String),
    BuildStrategy,
    BackToKeywords,
    GenerateLeads,
    StartOver,
}

impl Action {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::Submit(_) => "submit",
            Action::Retry => "retry",
            Action::Edit(_) => "edit",
            Action::Advance => "advance",
            Action::ToggleKeyword(_) => "toggle_keyword",
            Action::AddKeyword(_) => "add_keyword",
            Action::RemoveKeyword(_) => "remove_keyword",
            Action::BuildStrategy => "build_strategy",
            Action::BackToKeywords => "back_to_keywords",
            Action::GenerateLeads => "generate_leads",
            Action::StartOver => "start_over",
        }
    }
}

/// Tunables the sequencer applies to remote requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerOptions {
    pub max_leads_per_channel: u32,
    pub keyword_preselect_count: usize,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            max_leads_per_channel: 10,
            keyword_preselect_count: 3,
        }
    }
}

impl From<&AppConfig> for SequencerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_leads_per_channel: config.max_leads_per_channel,
            keyword_preselect_count: config.keyword_preselect_count,
        }
    }
}

/// Drives one campaign through its stages.
///
/// Holds `&mut self` across every remote call, so at most one call is in
/// flight per sequencer.
pub struct Sequencer<S, A> {
    store: S,
    agent: A,
    options: SequencerOptions,
    state: CampaignState,
}

impl<S: SessionStore, A: CampaignAgent> Sequencer<S, A> {
    pub fn new(store: S, agent: A, options: SequencerOptions) -> Self {
        Self {
            store,
            agent,
            options,
            state: CampaignState::Input,
        }
    }

    #[must_use]
    pub fn state(&self) -> &CampaignState {
        &self.state
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// `true` when `BuildStrategy` would be accepted.
    #[must_use]
    pub fn can_build_strategy(&self) -> bool {
        matches!(&self.state, CampaignState::KeywordReview { selected, .. } if !selected.is_empty())
    }

    /// `true` when lead generation would be accepted.
    #[must_use]
    pub fn can_generate_leads(&self) -> bool {
        match &self.state {
            CampaignState::StrategyReview { strategy, .. } => !strategy.channels.is_empty(),
            CampaignState::LeadGenerating { snapshot, .. }
            | CampaignState::LeadReview { snapshot, .. } => !snapshot.channels.is_empty(),
            _ => false,
        }
    }

    /// Re-enters `stage` from the committed session snapshots.
    ///
    /// Every snapshot the stage depends on must be present; otherwise the
    /// campaign is sent back to [`Stage::Input`]. Returns the stage actually
    /// entered.
    pub async fn enter(&mut self, stage: Stage) -> Stage {
        let from = self.stage();

        match stage {
            Stage::Input => self.state = CampaignState::Input,
            Stage::Analyzing | Stage::AnalysisReview => {
                match self.store.get_json::<CampaignInput>(SessionKey::Company) {
                    Some(input) => self.run_analyze(input).await,
                    None => self.redirect_to_input(stage, SessionKey::Company),
                }
            }
            Stage::Discovering | Stage::KeywordReview => {
                match self.committed_analysis() {
                    Ok(analysis) => self.run_discover(Arc::new(analysis)).await,
                    Err(missing) => self.redirect_to_input(stage, missing),
                }
            }
            Stage::StrategyBuilding | Stage::StrategyReview => match self.committed_strategy() {
                Ok((analysis, snapshot)) => {
                    self.state = CampaignState::StrategyReview {
                        analysis: Arc::new(analysis),
                        categories: Vec::new(),
                        selected: snapshot.keywords.iter().collect(),
                        strategy: snapshot.strategy(),
                    };
                }
                Err(missing) => self.redirect_to_input(stage, missing),
            },
            Stage::LeadGenerating | Stage::LeadReview => match self.committed_strategy() {
                Ok((_, snapshot)) => {
                    self.state = CampaignState::LeadGenerating {
                        snapshot,
                        failure: None,
                    };
                }
                Err(missing) => self.redirect_to_input(stage, missing),
            },
        }

        self.log_transition(from);
        self.stage()
    }

    /// Applies one operator action.
    ///
    /// Remote failures do not make this return `Err`: they are recorded in
    /// the current stage (see [`CampaignState::failure`]).
    ///
    /// # Errors
    ///
    /// - [`TransitionError::Validation`] if a submitted profile is incomplete.
    /// - [`TransitionError::EmptySelection`] if no keywords or channels are
    ///   selected.
    /// - [`TransitionError::InvalidAction`] if the action does not apply to
    ///   the current stage.
    /// - [`TransitionError::Record`] for an out-of-range edit.
    /// - [`TransitionError::Session`] if committing to the store fails.
    ///
    /// The in-memory state is unchanged whenever an error is returned. Store
    /// writes that completed before the error are kept.
    pub async fn dispatch(&mut self, action: Action) -> Result<(), TransitionError> {
        let from = self.stage();
        let name = action.name();

        match action {
            Action::StartOver => {
                self.store.clear_all()?;
                self.state = CampaignState::Input;
            }
            Action::Submit(input) => self.submit(input, name).await?,
            Action::Retry => self.retry(name).await?,
            Action::Edit(edit) => match &mut self.state {
                CampaignState::AnalysisReview { record } => record.apply(edit)?,
                _ => return Err(self.invalid(name)),
            },
            Action::Advance => self.advance(name).await?,
            Action::ToggleKeyword(keyword) => {
                self.selection_mut(name)?.toggle(&keyword);
            }
            Action::AddKeyword(keyword) => {
                self.selection_mut(name)?.add(&keyword);
            }
            Action::RemoveKeyword(keyword) => {
                self.selection_mut(name)?.remove(&keyword);
            }
            Action::BuildStrategy => self.build_strategy(name).await?,
            Action::BackToKeywords => self.back_to_keywords(name)?,
            Action::GenerateLeads => self.generate_leads(name).await?,
        }

        self.log_transition(from);
        Ok(())
    }

    async fn submit(&mut self, input: CampaignInput, name: &'static str) -> Result<(), TransitionError> {
        if !matches!(self.state, CampaignState::Input) {
            return Err(self.invalid(name));
        }
        validate_campaign_input(&input)?;
        self.store.put_json(SessionKey::Company, &input)?;
        self.run_analyze(input).await;
        Ok(())
    }

    async fn retry(&mut self, name: &'static str) -> Result<(), TransitionError> {
        match &self.state {
            CampaignState::Analyzing { input, .. } => {
                let input = input.clone();
                self.run_analyze(input).await;
            }
            CampaignState::Discovering { analysis, .. } => {
                let analysis = Arc::clone(analysis);
                self.run_discover(analysis).await;
            }
            CampaignState::StrategyBuilding {
                analysis,
                categories,
                selected,
                ..
            } => {
                let (analysis, categories, selected) =
                    (Arc::clone(analysis), categories.clone(), selected.clone());
                self.run_build_strategy(analysis, categories, selected).await;
            }
            CampaignState::LeadGenerating { snapshot, .. } => {
                let snapshot = snapshot.clone();
                self.run_generate(snapshot).await;
            }
            _ => return Err(self.invalid(name)),
        }
        Ok(())
    }

    async fn advance(&mut self, name: &'static str) -> Result<(), TransitionError> {
        match &self.state {
            CampaignState::AnalysisReview { record } => {
                let analysis = record.snapshot();
                self.store.put_json(SessionKey::Analysis, &*analysis)?;
                self.append_discovered_social_urls(&analysis)?;
                self.run_discover(analysis).await;
            }
            CampaignState::StrategyReview {
                analysis,
                selected,
                strategy,
                ..
            } => {
                if strategy.channels.is_empty() {
                    return Err(TransitionError::EmptySelection("channel"));
                }
                let snapshot = StrategySnapshot::new(strategy, selected.as_slice(), analysis);
                self.store.put_json(SessionKey::Strategy, &snapshot)?;
                self.run_generate(snapshot).await;
            }
            _ => return Err(self.invalid(name)),
        }
        Ok(())
    }

    async fn build_strategy(&mut self, name: &'static str) -> Result<(), TransitionError> {
        let CampaignState::KeywordReview {
            analysis,
            categories,
            selected,
        } = &self.state
        else {
            return Err(self.invalid(name));
        };
        if selected.is_empty() {
            return Err(TransitionError::EmptySelection("keyword"));
        }

        let (analysis, categories, selected) =
            (Arc::clone(analysis), categories.clone(), selected.clone());
        self.run_build_strategy(analysis, categories, selected).await;
        Ok(())
    }

    fn back_to_keywords(&mut self, name: &'static str) -> Result<(), TransitionError> {
        match &self.state {
            CampaignState::StrategyReview {
                analysis,
                categories,
                selected,
                ..
            }
            | CampaignState::StrategyBuilding {
                analysis,
                categories,
                selected,
                ..
            } => {
                let state = CampaignState::KeywordReview {
                    analysis: Arc::clone(analysis),
                    categories: categories.clone(),
                    selected: selected.clone(),
                };
                self.store.clear(SessionKey::Strategy)?;
                self.state = state;
                Ok(())
            }
            _ => Err(self.invalid(name)),
        }
    }

    async fn generate_leads(&mut self, name: &'static str) -> Result<(), TransitionError> {
        let snapshot = match &self.state {
            CampaignState::LeadGenerating { snapshot, .. }
            | CampaignState::LeadReview { snapshot, .. } => snapshot.clone(),
            _ => return Err(self.invalid(name)),
        };
        if snapshot.channels.is_empty() {
            return Err(TransitionError::EmptySelection("channel"));
        }
        self.run_generate(snapshot).await;
        Ok(())
    }

    // -- remote calls: each one settles the next state, success or failure --

    async fn run_analyze(&mut self, input: CampaignInput) {
        self.state = match self.agent.analyze(&input).await {
            Ok(analysis) => CampaignState::AnalysisReview {
                record: EditableRecord::new(analysis),
            },
            Err(e) => CampaignState::Analyzing {
                failure: Some(StageFailure::new(Operation::Analyze, &e)),
                input,
            },
        };
    }

    async fn run_discover(&mut self, analysis: Arc<AnalysisResult>) {
        self.state = match self.agent.discover_keywords(&analysis).await {
            Ok(categories) => {
                let selected = SelectedKeywords::preselect(
                    &categories,
                    self.options.keyword_preselect_count,
                );
                CampaignState::KeywordReview {
                    analysis,
                    categories,
                    selected,
                }
            }
            Err(e) => CampaignState::Discovering {
                analysis,
                failure: Some(StageFailure::new(Operation::DiscoverKeywords, &e)),
            },
        };
    }

    async fn run_build_strategy(
        &mut self,
        analysis: Arc<AnalysisResult>,
        categories: Vec<KeywordCategory>,
        selected: SelectedKeywords,
    ) {
        let request = StrategyRequest {
            selected_keywords: selected.as_slice().to_vec(),
            company_summary: analysis.company_summary.clone(),
            target_industries: analysis.target_industries.clone(),
        };

        self.state = match self.agent.build_strategy(&request).await {
            Ok(strategy) => CampaignState::StrategyReview {
                analysis,
                categories,
                selected,
                strategy,
            },
            Err(e) => CampaignState::StrategyBuilding {
                analysis,
                categories,
                selected,
                failure: Some(StageFailure::new(Operation::BuildStrategy, &e)),
            },
        };
    }

    async fn run_generate(&mut self, snapshot: StrategySnapshot) {
        let request = LeadRequest::from_snapshot(&snapshot, self.options.max_leads_per_channel);

        self.state = match self.agent.generate_leads(&request).await {
            Ok(batch) => {
                tracing::info!(
                    companies = batch.companies.len(),
                    total_leads = batch.total_leads,
                    "leads generated"
                );
                CampaignState::LeadReview { snapshot, batch }
            }
            Err(e) => CampaignState::LeadGenerating {
                snapshot,
                failure: Some(StageFailure::new(Operation::GenerateLeads, &e)),
            },
        };
    }

    // -- helpers --

    fn append_discovered_social_urls(
        &mut self,
        analysis: &AnalysisResult,
    ) -> Result<(), TransitionError> {
        let Some(mut company) = self.store.get_json::<CampaignInput>(SessionKey::Company) else {
            return Ok(());
        };
        let added = company.append_social_urls(analysis.social_urls());
        if added > 0 {
            tracing::debug!(added, "appended discovered social URLs to company profile");
            self.store.put_json(SessionKey::Company, &company)?;
        }
        Ok(())
    }

    fn committed_analysis(&self) -> Result<AnalysisResult, SessionKey> {
        if self.store.get_json::<CampaignInput>(SessionKey::Company).is_none() {
            return Err(SessionKey::Company);
        }
        self.store
            .get_json::<AnalysisResult>(SessionKey::Analysis)
            .ok_or(SessionKey::Analysis)
    }

    fn committed_strategy(&self) -> Result<(AnalysisResult, StrategySnapshot), SessionKey> {
        let analysis = self.committed_analysis()?;
        let snapshot = self
            .store
            .get_json::<StrategySnapshot>(SessionKey::Strategy)
            .ok_or(SessionKey::Strategy)?;
        Ok((analysis, snapshot))
    }

    fn selection_mut(&mut self, name: &'static str) -> Result<&mut SelectedKeywords, TransitionError> {
        let stage = self.stage().as_str();
        match &mut self.state {
            CampaignState::KeywordReview { selected, .. } => Ok(selected),
            _ => Err(TransitionError::InvalidAction {
                action: name,
                stage,
            }),
        }
    }

    fn redirect_to_input(&mut self, requested: Stage, missing: SessionKey) {
        tracing::warn!(
            stage = %requested,
            key = %missing,
            "missing committed snapshot, returning to input"
        );
        self.state = CampaignState::Input;
    }

    fn invalid(&self, action: &'static str) -> TransitionError {
        TransitionError::InvalidAction {
            action,
            stage: self.stage().as_str(),
        }
    }

    fn log_transition(&self, from: Stage) {
        let to = self.stage();
        if from != to {
            tracing::info!(from = %from, to = %to, "stage transition");
        }
        if let Some(failure) = self.state.failure() {
            tracing::warn!(
                stage = %to,
                operation = %failure.operation,
                error = %failure.message,
                "stage failed, retry available"
            );
        }
    }
}

#[cfg(test)]
#[path = "sequencer_test.rs"]
mod tests;
