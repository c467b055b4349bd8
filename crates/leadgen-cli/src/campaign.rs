//! Campaign command handlers for the CLI.
//!
//! `run` drives every stage headlessly: the review stages that a person
//! would walk through interactively are replaced by the edits and keyword
//! choices given on the command line. Each stage is committed to the file
//! session store, so `leads` can later regenerate from the last strategy.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use leadgen_agent::AgentClient;
use leadgen_core::{load_campaign_input, validate_campaign_input, AppConfig, CampaignInput};
use leadgen_pipeline::{
    Action, AnalysisField, AnalysisList, CampaignState, Edit, FileSessionStore, Sequencer,
    SequencerOptions, SessionKey, SessionStore, SessionStoreExt, Stage,
};

use crate::export::export_batch;

type CliSequencer = Sequencer<FileSessionStore, AgentClient>;

/// Arguments of `leadgen run`.
#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    /// YAML or JSON file with the company profile
    #[arg(long)]
    pub campaign: Option<PathBuf>,
    #[arg(long)]
    pub company_name: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub industry: Option<String>,
    #[arg(long)]
    pub sub_product: Option<String>,
    #[arg(long)]
    pub existing_customers: Option<String>,
    /// Social profile URL (repeatable)
    #[arg(long = "social-url")]
    pub social_urls: Vec<String>,
    /// Overwrite an analysis field, e.g. `usp=Fastest CI`
    #[arg(long = "set", value_parser = parse_set)]
    pub sets: Vec<Edit>,
    /// Append to an analysis list, e.g. `pain_points=Slow builds`
    #[arg(long = "add", value_parser = parse_add)]
    pub adds: Vec<Edit>,
    /// Remove from an analysis list by index, e.g. `icp_profile=0`
    #[arg(long = "remove", value_parser = parse_remove)]
    pub removes: Vec<Edit>,
    /// Select an extra keyword (repeatable)
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,
    /// Deselect a pre-selected keyword (repeatable)
    #[arg(long = "drop-keyword")]
    pub drop_keywords: Vec<String>,
    /// CSV output path (defaults to `leads_<date>.csv` in the export dir)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Validate the input and print the plan without calling the agent
    #[arg(long)]
    pub dry_run: bool,
}

fn split_pair(raw: &str) -> Result<(&str, &str), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

pub(crate) fn parse_set(raw: &str) -> Result<Edit, String> {
    let (name, value) = split_pair(raw)?;
    let field: AnalysisField = name.parse().map_err(|e| format!("{e}"))?;
    Ok(Edit::SetField {
        field,
        value: value.to_string(),
    })
}

pub(crate) fn parse_add(raw: &str) -> Result<Edit, String> {
    let (name, value) = split_pair(raw)?;
    let list: AnalysisList = name.parse().map_err(|e| format!("{e}"))?;
    if value.is_empty() {
        return Err(format!("empty value for '{name}'"));
    }
    Ok(Edit::InsertItem {
        list,
        value: value.to_string(),
    })
}

pub(crate) fn parse_remove(raw: &str) -> Result<Edit, String> {
    let (name, index) = split_pair(raw)?;
    let list: AnalysisList = name.parse().map_err(|e| format!("{e}"))?;
    let index: usize = index
        .parse()
        .map_err(|_| format!("'{index}' is not a list index"))?;
    Ok(Edit::RemoveItem { list, index })
}

/// Build the company profile from `--campaign` and the individual flags.
/// Flags override values loaded from the file.
pub(crate) fn build_input(args: &RunArgs) -> anyhow::Result<CampaignInput> {
    let mut input = match &args.campaign {
        Some(path) => load_campaign_input(path)?,
        None => CampaignInput::default(),
    };

    if let Some(v) = &args.company_name {
        input.company_name.clone_from(v);
    }
    if let Some(v) = &args.website {
        input.website.clone_from(v);
    }
    if let Some(v) = &args.industry {
        input.industry.clone_from(v);
    }
    if args.sub_product.is_some() {
        input.sub_product.clone_from(&args.sub_product);
    }
    if args.existing_customers.is_some() {
        input.existing_customers.clone_from(&args.existing_customers);
    }
    input.append_social_urls(args.social_urls.iter().map(String::as_str));

    Ok(input)
}

/// Removals run before additions, from the highest index down, so every
/// index refers to the list as the agent returned it.
fn ordered_edits(args: &RunArgs) -> Vec<Edit> {
    let mut removes = args.removes.clone();
    removes.sort_by_key(|e| match e {
        Edit::RemoveItem { index, .. } => std::cmp::Reverse(*index),
        _ => std::cmp::Reverse(0),
    });

    args.sets
        .iter()
        .cloned()
        .chain(removes)
        .chain(args.adds.iter().cloned())
        .collect()
}

fn open_sequencer(config: &AppConfig) -> anyhow::Result<CliSequencer> {
    let client = AgentClient::from_config(config).context("failed to build agent client")?;
    let store = FileSessionStore::new(&config.session_dir);
    Ok(Sequencer::new(store, client, SequencerOptions::from(config)))
}

/// Fail the command if the last remote call left a failure in the stage.
fn ensure_progress(seq: &CliSequencer) -> anyhow::Result<()> {
    if let Some(failure) = seq.state().failure() {
        bail!("{failure} (stage {})", seq.stage());
    }
    Ok(())
}

/// Run a whole campaign headlessly and export the leads.
///
/// # Errors
///
/// Returns an error if the profile is invalid, any agent call fails, or the
/// CSV cannot be written. Stages committed before the failure stay in the
/// session.
pub(crate) async fn run_campaign(config: &AppConfig, args: &RunArgs) -> anyhow::Result<()> {
    let input = build_input(args)?;
    validate_campaign_input(&input)?;

    if args.dry_run {
        println!("dry-run: campaign for {} ({})", input.company_name, input.website);
        println!("  agent: {}", config.api_base_url);
        println!("  analysis edits: {}", ordered_edits(args).len());
        println!(
            "  keywords: +{} / -{}",
            args.keywords.len(),
            args.drop_keywords.len()
        );
        println!("  max leads per channel: {}", config.max_leads_per_channel);
        return Ok(());
    }

    let mut seq = open_sequencer(config)?;
    seq.dispatch(Action::StartOver).await?;

    println!("analyzing {} ...", input.company_name);
    seq.dispatch(Action::Submit(input)).await?;
    ensure_progress(&seq)?;

    for edit in ordered_edits(args) {
        seq.dispatch(Action::Edit(edit)).await?;
    }
    if let CampaignState::AnalysisReview { record } = seq.state() {
        println!("{}", record.get().company_summary);
    }

    println!("discovering keywords ...");
    seq.dispatch(Action::Advance).await?;
    ensure_progress(&seq)?;

    for keyword in &args.drop_keywords {
        seq.dispatch(Action::RemoveKeyword(keyword.clone())).await?;
    }
    for keyword in &args.keywords {
        seq.dispatch(Action::AddKeyword(keyword.clone())).await?;
    }
    if let CampaignState::KeywordReview { selected, .. } = seq.state() {
        println!("keywords: {}", selected.as_slice().join(", "));
    }
    if !seq.can_build_strategy() {
        bail!("no keywords selected; pass --keyword to choose at least one");
    }

    println!("building channel strategy ...");
    seq.dispatch(Action::BuildStrategy).await?;
    ensure_progress(&seq)?;

    if let CampaignState::StrategyReview { strategy, .. } = seq.state() {
        for channel in &strategy.channels {
            println!("  {:<20} {:>3}", channel.name, channel.relevance_score);
        }
    }

    println!("generating leads ...");
    seq.dispatch(Action::Advance).await?;
    ensure_progress(&seq)?;

    export_review(config, &seq, args.output.as_deref())
}

/// Regenerate leads from the committed strategy and export them.
///
/// # Errors
///
/// Returns an error if no strategy is committed, the agent call fails, or
/// the CSV cannot be written.
pub(crate) async fn run_leads(config: &AppConfig, output: Option<&Path>) -> anyhow::Result<()> {
    let mut seq = open_sequencer(config)?;
    if seq.enter(Stage::LeadReview).await == Stage::Input {
        bail!("no committed channel strategy; run `leadgen run` first");
    }

    println!("generating leads ...");
    seq.dispatch(Action::GenerateLeads).await?;
    ensure_progress(&seq)?;

    export_review(config, &seq, output)
}

fn export_review(
    config: &AppConfig,
    seq: &CliSequencer,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let CampaignState::LeadReview { batch, .. } = seq.state() else {
        bail!("no leads to export (stage {})", seq.stage());
    };
    if batch.is_empty() {
        tracing::warn!("lead generation returned no companies");
    }
    export_batch(config, batch, output)?;
    Ok(())
}

/// Print which snapshots are committed in the session directory.
pub(crate) fn show_status(config: &AppConfig) {
    let store = FileSessionStore::new(&config.session_dir);
    println!("session: {}", store.dir().display());

    for key in SessionKey::ALL {
        let detail = match key {
            SessionKey::Company => store
                .get_json::<CampaignInput>(key)
                .map(|c| format!("{} ({})", c.company_name, c.website)),
            SessionKey::Analysis => store
                .get_json::<leadgen_core::AnalysisResult>(key)
                .map(|a| format!("{} target industries", a.target_industries.len())),
            SessionKey::Strategy => store
                .get_json::<leadgen_core::StrategySnapshot>(key)
                .map(|s| s.channel_names().join(", ")),
        };
        match detail {
            Some(detail) => println!("  {key:<10} committed  {detail}"),
            None => println!("  {key:<10} -"),
        }
    }
}

/// Clear every committed snapshot.
///
/// # Errors
///
/// Returns an error if a session file cannot be removed.
pub(crate) fn reset(config: &AppConfig) -> anyhow::Result<()> {
    let mut store = FileSessionStore::new(&config.session_dir);
    store.clear_all()?;
    println!("session cleared");
    Ok(())
}
