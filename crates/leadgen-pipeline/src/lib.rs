//! Campaign orchestration: the stage sequencer, its session store, record
//! editing, keyword selection, and CSV export of the generated leads.

pub mod agent;
pub mod error;
pub mod export;
pub mod keywords;
pub mod record;
pub mod sequencer;
pub mod session;

pub use agent::CampaignAgent;
pub use error::{ExportError, RecordError, SessionError, TransitionError};
pub use export::{export_file_name, flatten, to_csv, write_csv, LeadRow, LeadSummary};
pub use keywords::SelectedKeywords;
pub use record::{AnalysisField, AnalysisList, Edit, EditableFields, EditableRecord};
pub use sequencer::{Action, CampaignState, Sequencer, SequencerOptions, Stage, StageFailure};
pub use session::{
    FileSessionStore, MemorySessionStore, SessionKey, SessionStore, SessionStoreExt,
};
