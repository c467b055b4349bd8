use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the remote agent service, without a trailing slash.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Directory backing the file session store.
    pub session_dir: PathBuf,
    /// Default directory for CSV exports.
    pub export_dir: PathBuf,
    pub max_leads_per_channel: u32,
    /// How many keywords of the first discovered category start selected.
    pub keyword_preselect_count: usize,
}
