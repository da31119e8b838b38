use std::path::PathBuf;
use std::time::Duration;

use crate::related::CURATED_FAMILIES;

pub const DEFAULT_API_BASE: &str = "https://en.wikipedia.org";
pub const DEFAULT_FALLBACK_TOPIC: &str = "Artificial Intelligence";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Scheme and host of the encyclopedia, without a trailing slash.
    pub api_base: String,
    pub user_agent: String,
    /// `None` keeps the client's default, which never times out.
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: default_user_agent(),
            timeout: None,
        }
    }
}

impl FetchConfig {
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub fetch: FetchConfig,
    /// Where the theme flag is persisted; `None` keeps it in memory only.
    pub theme_path: Option<PathBuf>,
    pub menu_topics: Vec<String>,
    /// Known-good topic offered from the error layout.
    pub fallback_topic: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            theme_path: None,
            menu_topics: CURATED_FAMILIES
                .iter()
                .map(|(topic, _)| topic.to_string())
                .collect(),
            fallback_topic: DEFAULT_FALLBACK_TOPIC.to_string(),
        }
    }
}

fn default_user_agent() -> String {
    format!(
        "wikireader-rs/{} ({}; rust)",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}
