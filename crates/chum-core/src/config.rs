use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::event::ATTACK_CODE;
use crate::source::{EventQuery, SortOrder};

const PROJECT_CONFIG_FILE: &str = "chum.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChumConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub credits: CreditsConfig,
    #[serde(default)]
    pub outcomes: OutcomesConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_events_url")]
    pub events_url: String,
    #[serde(default = "default_players_url")]
    pub players_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            events_url: default_events_url(),
            players_url: default_players_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsConfig {
    #[serde(default = "default_credits_description")]
    pub description: String,
    #[serde(default = "default_credits_limit")]
    pub limit: u32,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_variable")]
    pub variable: String,
    /// Fixed jitter seed; unset draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            description: default_credits_description(),
            limit: default_credits_limit(),
            sort_order: None,
            output: default_output(),
            variable: default_variable(),
            seed: None,
        }
    }
}

impl CreditsConfig {
    #[must_use]
    pub fn query(&self) -> EventQuery {
        EventQuery {
            description: Some(self.description.clone()),
            event_type: None,
            sort_order: self.sort_order,
            limit: Some(self.limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomesConfig {
    #[serde(default = "default_outcomes_type")]
    pub event_type: i64,
    #[serde(default = "default_outcomes_limit")]
    pub limit: u32,
    #[serde(default = "default_outcomes_order")]
    pub sort_order: SortOrder,
}

impl Default for OutcomesConfig {
    fn default() -> Self {
        Self {
            event_type: default_outcomes_type(),
            limit: default_outcomes_limit(),
            sort_order: default_outcomes_order(),
        }
    }
}

impl OutcomesConfig {
    #[must_use]
    pub const fn query(&self) -> EventQuery {
        EventQuery {
            description: None,
            event_type: Some(self.event_type),
            sort_order: Some(self.sort_order),
            limit: Some(self.limit),
        }
    }
}

/// Parse a config file.
///
/// # Errors
///
/// Fails when the file cannot be read or is not valid TOML for [`ChumConfig`].
pub fn load_config_file(path: &Path) -> Result<ChumConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ChumConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Locate and load configuration.
///
/// Precedence: `explicit` path, then `chum.toml` in `project_root`, then
/// `<config_dir>/chum/config.toml`, then built-in defaults.
///
/// # Errors
///
/// Fails when a located file cannot be read or parsed, or when `explicit`
/// does not exist.
pub fn resolve_config(project_root: &Path, explicit: Option<&Path>) -> Result<ChumConfig> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    let project_path = project_root.join(PROJECT_CONFIG_FILE);
    if project_path.exists() {
        return load_config_file(&project_path);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ChumConfig::default());
    };

    let user_path = config_dir.join("chum/config.toml");
    if !user_path.exists() {
        return Ok(ChumConfig::default());
    }

    load_config_file(&user_path)
}

fn default_events_url() -> String {
    "https://api.sibr.dev/eventually/v2/events".to_string()
}

fn default_players_url() -> String {
    "https://www.blaseball.com/database/players".to_string()
}

fn default_user_agent() -> String {
    concat!("chum/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_credits_description() -> String {
    "consumer".to_string()
}

const fn default_credits_limit() -> u32 {
    2000
}

fn default_output() -> PathBuf {
    PathBuf::from("data.js")
}

fn default_variable() -> String {
    "data".to_string()
}

const fn default_outcomes_type() -> i64 {
    ATTACK_CODE
}

const fn default_outcomes_limit() -> u32 {
    10_000
}

const fn default_outcomes_order() -> SortOrder {
    SortOrder::Desc
}
