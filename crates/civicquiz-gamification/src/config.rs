//! Configuration loading and scoring service factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use civicquiz_core::traits::{ScoringService, UserIdentity};

use crate::client::GamificationClient;

/// Where the gamification endpoint lives.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct GamificationConfig {
    pub base_url: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GamificationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GamificationConfig")
            .field("base_url", &self.base_url)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_endpoint() -> String {
    "/functions/v1/gamification-quiz".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

/// Local quiz defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSettings {
    /// Overrides the bank's per-question time limit.
    #[serde(default)]
    pub time_limit_secs: Option<u32>,
    /// How long the correct answer stays on screen.
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
    /// Bank to play when none is given on the command line.
    #[serde(default)]
    pub question_bank: Option<PathBuf>,
}

fn default_reveal_delay_ms() -> u64 {
    2000
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: None,
            reveal_delay_ms: default_reveal_delay_ms(),
            question_bank: None,
        }
    }
}

/// The player submissions are credited to.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for UserSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSettings")
            .field("id", &self.id)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Top-level civicquiz configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CivicquizConfig {
    #[serde(default)]
    pub gamification: Option<GamificationConfig>,
    #[serde(default)]
    pub quiz: QuizSettings,
    #[serde(default)]
    pub user: Option<UserSettings>,
}

impl CivicquizConfig {
    /// The configured player, if a non-empty user id is set.
    pub fn identity(&self) -> Option<UserIdentity> {
        let user = self.user.as_ref().filter(|u| !u.id.trim().is_empty())?;
        let identity = UserIdentity::new(user.id.clone());
        Some(match user.access_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => identity.with_access_token(token),
            None => identity,
        })
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_secrets(config: &mut CivicquizConfig) {
    if let Some(g) = config.gamification.as_mut() {
        g.base_url = resolve_env_vars(&g.base_url);
        g.api_key = g.api_key.as_deref().map(resolve_env_vars);
    }
    if let Some(u) = config.user.as_mut() {
        u.id = resolve_env_vars(&u.id);
        u.access_token = u.access_token.as_deref().map(resolve_env_vars);
    }
}

/// Apply `CIVICQUIZ_*` overrides, reading variables through `lookup`.
fn apply_env_overrides(config: &mut CivicquizConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("CIVICQUIZ_BASE_URL") {
        match config.gamification.as_mut() {
            Some(g) => g.base_url = url,
            None => {
                config.gamification = Some(GamificationConfig {
                    base_url: url,
                    endpoint: default_endpoint(),
                    api_key: None,
                    timeout_secs: default_timeout_secs(),
                })
            }
        }
    }
    if let Some(key) = lookup("CIVICQUIZ_API_KEY") {
        if let Some(g) = config.gamification.as_mut() {
            g.api_key = Some(key);
        }
    }
    if let Some(id) = lookup("CIVICQUIZ_USER_ID") {
        config.user.get_or_insert_with(UserSettings::default).id = id;
    }
    if let Some(token) = lookup("CIVICQUIZ_ACCESS_TOKEN") {
        config
            .user
            .get_or_insert_with(UserSettings::default)
            .access_token = Some(token);
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order when no path is given:
/// 1. `civicquiz.toml` in the current directory
/// 2. `~/.config/civicquiz/config.toml`
///
/// Environment variable overrides: `CIVICQUIZ_BASE_URL`, `CIVICQUIZ_API_KEY`,
/// `CIVICQUIZ_USER_ID`, `CIVICQUIZ_ACCESS_TOKEN`.
pub fn load_config_from(path: Option<&Path>) -> Result<CivicquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("civicquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<CivicquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => CivicquizConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    resolve_secrets(&mut config);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("civicquiz"))
}

/// Create the scoring service described by the config, if one is configured.
pub fn create_scoring_service(config: &CivicquizConfig) -> Result<Option<Arc<dyn ScoringService>>> {
    match &config.gamification {
        Some(g) if !g.base_url.trim().is_empty() => {
            let client = GamificationClient::new(g)?;
            tracing::debug!(url = client.url(), "gamification enabled");
            Ok(Some(Arc::new(client)))
        }
        _ => Ok(None),
    }
}
