//! Configuration for ebb
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit `--config` path, or the override in the data dir
//!    (~/.local/share/ebb/config/ebb.toml)
//! 2. Embedded defaults (compiled into binary) when no override exists
//! 3. Environment variables on top: `EBB_SPREADSHEET_ID`,
//!    `GOOGLE_APPLICATION_CREDENTIALS`

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::decay::{
    DecayScheme, SchemeKind, DEFAULT_DECLINE_START, DEFAULT_MIN_WEIGHT, DEFAULT_SCALE,
};
use crate::error::{Error, Result};
use crate::publish::RetryPolicy;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/ebb.toml");

pub const SPREADSHEET_ID_ENV: &str = "EBB_SPREADSHEET_ID";
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Decay weighting parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DecayConfig {
    pub scheme: SchemeKind,
    pub decline_start: usize,
    pub min_weight: f64,
    pub scale: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            scheme: SchemeKind::Linear,
            decline_start: DEFAULT_DECLINE_START,
            min_weight: DEFAULT_MIN_WEIGHT,
            scale: DEFAULT_SCALE,
        }
    }
}

impl DecayConfig {
    pub fn scheme(&self) -> DecayScheme {
        DecayScheme::from_kind(self.scheme, self.decline_start, self.min_weight, self.scale)
    }
}

/// Report content toggles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub normalize_cadence: bool,
    pub include_budget: bool,
    /// Savings accounts whose `#ear:` transfers are reported
    pub earmark_accounts: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            normalize_cadence: false,
            include_budget: false,
            earmark_accounts: Vec::new(),
        }
    }
}

/// Spreadsheet destination
#[derive(Debug, Clone, PartialEq)]
pub struct SheetsConfig {
    pub spreadsheet_id: Option<String>,
    pub stats_range: String,
    pub balances_range: Option<String>,
    pub earmarks_range: Option<String>,
    pub credentials: Option<PathBuf>,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            stats_range: "Category Stats".to_string(),
            balances_range: None,
            earmarks_range: None,
            credentials: None,
            api_base: "https://sheets.googleapis.com/v4".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub decay: DecayConfig,
    pub report: ReportConfig,
    pub sheets: SheetsConfig,
    pub publish: RetryPolicy,
    /// File the config was read from, `None` for embedded defaults
    pub source: Option<PathBuf>,
}

impl Config {
    /// Load config (override first, then default) and apply the environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = load_config(explicit)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup(SPREADSHEET_ID_ENV).filter(|v| !v.is_empty()) {
            self.sheets.spreadsheet_id = Some(id);
        }
        if let Some(path) = lookup(CREDENTIALS_ENV).filter(|v| !v.is_empty()) {
            self.sheets.credentials = Some(PathBuf::from(path));
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ebb").join("config").join("ebb.toml"))
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let mut config = parse_config(&content)?;
        config.source = Some(path.to_path_buf());
        return Ok(config);
    }

    if let Some(path) = default_config_path().filter(|p| p.exists()) {
        debug!("Loading config override from {}", path.display());
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
        let mut config = parse_config(&content)?;
        config.source = Some(path);
        return Ok(config);
    }

    parse_config(DEFAULT_CONFIG)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    decay: Option<RawDecay>,
    report: Option<RawReport>,
    sheets: Option<RawSheets>,
    publish: Option<RawPublish>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDecay {
    scheme: Option<String>,
    decline_start: Option<usize>,
    min_weight: Option<f64>,
    scale: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReport {
    normalize_cadence: Option<bool>,
    include_budget: Option<bool>,
    earmark_accounts: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSheets {
    spreadsheet_id: Option<String>,
    stats_range: Option<String>,
    balances_range: Option<String>,
    earmarks_range: Option<String>,
    credentials: Option<PathBuf>,
    api_base: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPublish {
    max_retries: Option<u32>,
    initial_backoff_ms: Option<u64>,
    max_backoff_ms: Option<u64>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(decay) = raw.decay {
        if let Some(scheme) = decay.scheme {
            config.decay.scheme = scheme.parse().map_err(Error::Config)?;
        }
        if let Some(start) = decay.decline_start {
            config.decay.decline_start = start;
        }
        if let Some(min_weight) = decay.min_weight {
            config.decay.min_weight = min_weight;
        }
        if let Some(scale) = decay.scale {
            config.decay.scale = scale;
        }
    }

    if let Some(report) = raw.report {
        if let Some(normalize) = report.normalize_cadence {
            config.report.normalize_cadence = normalize;
        }
        if let Some(budget) = report.include_budget {
            config.report.include_budget = budget;
        }
        if let Some(accounts) = report.earmark_accounts {
            config.report.earmark_accounts = accounts
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
        }
    }

    if let Some(sheets) = raw.sheets {
        config.sheets.spreadsheet_id = sheets.spreadsheet_id.filter(|s| !s.is_empty());
        if let Some(range) = sheets.stats_range {
            config.sheets.stats_range = range;
        }
        config.sheets.balances_range = sheets.balances_range.filter(|s| !s.is_empty());
        config.sheets.earmarks_range = sheets.earmarks_range.filter(|s| !s.is_empty());
        config.sheets.credentials = sheets.credentials;
        if let Some(base) = sheets.api_base {
            config.sheets.api_base = base;
        }
        if let Some(timeout) = sheets.timeout_secs {
            config.sheets.timeout = Duration::from_secs(timeout);
        }
    }

    if let Some(publish) = raw.publish {
        if let Some(retries) = publish.max_retries {
            config.publish.max_retries = retries;
        }
        if let Some(ms) = publish.initial_backoff_ms {
            config.publish.initial_backoff = Duration::from_millis(ms);
        }
        if let Some(ms) = publish.max_backoff_ms {
            config.publish.max_backoff = Duration::from_millis(ms);
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let decay = &config.decay;
    if !(0.0..=1.0).contains(&decay.min_weight) {
        return Err(Error::Config(format!(
            "decay.min_weight must be between 0 and 1, got {}",
            decay.min_weight
        )));
    }
    if !(decay.scale.is_finite() && decay.scale > 0.0) {
        return Err(Error::Config(format!(
            "decay.scale must be positive, got {}",
            decay.scale
        )));
    }
    if config.sheets.stats_range.trim().is_empty() {
        return Err(Error::Config("sheets.stats_range must not be empty".into()));
    }
    Ok(())
}
