use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalConfig {
    #[serde(default = "default_buy_threshold")]
    pub buy_threshold: f64,
    #[serde(default = "default_sell_threshold")]
    pub sell_threshold: f64,
    #[serde(default = "default_score_decimals")]
    pub score_decimals: u32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            buy_threshold: default_buy_threshold(),
            sell_threshold: default_sell_threshold(),
            score_decimals: default_score_decimals(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaConfig {
    #[serde(default = "default_allow_unknown_fields")]
    pub allow_unknown_fields: bool,
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldRule>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            allow_unknown_fields: default_allow_unknown_fields(),
            fields: default_fields(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Regex a string value must match.
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl FieldRule {
    pub fn required(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
            pattern: None,
            min: None,
            max: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    Any,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub csv_logging: bool,
    #[serde(default = "default_csv_log_path")]
    pub csv_log_path: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            csv_logging: false,
            csv_log_path: default_csv_log_path(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_buy_threshold() -> f64 { 0.3 }
fn default_sell_threshold() -> f64 { -0.3 }
fn default_score_decimals() -> u32 { 4 }
fn default_allow_unknown_fields() -> bool { true }
fn default_csv_log_path() -> String { "signals.csv".to_string() }

fn default_fields() -> Vec<FieldRule> {
    vec![
        FieldRule::required("symbol", FieldKind::String),
        FieldRule::required("sentiment_score", FieldKind::Number),
    ]
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub config_path: String,
    pub log_level: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.signal.check()?;
        Ok(config)
    }
}

/// Beyond this an f64 carries no further decimal digits.
pub const MAX_SCORE_DECIMALS: u32 = 15;

impl SignalConfig {
    fn check(&self) -> Result<()> {
        if self.score_decimals > MAX_SCORE_DECIMALS {
            bail!(
                "score_decimals ({}) must be at most {}",
                self.score_decimals,
                MAX_SCORE_DECIMALS
            );
        }
        if !self.buy_threshold.is_finite() || !self.sell_threshold.is_finite() {
            bail!("signal thresholds must be finite");
        }
        if self.sell_threshold >= self.buy_threshold {
            bail!(
                "sell_threshold ({}) must be below buy_threshold ({})",
                self.sell_threshold,
                self.buy_threshold
            );
        }
        Ok(())
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            config_path: std::env::var("SIGNAL_CONFIG_PATH")
                .unwrap_or_else(|_| "config.toml".to_string()),
            log_level: std::env::var("LOG_LEVEL").ok(),
        })
    }
}
