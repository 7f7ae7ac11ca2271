use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::fill::settings::FillSettings;

pub const DEFAULT_CONFIG_PATH: &str = "mock-pilot.yaml";
pub const DEFAULT_TRACE_PATH: &str = "mock-pilot-trace.jsonl";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "mock-pilot",
    version,
    about = "Fill HTML forms with realistic AI-generated test data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: mock-pilot.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the field descriptors extracted from a page
    Fields {
        /// HTML file path or http(s) URL
        #[arg(long)]
        page: String,
    },

    /// Generate values for a page's form and write them back
    Fill {
        /// HTML file path or http(s) URL
        #[arg(long)]
        page: String,

        /// Where to write the filled HTML (default: don't write)
        #[arg(short, long)]
        output: Option<String>,

        /// Trace file (JSON lines); empty string disables it
        #[arg(long)]
        trace: Option<String>,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Store provider, model, key and the enabled flag in the config file
    Configure {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Settings that can be given on the command line. Unset flags fall through
/// to the config file and then to the environment.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsArgs {
    /// Value provider: openai, ollama or mock
    #[arg(long)]
    pub provider: Option<String>,

    /// Model name passed to the provider
    #[arg(long)]
    pub model: Option<String>,

    /// API key (openai)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Provider base URL override
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Turn form filling on or off
    #[arg(long, action = clap::ArgAction::Set)]
    pub enabled: Option<bool>,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `mock-pilot.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: FillSettings,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// JSON-lines trace file; empty disables tracing.
    #[serde(default = "default_trace_path")]
    pub path: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            path: default_trace_path(),
        }
    }
}

// Serde default helpers
fn default_trace_path() -> String {
    DEFAULT_TRACE_PATH.to_string()
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = config_path, error = %e, "ignoring malformed config file");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

pub fn save_config(path: Option<&str>, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(config_path, yaml)?;
    Ok(())
}

// ============================================================================
// Settings resolution (CLI > config > env > defaults)
// ============================================================================

pub fn resolve_settings(config: &AppConfig, args: &SettingsArgs) -> FillSettings {
    resolve_settings_with(config, args, |key| std::env::var(key).ok())
}

/// Same as [`resolve_settings`] with the environment supplied by `env`.
pub fn resolve_settings_with<F>(config: &AppConfig, args: &SettingsArgs, env: F) -> FillSettings
where
    F: Fn(&str) -> Option<String>,
{
    let from_env = |keys: &[&str]| {
        keys.iter()
            .filter_map(|&k| env(k))
            .find(|v| !v.trim().is_empty())
    };
    let pick = |cli: &Option<String>, file: Option<&str>, keys: &[&str]| {
        non_blank(cli)
            .or_else(|| file.map(str::to_string))
            .or_else(|| from_env(keys))
    };

    let file = &config.settings;
    FillSettings {
        enabled: args.enabled.unwrap_or(file.enabled),
        provider: pick(&args.provider, file.provider(), &["MOCK_PILOT_PROVIDER"]),
        model: pick(&args.model, file.model(), &["MOCK_PILOT_MODEL"]),
        api_key: pick(
            &args.api_key,
            file.api_key(),
            &["MOCK_PILOT_API_KEY", "OPENAI_API_KEY"],
        ),
        endpoint: pick(&args.endpoint, file.endpoint(), &[]),
    }
}

/// Write the flags that were given into `config`, leaving the rest alone.
pub fn apply_settings_args(config: &mut AppConfig, args: &SettingsArgs) {
    let settings = &mut config.settings;
    if let Some(enabled) = args.enabled {
        settings.enabled = enabled;
    }
    for (target, value) in [
        (&mut settings.provider, &args.provider),
        (&mut settings.model, &args.model),
        (&mut settings.api_key, &args.api_key),
        (&mut settings.endpoint, &args.endpoint),
    ] {
        if let Some(v) = value {
            *target = Some(v.trim().to_string()).filter(|v| !v.is_empty());
        }
    }
}

/// Default `tracing` filter for a `-v` count.
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
