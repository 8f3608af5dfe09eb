//! Startup configuration.
//!
//! Values come from command-line flags, falling back to `ESGUARD_*`
//! environment variables (a `.env` file is loaded first by `main`), then
//! to the defaults below. Configuration is read once; nothing here is
//! reloaded while the process runs.

use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use esguard_core::catalog::{SkipSet, UndatedPolicy};
use esguard_core::duration::{parse_duration, DurationError};
use esguard_core::space::{SpaceError, SpaceMode};

use crate::controller::ControllerSettings;

pub const DEFAULT_SERVER: &str = "http://localhost:9200";
pub const DEFAULT_SPACE_PERCENT: u64 = 15;
pub const DEFAULT_DURATION: &str = "1h";
pub const DEFAULT_COOLDOWN: &str = "1m";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";

/// Fatal startup errors. The process exits when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported url scheme '{scheme}' in {url} (expected http or https)")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("Error parsing --{flag}: {source}")]
    Duration {
        flag: &'static str,
        #[source]
        source: DurationError,
    },

    #[error("--space must be a percentage between 0 and 100 (got {0})")]
    Threshold(u64),

    #[error("Error parsing --space-mode: {0}")]
    SpaceMode(#[from] SpaceError),
}

/// Deletes the oldest dated index whenever cluster free space drops to or
/// below the configured percentage.
#[derive(Debug, Parser)]
#[command(name = "esguard-agent", version)]
pub struct Args {
    /// Cluster address.
    #[arg(long, env = "ESGUARD_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Minimum acceptable free disk space, in percent.
    #[arg(long, env = "ESGUARD_SPACE", default_value_t = DEFAULT_SPACE_PERCENT)]
    pub space: u64,

    /// How often to check, e.g. 1h, 30m, 1h30m, 1.5h.
    #[arg(long, env = "ESGUARD_DURATION", default_value = DEFAULT_DURATION)]
    pub duration: String,

    /// Never delete this index. Repeatable; the env var is comma separated.
    #[arg(long = "skip", env = "ESGUARD_SKIP", value_delimiter = ',')]
    pub skip: Vec<String>,

    /// How node percentages combine: min, aggregate or last.
    #[arg(long, env = "ESGUARD_SPACE_MODE", default_value = "min")]
    pub space_mode: String,

    /// Allow deleting indices without a date suffix when no dated index is left.
    #[arg(long, env = "ESGUARD_ALLOW_UNDATED")]
    pub allow_undated: bool,

    /// Pause after a failed check or deletion.
    #[arg(long, env = "ESGUARD_COOLDOWN", default_value = DEFAULT_COOLDOWN)]
    pub cooldown: String,

    /// Upper bound for a single cluster request.
    #[arg(long, env = "ESGUARD_REQUEST_TIMEOUT", default_value = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: String,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub server: Url,
    pub threshold_percent: u64,
    pub interval: Duration,
    pub skip: SkipSet,
    pub space_mode: SpaceMode,
    pub undated: UndatedPolicy,
    pub cooldown: Duration,
    pub request_timeout: Duration,
}

impl GuardConfig {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let server = parse_server(&args.server)?;

        if args.space > 100 {
            return Err(ConfigError::Threshold(args.space));
        }

        let duration = |flag: &'static str, value: &str| {
            parse_duration(value).map_err(|source| ConfigError::Duration { flag, source })
        };

        let skip: SkipSet = args
            .skip
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            server,
            threshold_percent: args.space,
            interval: duration("duration", &args.duration)?,
            skip,
            space_mode: args.space_mode.parse()?,
            undated: if args.allow_undated {
                UndatedPolicy::Allow
            } else {
                UndatedPolicy::Protect
            },
            cooldown: duration("cooldown", &args.cooldown)?,
            request_timeout: duration("request-timeout", &args.request_timeout)?,
        })
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            threshold_percent: self.threshold_percent,
            interval: self.interval,
            cooldown: self.cooldown,
            skip: self.skip.clone(),
            space_mode: self.space_mode,
            undated: self.undated,
        }
    }
}

fn parse_server(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme {
            url: raw.to_string(),
            scheme: other.to_string(),
        }),
    }
}
