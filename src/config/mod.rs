//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{num::NonZeroUsize, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use cli::{CliArgs, Command, RenderArgs, ReplayArgs, SettingsOverrides};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "livepreview";
const ENV_PREFIX: &str = "LIVEPREVIEW";
const DEFAULT_CACHE_MAX_SIZE: u64 = crate::cache::DEFAULT_MAX_SIZE as u64;
const DEFAULT_MAX_PREDICTIONS: u64 = 5;
const DEFAULT_HISTORY_DEPTH: u64 = crate::application::prediction::DEFAULT_HISTORY_DEPTH as u64;
const DEFAULT_TEMPORAL_WINDOW_MS: u64 = 2_000;
const DEFAULT_MIN_STREAK: u64 = 2;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub cache: CacheSettings,
    pub render: RenderSettings,
    pub prediction: PredictionSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub max_size: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub incremental: bool,
    pub sanitize: bool,
}

#[derive(Debug, Clone)]
pub struct PredictionSettings {
    pub max_predictions: NonZeroUsize,
    pub history_depth: NonZeroUsize,
    pub temporal_window: Duration,
    pub min_streak: NonZeroUsize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    raw.apply_overrides(&cli.overrides);
    match &cli.command {
        Command::Render(args) => raw.apply_full_render_flag(args.full),
        Command::Replay(args) => raw.apply_full_render_flag(args.full),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    cache: RawCacheSettings,
    render: RawRenderSettings,
    prediction: RawPredictionSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(max_size) = overrides.cache_max_size {
            self.cache.max_size = Some(max_size);
        }
        if let Some(sanitize) = overrides.render_sanitize {
            self.render.sanitize = Some(sanitize);
        }
        if let Some(value) = overrides.prediction_max_predictions {
            self.prediction.max_predictions = Some(value);
        }
        if let Some(value) = overrides.prediction_history_depth {
            self.prediction.history_depth = Some(value);
        }
        if let Some(value) = overrides.prediction_temporal_window_ms {
            self.prediction.temporal_window_ms = Some(value);
        }
        if let Some(value) = overrides.prediction_min_streak {
            self.prediction.min_streak = Some(value);
        }
    }

    /// `--full` only ever switches incremental mode off.
    fn apply_full_render_flag(&mut self, full: bool) {
        if full {
            self.render.incremental = Some(false);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            cache,
            render,
            prediction,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            cache: build_cache_settings(cache)?,
            render: build_render_settings(render),
            prediction: build_prediction_settings(prediction)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let max_size = cache.max_size.unwrap_or(DEFAULT_CACHE_MAX_SIZE);
    Ok(CacheSettings {
        max_size: non_zero_usize(max_size, "cache.max_size")?,
    })
}

fn build_render_settings(render: RawRenderSettings) -> RenderSettings {
    RenderSettings {
        incremental: render.incremental.unwrap_or(true),
        sanitize: render.sanitize.unwrap_or(true),
    }
}

fn build_prediction_settings(
    prediction: RawPredictionSettings,
) -> Result<PredictionSettings, LoadError> {
    let max_predictions = prediction
        .max_predictions
        .unwrap_or(DEFAULT_MAX_PREDICTIONS);
    let history_depth = prediction.history_depth.unwrap_or(DEFAULT_HISTORY_DEPTH);
    let min_streak = prediction.min_streak.unwrap_or(DEFAULT_MIN_STREAK);
    let temporal_window_ms = prediction
        .temporal_window_ms
        .unwrap_or(DEFAULT_TEMPORAL_WINDOW_MS);

    Ok(PredictionSettings {
        max_predictions: non_zero_usize(max_predictions, "prediction.max_predictions")?,
        history_depth: non_zero_usize(history_depth, "prediction.history_depth")?,
        temporal_window: Duration::from_millis(temporal_window_ms),
        min_streak: non_zero_usize(min_streak, "prediction.min_streak")?,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    max_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    incremental: Option<bool>,
    sanitize: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPredictionSettings {
    max_predictions: Option<u64>,
    history_depth: Option<u64>,
    temporal_window_ms: Option<u64>,
    min_streak: Option<u64>,
}

fn non_zero_usize(value: u64, key: &'static str) -> Result<NonZeroUsize, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_usize: usize = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for usize"))?;
    NonZeroUsize::new(value_usize)
        .ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
