use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the livepreview binary.
#[derive(Debug, Parser)]
#[command(
    name = "livepreview",
    version,
    about = "Incremental block-level preview renderer"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "LIVEPREVIEW_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render one file and print the preview HTML.
    Render(RenderArgs),
    /// Render several files as successive revisions of one document.
    Replay(ReplayArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Source file to render.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Disable incremental mode and render the whole document in one pass.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub full: bool,

    /// Print cache and render statistics as JSON on stderr.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub stats: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ReplayArgs {
    /// Revisions of the document, oldest first.
    #[arg(
        value_name = "FILE",
        value_hint = ValueHint::FilePath,
        num_args = 1..,
        required = true
    )]
    pub files: Vec<PathBuf>,

    /// Disable incremental mode for every revision.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub full: bool,

    /// Blocks to pre-render between revisions.
    #[arg(long = "prerender-budget", default_value_t = 5, value_name = "COUNT")]
    pub prerender_budget: usize,

    /// Cursor line reported before each prediction; defaults to the first
    /// line of the first edited block.
    #[arg(long = "cursor-line", value_name = "LINE")]
    pub cursor_line: Option<usize>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SettingsOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the number of rendered blocks kept in the cache.
    #[arg(long = "cache-max-size", value_name = "COUNT", global = true)]
    pub cache_max_size: Option<u64>,

    /// Toggle sanitisation of rendered HTML.
    #[arg(
        long = "render-sanitize",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub render_sanitize: Option<bool>,

    /// Override the maximum number of predicted blocks.
    #[arg(long = "prediction-max-predictions", value_name = "COUNT", global = true)]
    pub prediction_max_predictions: Option<u64>,

    /// Override the edit history depth.
    #[arg(long = "prediction-history-depth", value_name = "COUNT", global = true)]
    pub prediction_history_depth: Option<u64>,

    /// Override the temporal locality window.
    #[arg(long = "prediction-temporal-window-ms", value_name = "MILLIS", global = true)]
    pub prediction_temporal_window_ms: Option<u64>,

    /// Override the minimum sequential streak before extrapolating.
    #[arg(long = "prediction-min-streak", value_name = "COUNT", global = true)]
    pub prediction_min_streak: Option<u64>,
}
