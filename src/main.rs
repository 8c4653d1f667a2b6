use std::{
    fs,
    io::{self, Write},
    path::Path,
    process,
};

use livepreview::{
    ComrakFragmentRenderer,
    application::{
        error::AppError,
        prediction::Prediction,
        render::RenderPipelineConfig,
        session::{PreviewSession, SessionConfig, SessionStatistics},
    },
    cache::ContentHash,
    config::{self, RenderArgs, ReplayArgs, Settings},
    domain::blocks::Block,
    infra::{error::InfraError, telemetry},
};
use serde::Serialize;
use tracing::{Dispatch, Level, debug, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    let chain = error.chain();
    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?chain, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = ?chain, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    match &cli_args.command {
        config::Command::Render(args) => run_render(&settings, args),
        config::Command::Replay(args) => run_replay(&settings, args),
    }
}

fn build_session(settings: &Settings) -> Result<PreviewSession<ComrakFragmentRenderer>, AppError> {
    let renderer = ComrakFragmentRenderer::new(&RenderPipelineConfig::from(&settings.render));
    Ok(PreviewSession::new(renderer, &SessionConfig::from(settings))?)
}

fn read_source(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|err| AppError::source_file(path, err))
}

fn run_render(settings: &Settings, args: &RenderArgs) -> Result<(), AppError> {
    let source = read_source(&args.file)?;
    let mut session = build_session(settings)?;

    let html = session.render(&source);
    io::stdout()
        .lock()
        .write_all(html.as_bytes())
        .map_err(InfraError::from)?;

    if args.stats {
        let stats =
            serde_json::to_string_pretty(&session.get_statistics()).map_err(InfraError::from)?;
        eprintln!("{stats}");
    }

    info!(
        file = %args.file.display(),
        blocks = session.blocks().len(),
        incremental = settings.render.incremental,
        "render complete"
    );
    Ok(())
}

#[derive(Serialize)]
struct RevisionReport<'a> {
    revision: usize,
    file: String,
    blocks: usize,
    html_bytes: usize,
    cursor_line: Option<usize>,
    prediction: &'a Prediction,
    prerendered: usize,
    stats: SessionStatistics,
}

fn run_replay(settings: &Settings, args: &ReplayArgs) -> Result<(), AppError> {
    let mut session = build_session(settings)?;
    let mut stdout = io::stdout().lock();

    for (revision, path) in args.files.iter().enumerate() {
        let source = read_source(path)?;
        let previous: Vec<ContentHash> = session.blocks().iter().map(|block| block.id).collect();

        let html = session.render(&source);

        let cursor_line = args
            .cursor_line
            .or_else(|| first_changed_line(session.blocks(), &previous));
        if let Some(line) = cursor_line {
            session.update_cursor_position(line);
        }

        let prediction = session.request_prediction();
        let prerendered = session.idle_prerender(args.prerender_budget);
        debug!(
            revision,
            file = %path.display(),
            prerendered,
            "revision replayed"
        );

        let report = RevisionReport {
            revision,
            file: path.display().to_string(),
            blocks: session.blocks().len(),
            html_bytes: html.len(),
            cursor_line,
            prediction: &prediction,
            prerendered,
            stats: session.get_statistics(),
        };
        serde_json::to_writer(&mut stdout, &report).map_err(InfraError::from)?;
        writeln!(stdout).map_err(InfraError::from)?;
    }

    Ok(())
}

/// Start line of the first block that was not present in the previous revision.
fn first_changed_line(blocks: &[Block], previous: &[ContentHash]) -> Option<usize> {
    if previous.is_empty() {
        return None;
    }
    blocks
        .iter()
        .find(|block| !previous.contains(&block.id))
        .map(|block| block.start_line)
}
