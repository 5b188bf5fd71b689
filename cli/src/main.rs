//! CLI entrypoint for Fire Circle
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use circle_application::{NoProgress, NoTranscriptSink, RunCircleUseCase, TranscriptSink};
use circle_infrastructure::config::{ConfigLoader, FileConfig, bootstrap};
use circle_infrastructure::transcript::JsonlTranscriptWriter;
use circle_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // Load configuration before logging so [logging] can point at a file
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Could not load configuration")?
    };

    let log_file = cli.log_file.as_ref().or(config.logging.log_file.as_ref());
    let _guard = init_logging(cli.verbose, log_file.map(|p| p.as_path()))?;

    info!("Starting Fire Circle");

    // Topic is required once config handling is out of the way
    let topic = match &cli.topic {
        Some(t) => t.clone(),
        None => bail!("A topic is required. See --help for usage."),
    };

    // === Dependency Injection ===
    let wired = bootstrap(&config).context("Could not bootstrap the entity registry")?;

    let sink: Arc<dyn TranscriptSink> = match cli
        .transcript_log
        .as_ref()
        .or(config.logging.transcript_file.as_ref())
    {
        Some(path) => match JsonlTranscriptWriter::new(path) {
            Some(writer) => {
                info!("Writing transcript to {}", writer.path().display());
                Arc::new(writer)
            }
            None => bail!("Could not open transcript log at {}", path.display()),
        },
        None => Arc::new(NoTranscriptSink),
    };

    let request = session_defaults(&cli, &config).to_request(wired.participants.clone(), topic.clone());

    // Ctrl-C ends the session through the ordinary cancel path
    let cancel = CancellationToken::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    let use_case = RunCircleUseCase::new(wired.router, wired.registry).with_sink(sink);

    let response = if cli.quiet {
        use_case.execute_with(request, &NoProgress, cancel).await?
    } else if cli.verbose > 0 {
        // Progress bars and log lines fight over the terminal
        use_case.execute_with(request, &SimpleProgress, cancel).await?
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with(request, &progress, cancel).await?
    };

    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&response, &topic),
        OutputFormat::Compact => ConsoleFormatter::format_compact(&response, &topic),
        OutputFormat::Json => ConsoleFormatter::format_json(&response),
    };
    println!("{}", output);

    Ok(())
}

/// Session defaults from the config file with CLI overrides applied
fn session_defaults(cli: &Cli, config: &FileConfig) -> circle_infrastructure::config::FileCircleConfig {
    let mut circle = config.circle.clone();
    if let Some(policy) = &cli.policy {
        circle.policy = policy.clone();
    }
    if cli.threshold.is_some() {
        circle.threshold = cli.threshold;
    }
    if cli.moderator.is_some() {
        circle.moderator = cli.moderator.clone();
    }
    if let Some(max_turns) = cli.max_turns {
        circle.max_turns = max_turns;
    }
    if let Some(secs) = cli.per_turn_timeout {
        circle.per_turn_timeout_secs = secs;
    }
    if let Some(secs) = cli.session_timeout {
        circle.session_timeout_secs = secs;
    }
    if let Some(min_quorum) = cli.min_quorum {
        circle.min_quorum = min_quorum;
    }
    if let Some(retries) = cli.retries {
        circle.max_invoke_retries = retries;
    }
    if cli.summary {
        circle.summary = true;
    }
    circle
}

/// Install the tracing subscriber; the returned guard must outlive main.
fn init_logging(
    verbose: u8,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_file {
        Some(path) => {
            let directory = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            Ok(None)
        }
    }
}
