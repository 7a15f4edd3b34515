//! Logging setup: console plus optional agent.log / agent-error.log files

use anyhow::{Context, Result};
use std::path::Path;
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Registry;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE: &str = "agent.log";
pub const ERROR_LOG_FILE: &str = "agent-error.log";

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Keeps the file writers flushing; drop only at exit
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

fn file_layers<S>(dir: &Path) -> Result<(Vec<BoxedLayer<S>>, Vec<WorkerGuard>)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let all = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(dir)
        .with_context(|| format!("opening {}", LOG_FILE))?;
    let errors = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(ERROR_LOG_FILE)
        .build(dir)
        .with_context(|| format!("opening {}", ERROR_LOG_FILE))?;

    let (all, all_guard) = tracing_appender::non_blocking(all);
    let (errors, errors_guard) = tracing_appender::non_blocking(errors);

    let layers = vec![
        fmt::layer().with_writer(all).with_ansi(false).boxed(),
        fmt::layer()
            .with_writer(errors)
            .with_ansi(false)
            .with_filter(LevelFilter::ERROR)
            .boxed(),
    ];
    Ok((layers, vec![all_guard, errors_guard]))
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `directive`; the console format is `pretty` unless
/// `JETSITE_LOG_FORMAT=json`.
pub fn init(directive: &str, log_dir: Option<&Path>) -> Result<LogGuards> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .with_context(|| format!("invalid log level: {}", directive))?;

    let log_format =
        std::env::var("JETSITE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let mut layers: Vec<BoxedLayer<Registry>> = vec![env_filter.boxed()];
    match log_format.as_str() {
        // Production: JSON structured logging
        "json" => layers.push(fmt::layer().json().boxed()),
        // Development: Pretty formatting with colors
        _ => layers.push(fmt::layer().pretty().boxed()),
    }

    let mut guards = Vec::new();
    if let Some(dir) = log_dir {
        let (files, file_guards) = file_layers(dir)?;
        layers.extend(files);
        guards = file_guards;
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(LogGuards { _guards: guards })
}
