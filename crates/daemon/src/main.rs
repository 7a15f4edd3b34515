//! Jetsite Agent - Main Entry Point
//! REST API + task processor + optional external queue poller

mod config;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use config::Config;
use jetsite_api_http::{ApiServer, AppState, HttpServerConfig};
use jetsite_core::application::{
    shutdown_channel, EvictionScheduler, PostProcessor, QueuePoller, ScriptConfig, ScriptRunner,
    TaskOrchestrator, TaskProcessor,
};
use jetsite_core::application::processor::constants::TIMER_STOP_GRACE;
use jetsite_core::port::id_provider::UuidProvider;
use jetsite_core::port::time_provider::SystemTimeProvider;
use jetsite_core::port::{CommandRunner, CredentialProvider, TaskStore};
use jetsite_infra_github::{GithubCredentials, HttpQueueSource};
use jetsite_infra_memory::InMemoryTaskStore;
use jetsite_infra_system::{TokioCommandRunner, WhichToolProbe};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let config = Config::parse();
    let log_dir = (!config.no_log_files).then_some(config.log_dir.as_path());
    let _log_guards = logging::init(config.log_directive(), log_dir)?;

    info!("Jetsite Agent v{} starting...", VERSION);

    let work_dir = config.work_dir();
    match std::fs::create_dir_all(&work_dir) {
        Ok(()) => info!(work_dir = %work_dir.display(), "Work directory ready"),
        Err(e) => warn!(work_dir = %work_dir.display(), error = %e, "Could not create work directory"),
    }

    // 2. Adapters (DI wiring)
    let store: Arc<dyn TaskStore> = Arc::new(InMemoryTaskStore::new(
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
    ));
    let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner::new());
    let credentials = Arc::new(
        GithubCredentials::new(config.credentials()).context("building GitHub HTTP client")?,
    );

    // 3. Application services
    let script = Arc::new(ScriptRunner::new(
        ScriptConfig {
            script_path: config.script_path(),
            work_dir: work_dir.clone(),
            auto_open_editor: config.auto_open_editor,
        },
        credentials.clone(),
        Arc::clone(&runner),
    ));
    let orchestrator = Arc::new(TaskOrchestrator::new(
        script,
        Arc::new(PostProcessor::new(Arc::clone(&runner))),
        Arc::new(WhichToolProbe::new()),
    ));

    // 4. Startup checks (advisory only)
    report_dependencies(&orchestrator);
    verify_credentials(credentials.as_ref()).await;

    let processor = Arc::new(TaskProcessor::new(Arc::clone(&store), Arc::clone(&orchestrator)));
    let state = Arc::new(AppState::new(
        Arc::clone(&store),
        Arc::clone(&processor),
        work_dir,
        config.api_key.clone(),
    ));

    // 5. Timers
    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let drain_every = config.drain_interval();
    let drain_shutdown = shutdown_rx.clone();
    let drain = Arc::clone(&processor);
    let mut timers = vec![tokio::spawn(async move {
        drain.run(drain_shutdown, drain_every).await
    })];

    let eviction = EvictionScheduler::new(Arc::clone(&store));
    let eviction_shutdown = shutdown_rx.clone();
    timers.push(tokio::spawn(async move { eviction.run(eviction_shutdown).await }));

    if let Some(url) = config.queue_url() {
        let source = HttpQueueSource::new(url, config.api_key.clone(), config.github_token.clone())
            .context("building queue HTTP client")?;
        let poller = QueuePoller::new(Arc::new(source), Arc::clone(&state.intake));
        let every = config.queue_poll_interval();
        let poll_shutdown = shutdown_rx.clone();
        info!(queue_url = %url, "External queue polling enabled");
        timers.push(tokio::spawn(async move { poller.run(poll_shutdown, every).await }));
    }

    // 6. HTTP API
    let server = ApiServer::new(
        HttpServerConfig {
            host: config.host.clone(),
            port: config.port,
        },
        state,
    )
    .start()
    .await
    .with_context(|| format!("binding HTTP API on {}:{}", config.host, config.port))?;

    info!(address = %server.local_addr(), "System ready. Waiting for tasks...");

    // 7. Run until a termination signal (or the server dies)
    tokio::select! {
        signal = shutdown_signal() => {
            signal?;
            info!("Shutdown signal received. Exiting...");
        }
        stopped = server.stopped() => {
            stopped.context("HTTP API stopped")?;
        }
    }

    shutdown_tx.shutdown();
    stop_timers(timers).await;
    Ok(())
}

/// Wait briefly for the loops to return; an in-flight task is not awaited
async fn stop_timers(timers: Vec<JoinHandle<()>>) {
    let stopped = tokio::time::timeout(TIMER_STOP_GRACE, async {
        for timer in timers {
            if let Err(e) = timer.await {
                warn!(error = %e, "Timer loop ended abnormally");
            }
        }
    })
    .await;

    match stopped {
        Ok(()) => info!("Timers stopped"),
        Err(_) => warn!("A task is still in flight; exiting without waiting for it"),
    }
}

fn report_dependencies(orchestrator: &TaskOrchestrator) {
    let report = orchestrator.check_dependencies();
    for (tool, available) in &report.tools {
        if *available {
            info!(tool = %tool, "Dependency available");
        } else {
            warn!(tool = %tool, "Dependency not found");
        }
    }
    let missing = report.missing();
    if !missing.is_empty() {
        error!(missing = ?missing, "Required dependencies missing; tasks will fail until installed");
    }
}

async fn verify_credentials(credentials: &dyn CredentialProvider) {
    match credentials.resolve_token().await {
        None => error!("No GitHub token found. Please run: gh auth login"),
        Some(token) => {
            if !credentials.verify(&token).await {
                warn!("GitHub authentication could not be verified; tasks may fail");
            }
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("waiting for Ctrl+C")?,
        _ = terminate.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c().await.context("waiting for Ctrl+C")
}
