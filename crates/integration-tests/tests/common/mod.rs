//! Shared wiring for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use jetsite_core::application::{
    PostProcessor, ScriptConfig, ScriptRunner, TaskOrchestrator, TaskProcessor,
};
use jetsite_core::port::id_provider::mocks::SequentialIdProvider;
use jetsite_core::port::time_provider::SystemTimeProvider;
use jetsite_core::port::tool_probe::mocks::StaticToolProbe;
use jetsite_core::port::{
    CommandOutput, CommandRunner, CommandSpec, CredentialProvider, ExecutionError, TaskStore,
};
use jetsite_infra_memory::InMemoryTaskStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Notify;

pub fn store() -> Arc<dyn TaskStore> {
    Arc::new(InMemoryTaskStore::new(
        Arc::new(SequentialIdProvider::new()),
        Arc::new(SystemTimeProvider),
    ))
}

pub fn processor(
    store: Arc<dyn TaskStore>,
    runner: Arc<dyn CommandRunner>,
    credentials: Arc<dyn CredentialProvider>,
    work_dir: &Path,
    script_path: PathBuf,
) -> Arc<TaskProcessor> {
    let script = ScriptRunner::new(
        ScriptConfig {
            script_path,
            work_dir: work_dir.to_path_buf(),
            auto_open_editor: false,
        },
        credentials,
        Arc::clone(&runner),
    );
    let orchestrator = TaskOrchestrator::new(
        Arc::new(script),
        Arc::new(PostProcessor::new(runner)),
        Arc::new(StaticToolProbe::all_available()),
    );
    Arc::new(TaskProcessor::new(store, Arc::new(orchestrator)))
}

/// Runner that parks every call until released
#[derive(Default)]
pub struct GatedRunner {
    pub started: Notify,
    pub release: Notify,
}

#[async_trait]
impl CommandRunner for GatedRunner {
    async fn run(&self, _spec: &CommandSpec) -> Result<CommandOutput, ExecutionError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }
}

/// Runner whose first call panics
#[derive(Default)]
pub struct PanickingRunner {
    calls: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl CommandRunner for PanickingRunner {
    async fn run(&self, _spec: &CommandSpec) -> Result<CommandOutput, ExecutionError> {
        let n = self
            .calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if n == 0 {
            panic!("runner exploded");
        }
        Ok(CommandOutput {
            exit_code: Some(0),
            ..CommandOutput::default()
        })
    }
}
