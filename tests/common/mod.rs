#![allow(dead_code)]

use std::sync::Arc;

use termrun::config::StrategyConfig;
use termrun::exec::JobRegistry;
use termrun::host::HostState;
use termrun::strategy::TerminalStrategy;

pub use termrun_test_utils::{
    init_tracing, FakeSession, FakeTerminalService, Recorded, RecordingTask,
    StrategyConfigBuilder,
};

/// Strategy wired to a fresh fake service, a private registry and a private
/// host flag, so tests never observe each other's jobs.
pub struct Harness {
    pub service: FakeTerminalService,
    pub registry: Arc<JobRegistry>,
    pub host: HostState,
    pub strategy: TerminalStrategy,
}

impl Harness {
    pub fn new(config: StrategyConfig) -> Self {
        init_tracing();

        let service = FakeTerminalService::new();
        let registry = Arc::new(JobRegistry::new());
        let host = HostState::new();
        let strategy = TerminalStrategy::new(config, Arc::new(service.clone()))
            .with_registry(Arc::clone(&registry))
            .with_host(host.clone());

        Self {
            service,
            registry,
            host,
            strategy,
        }
    }

    pub fn session(&self) -> FakeSession {
        self.service
            .last_session()
            .expect("strategy should have created a session")
    }
}
