//! BDD test world for the bootstrap sequence.

use std::cell::RefCell;
use std::sync::Arc;

use crate::bootstrap::{BootstrapError, ConfigLoader, Server, bootstrap_with};

use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across bootstrap steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub test_loader: TestConfigLoader,
    pub reporter: Arc<RecordingHealthReporter>,
    server: Option<Server>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader.
    #[must_use]
    pub fn new() -> Self {
        let test_loader = TestConfigLoader::new();
        Self {
            loader: Box::new(test_loader.clone()),
            test_loader,
            reporter: Arc::new(RecordingHealthReporter::default()),
            server: None,
            bootstrap_error: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
        self.reset_results();
    }

    /// Installs a loader that succeeds.
    pub fn use_successful_loader(&mut self) {
        self.loader = Box::new(self.test_loader.clone());
        self.reset_results();
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.server.is_some() || self.bootstrap_error.is_some() {
            return;
        }

        match bootstrap_with(&*self.loader, self.reporter.as_ref()) {
            Ok(server) => self.server = Some(server),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Returns the bootstrap error, if any.
    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns the bootstrapped server, if any.
    #[must_use]
    pub fn server(&self) -> Option<&Server> {
        self.server.as_ref()
    }

    fn reset_results(&mut self) {
        self.server = None;
        self.bootstrap_error = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
