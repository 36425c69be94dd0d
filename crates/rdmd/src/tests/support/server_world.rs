//! End-to-end test world that runs a full server on a private Unix socket.

use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rdm_config::SocketEndpoint;
use rdm_daemon_types::{Command, send_command};

use crate::capability::{HostServices, MemoryClipboard, RecordingOpener};
use crate::health::HealthReporter;
use crate::lifecycle::{
    LaunchError, LaunchPlan, NoShutdownSignal, ShutdownReason, ShutdownTrigger, launch,
};

use super::config_loader::TestConfigLoader;
use super::reporter::RecordingHealthReporter;

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

pub type StepResult = Result<(), String>;

/// Scenario world owning a running server and the last exchange with it.
pub struct ServerWorld {
    pub loader: TestConfigLoader,
    pub reporter: Arc<RecordingHealthReporter>,
    pub opener: Arc<RecordingOpener>,
    clipboard: Arc<MemoryClipboard>,
    shutdown: ShutdownTrigger,
    handle: Option<JoinHandle<Result<(), LaunchError>>>,
    result: Option<Result<(), LaunchError>>,
    second_result: Option<Result<(), LaunchError>>,
    response: Option<Vec<u8>>,
}

impl ServerWorld {
    pub fn new() -> Self {
        Self {
            loader: TestConfigLoader::new(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            opener: Arc::new(RecordingOpener::default()),
            clipboard: Arc::new(MemoryClipboard::default()),
            shutdown: ShutdownTrigger::new(),
            handle: None,
            result: None,
            second_result: None,
            response: None,
        }
    }

    /// Endpoint the server binds.
    pub fn endpoint(&self) -> SocketEndpoint {
        SocketEndpoint::unix(self.loader.socket_path())
    }

    /// Starts the server on a background thread and waits until it listens.
    pub fn start(&mut self) -> StepResult {
        if self.handle.is_some() {
            return Err(String::from("server already running"));
        }
        let plan = LaunchPlan {
            loader: self.loader.clone(),
            reporter: self.reporter.clone() as Arc<dyn HealthReporter>,
            host: HostServices::new(self.clipboard.clone(), self.opener.clone()),
            signals: NoShutdownSignal,
            shutdown: self.shutdown.clone(),
        };
        let handle = thread::spawn(move || launch(plan));

        let deadline = Instant::now() + WAIT_TIMEOUT;
        while !self.reporter.listener_is_ready() {
            if handle.is_finished() {
                let result = handle
                    .join()
                    .map_err(|_| String::from("server thread panicked"))?;
                return Err(format!("server exited before listening: {result:?}"));
            }
            if Instant::now() >= deadline {
                return Err(String::from("server did not start listening in time"));
            }
            thread::sleep(POLL_INTERVAL);
        }
        self.handle = Some(handle);
        Ok(())
    }

    /// Runs a second server against the same configuration in the foreground.
    pub fn start_second(&mut self) {
        let plan = LaunchPlan {
            loader: self.loader.clone(),
            reporter: Arc::new(RecordingHealthReporter::default()) as Arc<dyn HealthReporter>,
            host: HostServices::new(
                Arc::new(MemoryClipboard::default()),
                Arc::new(RecordingOpener::default()),
            ),
            signals: NoShutdownSignal,
            shutdown: ShutdownTrigger::new(),
        };
        self.second_result = Some(launch(plan));
    }

    /// Sends one command and records the response body.
    pub fn send(&mut self, name: &str, arguments: &[&str]) -> StepResult {
        let command = Command::new(name, arguments.iter().copied());
        let body = send_command(&self.endpoint(), &command, CLIENT_TIMEOUT)
            .map_err(|error| format!("exchange failed: {error}"))?;
        self.response = Some(body);
        Ok(())
    }

    /// Sends raw bytes, half-closes, and records the response body.
    pub fn send_raw(&mut self, request: &[u8]) -> StepResult {
        let mut stream = UnixStream::connect(self.loader.socket_path())
            .map_err(|error| format!("connect failed: {error}"))?;
        stream
            .set_read_timeout(Some(CLIENT_TIMEOUT))
            .map_err(|error| error.to_string())?;
        stream.write_all(request).map_err(|error| error.to_string())?;
        stream
            .shutdown(Shutdown::Write)
            .map_err(|error| error.to_string())?;
        let mut body = Vec::new();
        stream
            .read_to_end(&mut body)
            .map_err(|error| error.to_string())?;
        self.response = Some(body);
        Ok(())
    }

    /// Last response body as text.
    pub fn response_text(&self) -> Result<String, String> {
        let body = self
            .response
            .as_ref()
            .ok_or_else(|| String::from("no response recorded"))?;
        String::from_utf8(body.clone()).map_err(|error| error.to_string())
    }

    /// Waits for the server thread to exit and records its result.
    pub fn wait_for_exit(&mut self) -> StepResult {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| String::from("server not running"))?;
        let deadline = Instant::now() + WAIT_TIMEOUT;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                self.handle = Some(handle);
                return Err(String::from("server did not exit in time"));
            }
            thread::sleep(POLL_INTERVAL);
        }
        let result = handle
            .join()
            .map_err(|_| String::from("server thread panicked"))?;
        self.result = Some(result);
        Ok(())
    }

    /// Result of the primary server run, once it has exited.
    pub fn result(&self) -> Option<&Result<(), LaunchError>> {
        self.result.as_ref()
    }

    /// Result of the competing server run.
    pub fn second_result(&self) -> Option<&Result<(), LaunchError>> {
        self.second_result.as_ref()
    }
}

impl Default for ServerWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ServerWorld {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.shutdown.trigger(ShutdownReason::StopCommand);
            drop(handle.join());
        }
    }
}
