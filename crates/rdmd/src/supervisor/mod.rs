//! Supervision of child processes launched on behalf of clients.
//!
//! [`ProcessSupervisor`] owns the table of running children keyed by PID.
//! Foreground runs block the calling connection until the child exits or the
//! deadline elapses; background runs return as soon as the child is spawned
//! and a detached waiter thread removes the entry once the child exits.
//!
//! The table lock is only ever held for a lookup, insert, or removal. Spawning,
//! waiting, and signal delivery all happen outside it.

mod errors;
mod signaller;

use std::collections::BTreeMap;
use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use camino::Utf8Path;
use tracing::{debug, info, warn};

pub use self::errors::SupervisorError;
pub use self::signaller::{NixSignaller, ProcessSignaller};

const SUPERVISOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::supervisor");
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A child process tracked by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedProcess {
    pid: u32,
    command_line: String,
}

impl ManagedProcess {
    /// OS process identifier.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Program path followed by its arguments, space separated.
    #[must_use]
    pub fn command_line(&self) -> &str {
        &self.command_line
    }
}

type ProcessTable = Mutex<BTreeMap<u32, ManagedProcess>>;

/// Owns every child process spawned on behalf of clients.
pub struct ProcessSupervisor {
    table: Arc<ProcessTable>,
    signaller: Arc<dyn ProcessSignaller>,
}

impl std::fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("tracked", &lock_table(&self.table).len())
            .finish_non_exhaustive()
    }
}

impl Default for ProcessSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSupervisor {
    /// Builds a supervisor that signals processes with `SIGKILL`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_signaller(Arc::new(NixSignaller))
    }

    /// Builds a supervisor with a custom signal delivery strategy.
    #[must_use]
    pub fn with_signaller(signaller: Arc<dyn ProcessSignaller>) -> Self {
        Self {
            table: Arc::new(Mutex::new(BTreeMap::new())),
            signaller,
        }
    }

    /// Runs `program` to completion and returns its standard output.
    ///
    /// The child is visible to [`list`](Self::list) and [`kill`](Self::kill)
    /// while it runs. When `timeout` elapses first the child is killed and
    /// reaped before the error is returned.
    ///
    /// # Errors
    ///
    /// Fails when the program cannot be spawned, exits unsuccessfully, or
    /// outlives `timeout`.
    pub fn run_foreground(
        &self,
        name: &str,
        program: &Utf8Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<Vec<u8>, SupervisorError> {
        let mut child = spawn(program, args, Stdio::piped())?;
        let pid = child.id();
        self.register(pid, program, args);
        debug!(
            target: SUPERVISOR_TARGET,
            name,
            pid,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "foreground process started"
        );

        let reader = child.stdout.take().map(spawn_output_reader);
        // A deadline too far out to represent never elapses.
        let deadline = Instant::now().checked_add(timeout);
        let result = wait_with_deadline(&mut child, program, deadline, timeout)
            .and_then(|()| collect_output(reader, pid, program, deadline, timeout));
        self.unregister(pid);
        result
    }

    /// Starts `program` detached from the caller and returns its PID.
    ///
    /// Standard input is closed and output is discarded. The entry is removed
    /// from the table when the child exits, whatever its status.
    ///
    /// # Errors
    ///
    /// Fails when the program cannot be spawned.
    pub fn run_background(
        &self,
        name: &str,
        program: &Utf8Path,
        args: &[String],
    ) -> Result<u32, SupervisorError> {
        let mut child = spawn(program, args, Stdio::null())?;
        let pid = child.id();
        self.register(pid, program, args);
        info!(target: SUPERVISOR_TARGET, name, pid, "background process started");

        let table = Arc::clone(&self.table);
        thread::spawn(move || {
            match child.wait() {
                Ok(status) => {
                    debug!(target: SUPERVISOR_TARGET, pid, %status, "background process exited");
                }
                Err(error) => {
                    warn!(
                        target: SUPERVISOR_TARGET,
                        pid,
                        %error,
                        "failed to wait for background process"
                    );
                }
            }
            lock_table(&table).remove(&pid);
        });
        Ok(pid)
    }

    /// Forcibly terminates a tracked process.
    ///
    /// If signal delivery fails the entry is dropped anyway, on the assumption
    /// that the process has already gone.
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::NoSuchProcess`] for untracked PIDs and
    /// [`SupervisorError::Signal`] when delivery fails.
    pub fn kill(&self, pid: u32) -> Result<(), SupervisorError> {
        let tracked = self.list().iter().any(|process| process.pid == pid);
        if !tracked {
            return Err(SupervisorError::NoSuchProcess { pid });
        }

        if let Err(source) = self.signaller.kill(pid) {
            warn!(target: SUPERVISOR_TARGET, pid, %source, "kill failed; dropping entry");
            self.unregister(pid);
            return Err(SupervisorError::Signal { pid, source });
        }
        info!(target: SUPERVISOR_TARGET, pid, "process killed");
        Ok(())
    }

    /// Point-in-time copy of the tracked processes, ordered by PID.
    #[must_use]
    pub fn list(&self) -> Vec<ManagedProcess> {
        lock_table(&self.table).values().cloned().collect()
    }

    fn register(&self, pid: u32, program: &Utf8Path, args: &[String]) {
        let command_line = std::iter::once(program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        lock_table(&self.table).insert(pid, ManagedProcess { pid, command_line });
    }

    fn unregister(&self, pid: u32) {
        lock_table(&self.table).remove(&pid);
    }
}

fn lock_table(table: &ProcessTable) -> MutexGuard<'_, BTreeMap<u32, ManagedProcess>> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

fn spawn(program: &Utf8Path, args: &[String], stdout: Stdio) -> Result<Child, SupervisorError> {
    Command::new(program.as_std_path())
        .args(args)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| SupervisorError::Spawn {
            program: program.to_string(),
            source,
        })
}

fn spawn_output_reader(mut stdout: ChildStdout) -> JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut output = Vec::new();
        stdout.read_to_end(&mut output).map(|_| output)
    })
}

fn wait_with_deadline(
    child: &mut Child,
    program: &Utf8Path,
    deadline: Option<Instant>,
    timeout: Duration,
) -> Result<(), SupervisorError> {
    let pid = child.id();
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(()),
            Ok(Some(status)) => {
                return Err(SupervisorError::ExitStatus {
                    program: program.to_string(),
                    status,
                });
            }
            Ok(None) if has_elapsed(deadline) => {
                warn!(
                    target: SUPERVISOR_TARGET,
                    pid,
                    timeout_secs = timeout.as_secs(),
                    "foreground process timed out, killing"
                );
                drop(child.kill());
                drop(child.wait());
                return Err(timed_out(program, timeout));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => return Err(SupervisorError::Wait { pid, source }),
        }
    }
}

/// Waits for the output reader, which may outlive the child when a
/// grandchild still holds the pipe open.
fn collect_output(
    reader: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    pid: u32,
    program: &Utf8Path,
    deadline: Option<Instant>,
    timeout: Duration,
) -> Result<Vec<u8>, SupervisorError> {
    let Some(reader) = reader else {
        return Ok(Vec::new());
    };
    while !reader.is_finished() {
        if has_elapsed(deadline) {
            return Err(timed_out(program, timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
    match reader.join() {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(SupervisorError::Output { pid, source }),
        Err(_) => Err(SupervisorError::Output {
            pid,
            source: std::io::Error::other("output reader panicked"),
        }),
    }
}

fn has_elapsed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

fn timed_out(program: &Utf8Path, timeout: Duration) -> SupervisorError {
    SupervisorError::TimedOut {
        program: program.to_string(),
        seconds: timeout.as_secs(),
    }
}
