//! Listener implementation for server transport sockets.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use rdm_config::SocketEndpoint;
use rdm_daemon_types::{Command, PROBE_TIMEOUT, REQUEST_TIMEOUT, send_command};

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::UnixListener;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// Listener that owns the server endpoint.
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: SocketEndpoint,
    listener: ListenerKind,
    request_timeout: Duration,
}

#[derive(Debug)]
enum ListenerKind {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl SocketListener {
    /// Binds the endpoint, probing and reclaiming it when a previous server
    /// left it behind.
    pub(crate) fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let listener = match endpoint {
            SocketEndpoint::Tcp { host, port } => ListenerKind::Tcp(bind_tcp(endpoint, host, *port)?),
            SocketEndpoint::Unix { path } => {
                #[cfg(unix)]
                {
                    ListenerKind::Unix(bind_unix(endpoint, path.as_std_path())?)
                }

                #[cfg(not(unix))]
                {
                    let _ = path;
                    return Err(ListenerError::UnsupportedUnix {
                        endpoint: endpoint.to_string(),
                    });
                }
            }
        };
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
            request_timeout: REQUEST_TIMEOUT,
        })
    }

    /// Overrides the per-connection read and write timeout.
    #[cfg(test)]
    pub(crate) fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        match &self.listener {
            ListenerKind::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            ListenerKind::Unix(_) => None,
        }
    }

    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        let shutdown = Arc::new(AtomicBool::new(false));
        if let Err(error) = match &self.listener {
            ListenerKind::Tcp(listener) => listener.set_nonblocking(true),
            #[cfg(unix)]
            ListenerKind::Unix(listener) => listener.set_nonblocking(true),
        } {
            #[cfg(unix)]
            cleanup_unix_socket(&self.endpoint);
            return Err(ListenerError::NonBlocking { source: error });
        }
        let shutdown_flag = Arc::clone(&shutdown);
        let handle = thread::spawn(move || run_accept_loop(&self, &shutdown_flag, &handler));
        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Handle to the background listener thread.
pub(crate) struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop; in-flight connections still complete.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept loop and every in-flight connection to finish.
    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| ListenerError::ThreadPanic)
        } else {
            Ok(())
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop(
    listener: &SocketListener,
    shutdown: &AtomicBool,
    handler: &Arc<dyn ConnectionHandler>,
) {
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.endpoint,
        "socket listener active"
    );
    let mut connections: Vec<JoinHandle<()>> = Vec::new();
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        connections.retain(|connection| !connection.is_finished());
        match accept_connection(listener) {
            Ok(Some(stream)) => {
                last_error = None;
                let handler = Arc::clone(handler);
                connections.push(thread::spawn(move || handler.handle(stream)));
            }
            Ok(None) => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }

    debug!(
        target: LISTENER_TARGET,
        in_flight = connections.len(),
        "draining connections"
    );
    for connection in connections {
        if connection.join().is_err() {
            warn!(target: LISTENER_TARGET, "connection handler panicked");
        }
    }

    #[cfg(unix)]
    cleanup_unix_socket(&listener.endpoint);
}

fn accept_connection(listener: &SocketListener) -> Result<Option<ConnectionStream>, io::Error> {
    let stream = match &listener.listener {
        ListenerKind::Tcp(tcp) => match tcp.accept() {
            Ok((stream, _)) => ConnectionStream::Tcp(stream),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(error) => return Err(error),
        },
        #[cfg(unix)]
        ListenerKind::Unix(unix) => match unix.accept() {
            Ok((stream, _)) => ConnectionStream::Unix(stream),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(None),
            Err(error) => return Err(error),
        },
    };
    stream.prepare(listener.request_timeout)?;
    Ok(Some(stream))
}

/// Returns `true` when a server answers a `status` request on `endpoint`.
fn endpoint_is_live(endpoint: &SocketEndpoint) -> bool {
    match send_command(endpoint, &Command::bare("status"), PROBE_TIMEOUT) {
        Ok(_) => true,
        Err(error) => {
            debug!(
                target: LISTENER_TARGET,
                endpoint = %endpoint,
                error = %error,
                "endpoint probe failed"
            );
            false
        }
    }
}

fn bind_tcp(endpoint: &SocketEndpoint, host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?;
    let addr = addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_string(),
            port,
        })?;
    match TcpListener::bind(addr) {
        Ok(listener) => Ok(listener),
        Err(error) if error.kind() == io::ErrorKind::AddrInUse && endpoint_is_live(endpoint) => {
            Err(ListenerError::AlreadyRunning {
                endpoint: endpoint.to_string(),
            })
        }
        Err(source) => Err(ListenerError::BindTcp { addr, source }),
    }
}

#[cfg(unix)]
fn bind_unix(endpoint: &SocketEndpoint, path: &std::path::Path) -> Result<UnixListener, ListenerError> {
    let bind_error = |source| ListenerError::BindUnix {
        path: path.display().to_string(),
        source,
    };
    match UnixListener::bind(path) {
        Ok(listener) => return Ok(listener),
        Err(error) if error.kind() == io::ErrorKind::AddrInUse => {}
        Err(source) => return Err(bind_error(source)),
    }

    if endpoint_is_live(endpoint) {
        return Err(ListenerError::AlreadyRunning {
            endpoint: endpoint.to_string(),
        });
    }

    let metadata = fs::symlink_metadata(path).map_err(|source| ListenerError::UnixMetadata {
        path: path.display().to_string(),
        source,
    })?;
    if !metadata.file_type().is_socket() {
        return Err(ListenerError::UnixNotSocket {
            path: path.display().to_string(),
        });
    }

    info!(
        target: LISTENER_TARGET,
        path = %path.display(),
        "removing stale unix socket"
    );
    fs::remove_file(path).map_err(|source| ListenerError::UnixCleanup {
        path: path.display().to_string(),
        source,
    })?;
    UnixListener::bind(path).map_err(bind_error)
}

#[cfg(unix)]
fn cleanup_unix_socket(endpoint: &SocketEndpoint) {
    let SocketEndpoint::Unix { path } = endpoint else {
        return;
    };
    if let Err(error) = fs::remove_file(path.as_std_path())
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            path = %path,
            "failed to remove unix socket file"
        );
    }
}
