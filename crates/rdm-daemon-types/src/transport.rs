//! Socket transport helpers for reaching the server.
//!
//! [`connect`] establishes a connection to either endpoint flavour and wraps
//! it in a uniform [`Connection`] so callers stay transport agnostic.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use rdm_config::SocketEndpoint;

#[cfg(unix)]
use std::os::fd::OwnedFd;
#[cfg(unix)]
use std::os::unix::net::UnixStream;

#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};

/// An established client connection.
pub enum Connection {
    /// TCP connection, used from remote sessions.
    Tcp(TcpStream),
    /// Unix domain socket connection.
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Connection {
    /// Applies the same read and write timeout to the underlying socket.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket rejects the timeout.
    pub fn set_timeouts(&self, timeout: Duration) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))
            }
            #[cfg(unix)]
            Self::Unix(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))
            }
        }
    }

    /// Closes the write half so the peer observes end-of-request.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown call fails.
    pub fn finish_request(&self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.shutdown(Shutdown::Write),
            #[cfg(unix)]
            Self::Unix(stream) => stream.shutdown(Shutdown::Write),
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Self::Unix(stream) => stream.flush(),
        }
    }
}

/// Connects to the endpoint, giving up after `timeout`.
///
/// # Errors
///
/// Returns an error when the address cannot be resolved, the transport is
/// unsupported on this platform, or the connection attempt fails.
pub fn connect(endpoint: &SocketEndpoint, timeout: Duration) -> io::Result<Connection> {
    match endpoint {
        SocketEndpoint::Tcp { host, port } => {
            let address = resolve_tcp_address(host, *port)?;
            TcpStream::connect_timeout(&address, timeout).map(Connection::Tcp)
        }
        SocketEndpoint::Unix { path } => {
            #[cfg(unix)]
            {
                connect_unix(path.as_str(), timeout)
            }

            #[cfg(not(unix))]
            {
                let _ = (path, timeout);
                Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "unix sockets are unsupported on this platform",
                ))
            }
        }
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;
    addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

#[cfg(unix)]
fn connect_unix(path: &str, timeout: Duration) -> io::Result<Connection> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, timeout)?;
    Ok(Connection::Unix(UnixStream::from(OwnedFd::from(socket))))
}
