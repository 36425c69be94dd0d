//! Test helpers for the transport module.

use std::io::{Read, Write};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use rdm_daemon_types::STATUS_RUNNING;

use super::{ConnectionHandler, ConnectionStream};

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: ConnectionStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Answers every request with the live status body, like a running server.
pub(crate) struct StatusHandler;

impl ConnectionHandler for StatusHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        let mut request = Vec::new();
        if stream.read_to_end(&mut request).is_ok() {
            drop(stream.write_all(STATUS_RUNNING));
        }
    }
}
