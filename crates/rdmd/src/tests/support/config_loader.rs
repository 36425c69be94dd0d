//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::{OrthoConfig as _, OrthoError};
use tempfile::TempDir;

use rdm_config::{Config, SocketEndpoint};

use crate::bootstrap::ConfigLoader;

/// Loader that keeps the socket and catalog under a private temporary
/// directory.
#[derive(Clone)]
pub struct TestConfigLoader {
    _dir: Arc<TempDir>,
    root: Utf8PathBuf,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temporary directory for socket");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temporary directory path was not valid UTF-8");
        Self {
            _dir: Arc::new(dir),
            root,
        }
    }

    /// Directory holding every artefact the loader hands out.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of the Unix socket the server binds.
    pub fn socket_path(&self) -> Utf8PathBuf {
        self.root.join("rdm.sock")
    }

    /// Path of the command catalog file.
    pub fn catalog_path(&self) -> Utf8PathBuf {
        self.root.join("commands.json")
    }

    /// Writes an executable shell script next to the catalog and registers it.
    pub fn register_script(&self, name: &str, body: &str) {
        let script = self.root.join(name);
        fs::write(&script, format!("#!/bin/sh\n{body}\n")).expect("write catalog script");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("make catalog script executable");

        let catalog_path = self.catalog_path();
        let mut catalog: serde_json::Value = fs::read(&catalog_path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_else(|| serde_json::json!({ "commands": {} }));
        catalog["commands"][name] = serde_json::json!({ "executablePath": name });
        fs::write(&catalog_path, catalog.to_string()).expect("write catalog");
    }

    /// Replaces the catalog with unparseable content.
    pub fn corrupt_catalog(&self) {
        fs::write(self.catalog_path(), "{ not json").expect("write corrupt catalog");
    }
}

impl Default for TestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            daemon_socket: SocketEndpoint::unix(self.socket_path()),
            catalog_path: self.catalog_path(),
            run_timeout_secs: 2,
            ..Config::default()
        })
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("rdmd"),
            OsString::from("--daemon-socket"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}
