//! Registered command catalog.
//!
//! The catalog maps short command names to executables the server may run
//! on behalf of clients. It is read from a JSON file of the form
//!
//! ```json
//! {"commands": {"tests": {"executablePath": "bin/run-tests"}}}
//! ```
//!
//! Relative executable paths are resolved against the directory holding the
//! catalog file. The server treats the loaded catalog as read-only.

use std::collections::BTreeMap;
use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single registered command.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Executable launched when the command is run.
    pub executable_path: Utf8PathBuf,
}

impl CatalogEntry {
    /// Builds an entry for the given executable.
    #[must_use]
    pub fn new(executable_path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            executable_path: executable_path.into(),
        }
    }
}

/// Read-only mapping from command name to executable.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default)]
    commands: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// Builds a catalog from name/entry pairs.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, CatalogEntry)>,
        S: Into<String>,
    {
        Self {
            commands: entries
                .into_iter()
                .map(|(name, entry)| (name.into(), entry))
                .collect(),
        }
    }

    /// Loads the catalog file at `path`.
    ///
    /// A missing file yields an empty catalog; the server runs without
    /// registered commands in that case.
    pub fn load(path: &Utf8Path) -> Result<Self, CatalogError> {
        let contents = match fs::read(path.as_std_path()) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(CatalogError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let catalog: Self =
            serde_json::from_slice(&contents).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(catalog.resolve_relative_to(path.parent().unwrap_or_else(|| Utf8Path::new(""))))
    }

    fn resolve_relative_to(mut self, root: &Utf8Path) -> Self {
        for entry in self.commands.values_mut() {
            if entry.executable_path.is_relative() {
                entry.executable_path = root.join(&entry.executable_path);
            }
        }
        self
    }

    /// Looks up a command by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.commands.get(name)
    }

    /// Registered command names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// Returns the number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` when no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Errors raised while loading the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file exists but could not be read.
    #[error("could not read command catalog '{path}': {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The file is not valid catalog JSON.
    #[error("could not parse command catalog '{path}': {source}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;

    #[fixture]
    fn catalog_dir() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn write_catalog(dir: &TempDir, contents: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("rdm.json")).expect("utf8 path");
        fs::write(&path, contents).expect("write catalog");
        path
    }

    #[rstest]
    fn missing_file_yields_empty_catalog(catalog_dir: TempDir) {
        let path = Utf8PathBuf::from_path_buf(catalog_dir.path().join("absent.json"))
            .expect("utf8 path");
        let catalog = Catalog::load(&path).expect("missing file is not an error");
        assert!(catalog.is_empty());
    }

    #[rstest]
    fn resolves_relative_paths_against_catalog_directory(catalog_dir: TempDir) {
        let path = write_catalog(
            &catalog_dir,
            r#"{"commands":{"tests":{"executablePath":"bin/run-tests"},"abs":{"executablePath":"/usr/bin/true"}}}"#,
        );
        let catalog = Catalog::load(&path).expect("load catalog");

        let root = path.parent().expect("catalog parent");
        assert_eq!(
            catalog.get("tests").map(|entry| entry.executable_path.clone()),
            Some(root.join("bin/run-tests"))
        );
        assert_eq!(
            catalog.get("abs").map(|entry| entry.executable_path.as_str()),
            Some("/usr/bin/true")
        );
    }

    #[rstest]
    fn names_are_sorted(catalog_dir: TempDir) {
        let path = write_catalog(
            &catalog_dir,
            r#"{"commands":{"zeta":{"executablePath":"/z"},"alpha":{"executablePath":"/a"}}}"#,
        );
        let catalog = Catalog::load(&path).expect("load catalog");
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    }

    #[rstest]
    fn malformed_file_is_reported(catalog_dir: TempDir) {
        let path = write_catalog(&catalog_dir, "{not json");
        let error = Catalog::load(&path).expect_err("malformed catalog must fail");
        assert!(matches!(error, CatalogError::Parse { .. }));
    }

    #[test]
    fn commands_key_is_optional() {
        let catalog: Catalog = serde_json::from_str("{}").expect("parse empty object");
        assert!(catalog.is_empty());
    }
}
