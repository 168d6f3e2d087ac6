//! Store configuration with environment variable and file-based loading.
//!
//! Environment variables:
//! - `CASK_DIR`: root directory of a file-backed store
//! - `CASK_ALGORITHM`: digest algorithm name (`sha256`, `blake3`)
//!
//! Default root: `~/.cask`

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cask_crypto::DigestAlgorithm;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Environment variable naming the store root.
pub const ENV_DIR: &str = "CASK_DIR";

/// Environment variable naming the digest algorithm.
pub const ENV_ALGORITHM: &str = "CASK_ALGORITHM";

/// Directory name of the default root under the home directory.
pub const DEFAULT_DIR_NAME: &str = ".cask";

/// Which backend both databases of a data store use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local maps; nothing survives the process.
    Memory,
    /// One file per entry under the store root.
    #[default]
    File,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::File => "file",
        })
    }
}

impl FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(StoreError::Config(format!("unknown backend {other:?}"))),
        }
    }
}

/// Configuration for opening a [`DataStore`](crate::DataStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory. Ignored by the memory backend.
    pub root: PathBuf,

    #[serde(default)]
    pub backend: BackendKind,

    /// Digest used to derive content identifiers. Must not change over the
    /// life of a store.
    #[serde(default)]
    pub algorithm: DigestAlgorithm,
}

/// The `[store]` section as written; a missing `root` is resolved later.
#[derive(Debug, Deserialize)]
struct StoreSection {
    root: Option<PathBuf>,
    #[serde(default)]
    backend: BackendKind,
    #[serde(default)]
    algorithm: DigestAlgorithm,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            backend: BackendKind::default(),
            algorithm: DigestAlgorithm::default(),
        }
    }
}

/// The default root (`~/.cask`). Falls back to a relative `.cask` when no
/// home directory can be determined.
pub fn default_root() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(DEFAULT_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR_NAME))
}

/// Pick the root: `explicit`, then `env_value`, then [`default_root`].
///
/// An empty environment value counts as unset.
pub fn resolve_root_with(explicit: Option<PathBuf>, env_value: Option<OsString>) -> PathBuf {
    explicit
        .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(default_root)
}

/// Pick the root from `explicit`, then `CASK_DIR`, then `~/.cask`.
pub fn resolve_root(explicit: Option<PathBuf>) -> PathBuf {
    resolve_root_with(explicit, env::var_os(ENV_DIR))
}

impl StoreConfig {
    /// Build a file-backed config from the process environment.
    ///
    /// `explicit` wins over `CASK_DIR`; `CASK_ALGORITHM`, when set, must name
    /// a known algorithm.
    pub fn resolve(explicit: Option<PathBuf>) -> StoreResult<Self> {
        Self::with_root(resolve_root(explicit)).with_algorithm_override(env_algorithm().as_deref())
    }

    /// Load configuration from a TOML file.
    ///
    /// The file should contain a `[store]` section:
    /// ```toml
    /// [store]
    /// root = "/srv/cask"
    /// backend = "file"
    /// algorithm = "sha256"
    /// ```
    /// Without a `[store]` section the environment is used, as in
    /// [`StoreConfig::resolve`]. `CASK_ALGORITHM` overrides the file.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml(&contents)?;
        config.with_algorithm_override(env_algorithm().as_deref())
    }

    /// Parse the `[store]` section of a TOML document.
    ///
    /// A root set in the file wins; otherwise `CASK_DIR`, then `~/.cask`.
    /// The rest of the environment is ignored.
    pub fn from_toml(contents: &str) -> StoreResult<Self> {
        Self::from_toml_with(contents, env::var_os(ENV_DIR))
    }

    fn from_toml_with(contents: &str, env_dir: Option<OsString>) -> StoreResult<Self> {
        let table: toml::Table = contents
            .parse()
            .map_err(|e| StoreError::Config(format!("failed to parse TOML: {e}")))?;

        let section: StoreSection = match table.get("store") {
            Some(section) => section
                .clone()
                .try_into()
                .map_err(|e| StoreError::Config(format!("invalid [store] section: {e}")))?,
            None => StoreSection {
                root: None,
                backend: BackendKind::default(),
                algorithm: DigestAlgorithm::default(),
            },
        };
        Ok(Self {
            root: resolve_root_with(section.root, env_dir),
            backend: section.backend,
            algorithm: section.algorithm,
        })
    }

    /// Replace the algorithm with the one named by `name`, if any.
    pub fn with_algorithm_override(mut self, name: Option<&str>) -> StoreResult<Self> {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.algorithm = name.parse()?;
        }
        Ok(self)
    }

    /// A file-backed config rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// A memory-backed config.
    pub fn in_memory() -> Self {
        Self {
            backend: BackendKind::Memory,
            ..Self::default()
        }
    }
}

fn env_algorithm() -> Option<String> {
    env::var(ENV_ALGORITHM).ok()
}
