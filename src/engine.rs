//! Proxy engine seam.
//!
//! The bridge never looks inside the engine: configuration semantics,
//! traffic routing, and protocol handling live behind these traits. The
//! manager drives the engine through exactly the operations the engine
//! contract exposes: construct (from a file or inline JSON), start, close,
//! running-check, and a static version.
//!
//! # Blocking Semantics
//!
//! `start` and `close` block on the caller's thread for as long as the
//! engine takes; no timeout is applied at this layer. The engine runs its
//! own internal concurrency once started, which is opaque here.

use crate::constants::{ENV_ASSET_DIR, ENV_CERT_DIR};
use crate::error::Result;
use std::path::{Path, PathBuf};

// =============================================================================
// Config Source
// =============================================================================

/// Where the engine configuration comes from.
///
/// Both forms carry JSON-encoded configuration; the engine owns its schema.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Path to a JSON config file on disk (load-then-build).
    File(PathBuf),
    /// Inline JSON config text (direct build).
    Inline(String),
}

impl ConfigSource {
    /// Creates a file-backed source.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// Creates an inline-text source.
    pub fn inline(json: impl Into<String>) -> Self {
        Self::Inline(json.into())
    }

    /// Short description of the source kind, for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Inline(_) => "inline text",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Inline(_) => write!(f, "inline config"),
        }
    }
}

// =============================================================================
// Engine Environment
// =============================================================================

/// Asset and certificate directories handed to the engine.
///
/// The engine contract defines two distinct keys; callers supply one
/// directory and it is applied to both. The directories travel two ways:
/// as explicit fields into [`EngineFactory::build`], and optionally into the
/// process environment via [`EngineEnv::apply`] for engines that only
/// resolve locations through it. Later applications overwrite earlier ones;
/// nothing is rolled back on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEnv {
    /// Directory holding geo data assets (geosite/geoip).
    pub asset_dir: PathBuf,
    /// Directory holding TLS certificates.
    pub cert_dir: PathBuf,
}

impl EngineEnv {
    /// Creates an environment pointing both directories at `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref().to_path_buf();
        Self {
            asset_dir: dir.clone(),
            cert_dir: dir,
        }
    }

    /// Writes both directories into the process environment.
    ///
    /// Always succeeds. The two values are process-global; the manager
    /// applies them under its lifecycle lock, which is sound only because a
    /// single manager owns engine startup in a given process.
    pub fn apply(&self) {
        std::env::set_var(ENV_ASSET_DIR, &self.asset_dir);
        std::env::set_var(ENV_CERT_DIR, &self.cert_dir);
    }
}

// =============================================================================
// Engine Traits
// =============================================================================

/// A constructed proxy engine instance.
///
/// Implementations wrap the actual proxy core (typically over FFI). The
/// manager is the only holder of a live instance.
pub trait ProxyEngine: Send {
    /// Starts traffic handling. Blocks until the engine is up or fails.
    fn start(&mut self) -> Result<()>;

    /// Shuts the engine down and releases its resources.
    ///
    /// Called at most once per instance; the manager drops the handle
    /// afterwards whether or not this succeeds.
    fn close(&mut self) -> Result<()>;

    /// Reports whether the engine is currently handling traffic.
    fn is_running(&self) -> bool;
}

/// Constructs engine instances and reports the engine version.
pub trait EngineFactory: Send + Sync {
    /// Builds an engine instance from `source`.
    ///
    /// The instance is constructed but not started. `env` carries the asset
    /// and certificate directories explicitly for engines that take them as
    /// configuration rather than reading the process environment.
    fn build(&self, source: &ConfigSource, env: &EngineEnv) -> Result<Box<dyn ProxyEngine>>;

    /// Static version identifier of the underlying engine.
    ///
    /// Independent of any instance; always callable.
    fn version(&self) -> String;
}
