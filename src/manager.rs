//! Engine instance lifecycle manager.
//!
//! Owns the single live engine instance and its transitions:
//!
//! ```text
//!   ┌────────┐   start    ┌─────────┐
//!   │ Absent │ ─────────► │ Running │
//!   └────────┘            └────┬────┘
//!        ▲                     │ stop
//!        └─────────────────────┘
//! ```
//!
//! No transient state is observable: `start` and `stop` look atomic to
//! callers even though each performs several engine calls internally.
//!
//! # Invariants
//!
//! - At most one engine handle exists per manager at any time.
//! - The handle is published only after a successful start; a failed start
//!   closes and discards the partially constructed instance.
//! - `start` while an instance is present fails fast with
//!   [`Error::AlreadyRunning`] rather than silently replacing (and leaking)
//!   the previous handle.
//! - `stop` clears the handle whether or not the engine's close succeeds.
//!
//! All lifecycle operations serialize through one internal lock, so
//! concurrent callers see a well-defined ordering. The telemetry client
//! ([`crate::handshake`]) takes no dependency on the handle and stays
//! lock-free.

use crate::engine::{ConfigSource, EngineEnv, EngineFactory, ProxyEngine};
use crate::error::{Error, Result};
use crate::memory::{MallocTrim, MemoryReclaimer};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Owns the process's single proxy engine instance.
///
/// Constructed once by the host and shared by reference; there is no global
/// state. `is_running` and `version` are safe to call at any point,
/// including before the first `start` and after `stop`.
pub struct EngineManager {
    factory: Arc<dyn EngineFactory>,
    reclaimer: Box<dyn MemoryReclaimer>,
    /// The one live handle. `None` in the `Absent` state.
    handle: Mutex<Option<Box<dyn ProxyEngine>>>,
}

impl EngineManager {
    /// Creates a manager driving engines from `factory`.
    ///
    /// Uses the default [`MallocTrim`] reclamation hooks.
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self::with_reclaimer(factory, Box::new(MallocTrim))
    }

    /// Creates a manager with explicit memory reclamation hooks.
    pub fn with_reclaimer(
        factory: Arc<dyn EngineFactory>,
        reclaimer: Box<dyn MemoryReclaimer>,
    ) -> Self {
        Self {
            factory,
            reclaimer,
            handle: Mutex::new(None),
        }
    }

    /// Starts an engine instance from a config file path.
    ///
    /// `data_dir` is the directory holding geo assets and certificates.
    pub fn start_from_file(&self, data_dir: impl AsRef<Path>, config: impl AsRef<Path>) -> Result<()> {
        self.start(data_dir, ConfigSource::file(config))
    }

    /// Starts an engine instance from inline JSON config text.
    pub fn start_from_json(&self, data_dir: impl AsRef<Path>, json: impl Into<String>) -> Result<()> {
        self.start(data_dir, ConfigSource::inline(json))
    }

    /// Starts an engine instance.
    ///
    /// Sequence: apply the engine environment, prime reclamation, construct
    /// the engine from `source`, start it, then run a forced reclamation
    /// pass. The handle is stored only once the engine reports a successful
    /// start; on a start failure the instance is closed best-effort and
    /// discarded, leaving the manager in the `Absent` state.
    ///
    /// # Errors
    ///
    /// [`Error::AlreadyRunning`] if an instance is present, or the
    /// construction/start failure from the engine.
    pub fn start(&self, data_dir: impl AsRef<Path>, source: ConfigSource) -> Result<()> {
        let mut guard = self.lock_handle();
        if guard.is_some() {
            return Err(Error::AlreadyRunning);
        }

        let env = EngineEnv::new(data_dir);
        env.apply();
        self.reclaimer.prime();

        debug!("Building engine instance from {source}");
        let mut engine = self.factory.build(&source, &env)?;

        if let Err(e) = engine.start() {
            // Never publish a constructed-but-unstarted instance.
            if let Err(close_err) = engine.close() {
                warn!("Discarding unstarted engine, close failed: {close_err}");
            }
            return Err(e);
        }

        *guard = Some(engine);
        self.reclaimer.reclaim();
        info!("Engine started (version {})", self.factory.version());
        Ok(())
    }

    /// Stops the running instance, if any.
    ///
    /// The handle is cleared regardless of the close outcome; the close
    /// error, if any, is returned. With no instance present this is a no-op
    /// success.
    pub fn stop(&self) -> Result<()> {
        let mut guard = self.lock_handle();
        match guard.take() {
            Some(mut engine) => {
                let result = engine.close();
                match &result {
                    Ok(()) => info!("Engine stopped"),
                    Err(e) => warn!("Engine close failed (handle cleared anyway): {e}"),
                }
                result
            }
            None => {
                debug!("Stop with no engine present, nothing to do");
                Ok(())
            }
        }
    }

    /// Reports whether an engine instance is currently running.
    ///
    /// Delegates to the engine's own running-check; `false` when no instance
    /// was ever started or after `stop`.
    pub fn is_running(&self) -> bool {
        self.lock_handle()
            .as_ref()
            .map(|engine| engine.is_running())
            .unwrap_or(false)
    }

    /// Static version identifier of the underlying engine.
    ///
    /// Independent of instance state; always callable. Takes the lifecycle
    /// lock like every other operation, so callers observe one total order.
    pub fn version(&self) -> String {
        let _guard = self.lock_handle();
        self.factory.version()
    }

    /// Acquires the handle lock, recovering from a poisoned mutex.
    ///
    /// A panic in one lifecycle call must not wedge the manager forever;
    /// the handle itself stays consistent because every mutation completes
    /// before the guard drops.
    fn lock_handle(&self) -> std::sync::MutexGuard<'_, Option<Box<dyn ProxyEngine>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EngineManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineManager")
            .field("version", &self.factory.version())
            .field("running", &self.is_running())
            .finish()
    }
}
