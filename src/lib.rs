//! # corebridge
//!
//! **Control and telemetry bridge for an embedded network proxy engine**
//!
//! This crate sits between a host environment and a long-running proxy
//! engine the host cannot call directly. It exposes three things: lifecycle
//! control over a single engine instance, a bounded telemetry query against
//! a running instance's RPC endpoint, and an opaque-string envelope for
//! hosts whose boundary carries nothing but printable text.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           corebridge                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────────────┐  ┌─────────────────────────────┐ │
//! │  │      EngineManager        │  │      HandshakeClient        │ │
//! │  │  start / stop /           │  │  one unary gRPC call,       │ │
//! │  │  is_running / version     │  │  5s deadline, no retries    │ │
//! │  │  (value + error results)  │  │  (envelope results)         │ │
//! │  └────────────┬──────────────┘  └──────────────┬──────────────┘ │
//! │               │ ProxyEngine / EngineFactory    │ host:port      │
//! │               ▼                                ▼                │
//! │  ┌───────────────────────────┐  ┌─────────────────────────────┐ │
//! │  │   proxy engine (opaque)   │  │  engine RPC endpoint        │ │
//! │  └───────────────────────────┘  └─────────────────────────────┘ │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  envelope: base64(JSON {data, error?})   bridge: blocking shim  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Instance Lifecycle
//!
//! ```text
//!   ┌────────┐   start    ┌─────────┐   stop    ┌────────┐
//!   │ Absent │ ─────────► │ Running │ ────────► │ Absent │
//!   └────────┘            └─────────┘           └────────┘
//! ```
//!
//! One instance at a time. The handle is published only after a successful
//! start; a second `start` without an intervening `stop` fails fast instead
//! of leaking the previous instance. `is_running` and `version` are defined
//! at every point in the lifecycle.
//!
//! # Two Caller Conventions
//!
//! Lifecycle operations return `Result` (the host receives a value plus an
//! error). The telemetry query returns a single opaque envelope string and
//! never raises, because its hosts cannot receive errors at all. Internally
//! everything is one [`Result`] type; the flattening happens only at the
//! [`bridge`] and envelope surfaces.
//!
//! # Example
//!
//! ```rust,ignore
//! use corebridge::{EngineManager, HandshakeClient};
//! use std::sync::Arc;
//!
//! let manager = EngineManager::new(Arc::new(MyEngineFactory));
//! manager.start_from_file("/var/lib/proxy", "/etc/proxy/config.json")?;
//! assert!(manager.is_running());
//!
//! // Telemetry, against any reachable endpoint:
//! let client = HandshakeClient::new();
//! let envelope = client.query_envelope("127.0.0.1:8080").await;
//!
//! manager.stop()?;
//! ```

pub mod bridge;
pub mod constants;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod handshake;
pub mod manager;
pub mod memory;

// Re-exports
pub use engine::{ConfigSource, EngineEnv, EngineFactory, ProxyEngine};
pub use envelope::Envelope;
pub use error::{Error, Result};
pub use handshake::{HandshakeClient, LastHandshakeResponse, SessionHandshake};
pub use manager::EngineManager;
pub use memory::{MallocTrim, MemoryReclaimer, NoopReclaimer};
