//! Error types for the bridge layer.

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the bridge layer.
///
/// Message prefixes are stable: hosts on the far side of the string
/// boundary diagnose failures by matching on them, so changing a prefix
/// is a breaking change.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Lifecycle Errors
    // =========================================================================
    /// An engine instance is already running; stop it before starting another.
    #[error("engine already running")]
    AlreadyRunning,

    /// Configuration could not be loaded or parsed.
    #[error("failed to load config from {source_kind}: {reason}")]
    ConfigLoad { source_kind: String, reason: String },

    /// Engine construction failed.
    #[error("failed to build engine instance: {0}")]
    EngineBuild(String),

    /// Engine start failed.
    #[error("failed to start engine: {0}")]
    StartFailed(String),

    /// Engine close failed. The handle is cleared regardless.
    #[error("failed to close engine: {0}")]
    CloseFailed(String),

    // =========================================================================
    // Telemetry Query Errors
    // =========================================================================
    /// A pre-encoded server address could not be decoded.
    #[error("failed to decode server address: {0}")]
    AddressDecode(String),

    /// The RPC channel could not be established.
    #[error("failed to connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },

    /// The engine rejected or failed the RPC call.
    #[error("RPC call failed: {0}")]
    Rpc(String),

    /// The RPC response could not be rendered to text.
    #[error("failed to marshal response: {0}")]
    MarshalResponse(String),

    // =========================================================================
    // Envelope Errors
    // =========================================================================
    /// An encoded envelope could not be decoded.
    #[error("failed to decode envelope: {0}")]
    EnvelopeDecode(String),

    // =========================================================================
    // Boundary Errors
    // =========================================================================
    /// The blocking bridge could not build an executor for the query.
    #[error("failed to build query runtime: {0}")]
    Runtime(String),
}
