//! Bridge constants: timeouts, environment keys, and the telemetry method path.
//!
//! These are the single source of truth for the wire contract between the
//! bridge and the engine. The method path and the environment keys belong to
//! the engine's own contract and must not be renamed here.

use std::time::Duration;

// =============================================================================
// Engine Environment Keys
// =============================================================================

/// Process environment key for the geo asset directory (geosite/geoip data).
///
/// Set by [`crate::engine::EngineEnv::apply`] before engine construction.
/// Engines that resolve assets through the process environment read this key.
pub const ENV_ASSET_DIR: &str = "proxy.location.asset";

/// Process environment key for the TLS certificate directory.
///
/// Always set to the same directory as [`ENV_ASSET_DIR`]; the engine contract
/// uses two distinct keys even when both point at one directory.
pub const ENV_CERT_DIR: &str = "proxy.location.cert";

// =============================================================================
// Telemetry RPC
// =============================================================================

/// Fully-qualified gRPC method for the last-handshake telemetry query.
///
/// The service and method names are fixed by the engine's service contract.
pub const LAST_HANDSHAKE_METHOD: &str =
    "/xray.app.lasthandshake.command.LasthandshakeService/GetLastHandshake";

/// Deadline for a single telemetry query (5 seconds).
///
/// Covers connect and invoke together, measured from invocation. On expiry
/// the connection attempt or in-flight call is abandoned and reported as a
/// stage failure. Lifecycle operations carry no timeout; only the query does.
pub const HANDSHAKE_QUERY_TIMEOUT: Duration = Duration::from_secs(5);
