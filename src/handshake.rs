//! Handshake telemetry query client.
//!
//! Asks a running engine's RPC endpoint for per-session handshake freshness.
//! Each query is a fresh connect-invoke-disconnect cycle against one fixed
//! unary method:
//!
//! ```text
//! /xray.app.lasthandshake.command.LasthandshakeService/GetLastHandshake
//! ```
//!
//! The channel is plaintext and unauthenticated; the endpoint is assumed to
//! be loopback or otherwise trusted. The whole cycle runs under a 5-second
//! deadline, after which the attempt is abandoned and reported as a stage
//! failure. No retries, no pooling, no caching: the query is infrequent,
//! idempotent, and cheap, so each call stands alone.
//!
//! The client is independent of [`crate::manager::EngineManager`]: it works
//! against any reachable endpoint, not only a locally started instance, and
//! takes no lock.

use crate::constants::{HANDSHAKE_QUERY_TIMEOUT, LAST_HANDSHAKE_METHOD};
use crate::envelope::{self, Envelope};
use crate::error::{Error, Result};
use serde::Serialize;
use std::time::Duration;
use tokio::time::{Instant, timeout_at};
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Endpoint;
use tracing::debug;

// =============================================================================
// Wire Messages
// =============================================================================

/// Telemetry response from the engine's last-handshake service.
///
/// The schema belongs to the engine's service contract; it is pinned here
/// only so the bridge can decode the message and render it to JSON without
/// losing field names or values.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastHandshakeResponse {
    /// Freshness entries, one per tracked session.
    #[prost(message, repeated, tag = "1")]
    pub sessions: Vec<SessionHandshake>,
}

/// Handshake freshness for a single session.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandshake {
    /// Session tag assigned by the engine.
    #[prost(string, tag = "1")]
    pub tag: String,
    /// Unix timestamp of the session's most recent handshake.
    #[prost(int64, tag = "2")]
    pub last_handshake_unix: i64,
}

// =============================================================================
// Client
// =============================================================================

/// Short-lived client for the last-handshake query.
///
/// Cheap to construct and clone; holds no connection state.
#[derive(Debug, Clone)]
pub struct HandshakeClient {
    /// Deadline covering connect and invoke together.
    timeout: Duration,
}

impl Default for HandshakeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HandshakeClient {
    /// Creates a client with the standard 5-second query deadline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: HANDSHAKE_QUERY_TIMEOUT,
        }
    }

    /// Overrides the query deadline. Intended for tests.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Queries `server` (a `host:port` address) and returns the response
    /// rendered as JSON.
    ///
    /// # Errors
    ///
    /// [`Error::Connect`] if the channel cannot be established,
    /// [`Error::Rpc`] if the call fails or the deadline elapses mid-call,
    /// [`Error::MarshalResponse`] if the response cannot be rendered.
    pub async fn query(&self, server: &str) -> Result<String> {
        let deadline = Instant::now() + self.timeout;
        debug!("Querying last handshake at {server}");

        let endpoint =
            Endpoint::from_shared(format!("http://{server}")).map_err(|e| Error::Connect {
                addr: server.to_string(),
                reason: e.to_string(),
            })?;

        let channel = match timeout_at(deadline, endpoint.connect()).await {
            Ok(Ok(channel)) => channel,
            Ok(Err(e)) => {
                return Err(Error::Connect {
                    addr: server.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(Error::Connect {
                    addr: server.to_string(),
                    reason: "deadline exceeded".to_string(),
                });
            }
        };

        let mut grpc = Grpc::new(channel);
        match timeout_at(deadline, grpc.ready()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(Error::Rpc(e.to_string())),
            Err(_) => return Err(Error::Rpc("deadline exceeded".to_string())),
        }

        let codec: ProstCodec<(), LastHandshakeResponse> = ProstCodec::default();
        let path = PathAndQuery::from_static(LAST_HANDSHAKE_METHOD);
        let request = tonic::Request::new(());

        let response = match timeout_at(deadline, grpc.unary(request, path, codec)).await {
            Ok(Ok(response)) => response.into_inner(),
            Ok(Err(status)) => return Err(Error::Rpc(status.to_string())),
            Err(_) => return Err(Error::Rpc("deadline exceeded".to_string())),
        };

        debug!("Last handshake query returned {} sessions", response.sessions.len());
        serde_json::to_string(&response).map_err(|e| Error::MarshalResponse(e.to_string()))
    }

    /// Queries `server` and flattens the result into an encoded envelope.
    ///
    /// Never raises; connection, call, and marshal failures each come back
    /// as an error envelope with a stage-identifying message prefix.
    pub async fn query_envelope(&self, server: &str) -> String {
        Envelope::from_result(self.query(server).await).encode()
    }

    /// Like [`HandshakeClient::query_envelope`], but the address arrives in
    /// its transport-safe (base64) form.
    ///
    /// A decode failure short-circuits to an error envelope without any
    /// connection attempt.
    pub async fn query_envelope_encoded(&self, encoded_server: &str) -> String {
        match envelope::decode_text(encoded_server) {
            Ok(server) => self.query_envelope(&server).await,
            Err(e) => Envelope::failure(e).encode(),
        }
    }
}
