//! Blocking boundary adapter.
//!
//! The outermost binding surface for hosts that cannot drive an async
//! runtime and cannot receive a native error: one printable string in, one
//! printable string out. Everything inside the crate uses [`crate::Result`];
//! this module is where that result gets flattened to the envelope
//! convention. Lifecycle operations keep the value-plus-error convention
//! ([`crate::manager::EngineManager`] returns `Result` directly), so the two
//! caller contracts meet only here.

use crate::envelope::Envelope;
use crate::error::Error;
use crate::handshake::HandshakeClient;
use tracing::debug;

/// Queries the last-handshake telemetry of the engine at a pre-encoded
/// (base64) `host:port` address, blocking until the result or the 5-second
/// deadline.
///
/// Always returns an encoded envelope. A runtime construction failure is
/// itself reported through the envelope rather than raised.
#[must_use]
pub fn query_last_handshake(encoded_server: &str) -> String {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => return Envelope::failure(Error::Runtime(e.to_string())).encode(),
    };

    debug!("Blocking last-handshake query");
    let client = HandshakeClient::new();
    runtime.block_on(client.query_envelope_encoded(encoded_server))
}
