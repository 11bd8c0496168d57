//! Opaque-string result envelope.
//!
//! Some hosts embedding the bridge cannot receive a native `(value, error)`
//! pair or a thrown error; the only thing that crosses the boundary is one
//! printable string. The envelope flattens a result into that string.
//!
//! # Wire Format
//!
//! A JSON record, then base64 (standard alphabet) so the payload survives
//! boundaries that only accept printable text:
//!
//! ```text
//! success:  base64({"data":"<payload>"})
//! failure:  base64({"data":"","error":"<message>"})
//! ```
//!
//! The `error` key is omitted entirely on success, never emitted empty.
//! Consumers treat absence of `error` as success regardless of whether
//! `data` is empty. On failure `data` is always empty: errors and partial
//! data are never mixed in one envelope.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Cross-boundary result wrapper.
///
/// Constructed fresh per call, immediately serialized, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Result payload. Empty on failure.
    pub data: String,
    /// Failure message. Omitted from the wire form on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// Creates a success envelope carrying `data`.
    #[must_use]
    pub fn success(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            error: None,
        }
    }

    /// Creates a failure envelope from an error message.
    ///
    /// `data` is always empty on failure; whatever payload the caller had is
    /// discarded rather than mixed with the error.
    #[must_use]
    pub fn failure(err: impl std::fmt::Display) -> Self {
        Self {
            data: String::new(),
            error: Some(err.to_string()),
        }
    }

    /// Flattens a bridge result into an envelope.
    #[must_use]
    pub fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(err) => Self::failure(err),
        }
    }

    /// Returns true if the envelope carries no error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Encodes the envelope to its transport-safe string form.
    ///
    /// This path is the error-reporting mechanism itself, so it cannot raise.
    /// If JSON serialization of the record fails, the fallback is a
    /// hand-assembled failure envelope whose message carries the
    /// `failed to encode envelope` prefix, so the condition stays detectable
    /// instead of looking like an empty success.
    #[must_use]
    pub fn encode(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({
                "data": "",
                "error": format!("failed to encode envelope: {e}"),
            })
            .to_string()
        });
        STANDARD.encode(json)
    }

    /// Decodes an envelope from its transport-safe string form.
    ///
    /// Exact inverse of [`Envelope::encode`].
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::EnvelopeDecode(format!("invalid base64: {e}")))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::EnvelopeDecode(format!("invalid record: {e}")))
    }
}

/// Encodes a literal string to its transport-safe form.
///
/// Hosts use this to pre-encode the server address they hand to
/// [`crate::bridge::query_last_handshake`].
#[must_use]
pub fn encode_text(text: &str) -> String {
    STANDARD.encode(text)
}

/// Decodes a transport-safe string back to the literal it encodes.
///
/// Used to recover a pre-encoded server address before any connection
/// attempt is made.
pub fn decode_text(encoded: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::AddressDecode(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|e| Error::AddressDecode(format!("invalid utf-8: {e}")))
}
