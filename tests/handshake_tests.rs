//! Tests for the handshake telemetry client.
//!
//! These exercise both sides of the contract against real sockets: the
//! success path against an in-process server speaking the fixed method, and
//! the failure stages (refused connections, malformed pre-encoded addresses,
//! deadline expiry against a listener that never speaks).

use corebridge::envelope::encode_text;
use corebridge::{Envelope, Error, HandshakeClient, LastHandshakeResponse, SessionHandshake};
use std::time::Duration;

// =============================================================================
// Test Endpoint
// =============================================================================

/// In-process server for the fixed telemetry method, hand-assembled in the
/// shape tonic emits for a unary service.
mod endpoint {
    use corebridge::LastHandshakeResponse;
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct LasthandshakeService {
        pub response: LastHandshakeResponse,
    }

    impl<B> Service<http::Request<B>> for LasthandshakeService
    where
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(
            &mut self,
            _cx: &mut Context<'_>,
        ) -> Poll<std::result::Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/xray.app.lasthandshake.command.LasthandshakeService/GetLastHandshake" => {
                    struct GetLastHandshakeSvc(LastHandshakeResponse);
                    impl tonic::server::UnaryService<()> for GetLastHandshakeSvc {
                        type Response = LastHandshakeResponse;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(&mut self, _request: tonic::Request<()>) -> Self::Future {
                            let response = self.0.clone();
                            Box::pin(async move { Ok(tonic::Response::new(response)) })
                        }
                    }
                    let response = self.response.clone();
                    Box::pin(async move {
                        let codec: tonic::codec::ProstCodec<LastHandshakeResponse, ()> =
                            tonic::codec::ProstCodec::default();
                        let mut grpc = tonic::server::Grpc::new(codec);
                        Ok(grpc.unary(GetLastHandshakeSvc(response), req).await)
                    })
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", tonic::Code::Unimplemented as i32)
                        .header("content-type", "application/grpc")
                        .body(empty_body())
                        .unwrap())
                }),
            }
        }
    }

    impl tonic::server::NamedService for LasthandshakeService {
        const NAME: &'static str = "xray.app.lasthandshake.command.LasthandshakeService";
    }
}

/// Serves `response` on an ephemeral loopback port.
async fn serve(
    response: LastHandshakeResponse,
) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let incoming = tonic::transport::server::TcpIncoming::from_listener(listener, true, None)
        .expect("incoming from listener");

    let server = tokio::spawn(async move {
        let _ = tonic::transport::Server::builder()
            .add_service(endpoint::LasthandshakeService { response })
            .serve_with_incoming(incoming)
            .await;
    });
    (addr, server)
}

// =============================================================================
// Success Path Tests
// =============================================================================

#[tokio::test]
async fn test_successful_query_returns_success_envelope() {
    let served = LastHandshakeResponse {
        sessions: vec![SessionHandshake {
            tag: "inbound-a".to_string(),
            last_handshake_unix: 1_700_000_000,
        }],
    };
    let (addr, server) = serve(served).await;

    let client = HandshakeClient::new();
    let encoded = client.query_envelope(&addr.to_string()).await;
    let envelope = Envelope::decode(&encoded).expect("valid envelope");

    assert_eq!(envelope.error, None, "success envelope carries no error");
    let value: serde_json::Value =
        serde_json::from_str(&envelope.data).expect("data is valid JSON");
    assert_eq!(value["sessions"][0]["tag"], "inbound-a");
    assert_eq!(value["sessions"][0]["lastHandshakeUnix"], 1_700_000_000_i64);

    server.abort();
}

#[tokio::test]
async fn test_successful_direct_query_returns_json() {
    let (addr, server) = serve(LastHandshakeResponse { sessions: vec![] }).await;

    let client = HandshakeClient::new();
    let json = client
        .query(&addr.to_string())
        .await
        .expect("query against a live endpoint should succeed");

    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert!(value["sessions"].is_array(), "got: {json}");

    server.abort();
}

// =============================================================================
// Connection Failure Tests
// =============================================================================

#[tokio::test]
async fn test_refused_connection_yields_connect_error_envelope() {
    // Nothing listens on port 1 for an unprivileged test run.
    let client = HandshakeClient::new();
    let encoded = client.query_envelope_encoded(&encode_text("127.0.0.1:1")).await;

    let envelope = Envelope::decode(&encoded).expect("client output is always a valid envelope");
    assert_eq!(envelope.data, "", "failed query carries no data");
    let message = envelope.error.expect("failed query carries an error");
    assert!(
        message.contains("failed to connect"),
        "connect stage prefix expected, got: {message}"
    );
}

#[tokio::test]
async fn test_refused_connection_direct_query_error_kind() {
    let client = HandshakeClient::new();
    let err = client
        .query("127.0.0.1:1")
        .await
        .expect_err("query against a closed port must fail");

    assert!(matches!(err, Error::Connect { .. }), "got: {err:?}");
}

// =============================================================================
// Address Decoding Tests
// =============================================================================

#[tokio::test]
async fn test_malformed_encoded_address_short_circuits() {
    let client = HandshakeClient::new();
    let encoded = client.query_envelope_encoded("%%% not base64 %%%").await;

    let envelope = Envelope::decode(&encoded).expect("valid envelope");
    assert_eq!(envelope.data, "");
    let message = envelope.error.expect("decode failure is reported");
    assert!(
        message.contains("failed to decode server address"),
        "got: {message}"
    );
}

#[tokio::test]
async fn test_well_formed_encoded_address_reaches_connect_stage() {
    let client = HandshakeClient::new();
    let encoded = client.query_envelope_encoded(&encode_text("127.0.0.1:1")).await;

    let envelope = Envelope::decode(&encoded).expect("valid envelope");
    let message = envelope.error.expect("refused connection is reported");
    assert!(
        !message.contains("failed to decode server address"),
        "a valid encoding must not be reported as a decode failure: {message}"
    );
}

// =============================================================================
// Deadline Tests
// =============================================================================

#[tokio::test]
async fn test_silent_endpoint_hits_deadline() {
    // A listener that accepts and then says nothing: the HTTP/2 handshake
    // never completes, so the bounded deadline is the only way out.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let hold = tokio::spawn(async move {
        let _conn = listener.accept().await;
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    let client = HandshakeClient::new().with_timeout(Duration::from_millis(300));
    let encoded = client.query_envelope(&addr.to_string()).await;

    let envelope = Envelope::decode(&encoded).expect("valid envelope");
    assert_eq!(envelope.data, "", "deadline expiry carries no data");
    let message = envelope.error.expect("deadline expiry is reported");
    assert!(
        message.contains("deadline exceeded"),
        "expected deadline failure, got: {message}"
    );

    hold.abort();
}

// =============================================================================
// Response Rendering Tests
// =============================================================================

#[test]
fn test_response_renders_to_json_with_field_names() {
    let response = LastHandshakeResponse {
        sessions: vec![
            SessionHandshake {
                tag: "inbound-a".to_string(),
                last_handshake_unix: 1_700_000_000,
            },
            SessionHandshake {
                tag: "inbound-b".to_string(),
                last_handshake_unix: 1_700_000_060,
            },
        ],
    };

    let json = serde_json::to_string(&response).expect("render to JSON");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

    assert_eq!(value["sessions"][0]["tag"], "inbound-a");
    assert_eq!(value["sessions"][0]["lastHandshakeUnix"], 1_700_000_000_i64);
    assert_eq!(value["sessions"][1]["lastHandshakeUnix"], 1_700_000_060_i64);
}
