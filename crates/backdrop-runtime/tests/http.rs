// crates/backdrop-runtime/tests/http.rs
// ============================================================================
// Module: HTTP Client Tests
// Description: Loopback tests for the blocking client and remote store client.
// Purpose: Validate request shaping, status mapping, and the pull/push wire.
// Dependencies: backdrop-core, backdrop-runtime, serde_json, tiny_http
// ============================================================================
//! ## Overview
//! Spins up a loopback HTTP server, then drives the production client and
//! the remote store client against it: headers and bodies arrive as sent,
//! non-2xx pulls map to HTTP error kinds, and pushed change batches decode
//! on the server side.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::thread;

use backdrop_core::BackendError;
use backdrop_core::Change;
use backdrop_core::HttpClient;
use backdrop_core::HttpMethod;
use backdrop_core::HttpRequest;
use backdrop_core::KeyPath;
use backdrop_core::Patch;
use backdrop_core::RemoteStoreClient;
use backdrop_core::Scope;
use backdrop_core::StoreValue;
use backdrop_runtime::HttpRemoteClient;
use backdrop_runtime::ReqwestHttpClient;
use backdrop_runtime::ReqwestHttpClientConfig;
use tiny_http::Response;
use tiny_http::Server;
use url::Url;

/// Starts a loopback server answering `count` requests with one response.
fn serve(count: usize, status: u16, body: &'static str) -> (Url, thread::JoinHandle<Vec<String>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let base = Url::parse(&format!("http://{addr}/")).unwrap();
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for _ in 0..count {
            let mut request = server.recv().unwrap();
            let mut received = String::new();
            let _ = std::io::Read::read_to_string(request.as_reader(), &mut received);
            seen.push(format!("{} {} {}", request.method(), request.url(), received));
            let response = Response::from_string(body).with_status_code(status);
            request.respond(response).unwrap();
        }
        seen
    });
    (base, handle)
}

/// Verifies the blocking client shapes requests and reads responses.
#[test]
fn reqwest_client_roundtrips_requests() {
    let (base, handle) = serve(1, 200, r#"{"ok":true}"#);
    let client = ReqwestHttpClient::new(ReqwestHttpClientConfig {
        base_url: Some(base),
        ..ReqwestHttpClientConfig::default()
    })
    .unwrap();

    let response = client
        .request(HttpRequest {
            method: HttpMethod::Post,
            url: "echo".to_string(),
            headers: vec![("x-trace".to_string(), "t1".to_string())],
            body: Some(serde_json::json!({"n": 1})),
            timeout: None,
        })
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"{"ok":true}"#);

    let seen = handle.join().unwrap();
    assert!(seen[0].starts_with("POST /echo"));
    assert!(seen[0].contains(r#"{"n":1}"#));
}

/// Verifies relative endpoints require a base URL.
#[test]
fn relative_endpoint_without_base_is_a_transport_error() {
    let client = ReqwestHttpClient::new(ReqwestHttpClientConfig::default()).unwrap();
    let outcome = client.request(HttpRequest {
        method: HttpMethod::Get,
        url: "no-base".to_string(),
        headers: Vec::new(),
        body: None,
        timeout: None,
    });
    assert!(matches!(outcome, Err(BackendError::Transport(_))));
}

/// Verifies pull decodes tagged state and push posts change batches.
#[test]
fn remote_client_pulls_and_pushes() {
    let (base, handle) =
        serve(2, 200, r#"{"user.name": {"type": "string", "value": "Ada"}}"#);
    let http = Arc::new(
        ReqwestHttpClient::new(ReqwestHttpClientConfig {
            base_url: Some(base.clone()),
            ..ReqwestHttpClientConfig::default()
        })
        .unwrap(),
    );
    let remote = HttpRemoteClient::new(http, base);

    let state = remote.pull("profiles", None).unwrap();
    assert_eq!(
        state.get(&KeyPath::new("user.name")),
        Some(&StoreValue::String("Ada".to_string()))
    );

    let change = Change::single(
        vec![Patch::set(KeyPath::new("user.name"), None, StoreValue::String("Grace".to_string()))],
        Scope::App,
    );
    remote.push("profiles", Some(&"s1".into()), &[change]).unwrap();

    let seen = handle.join().unwrap();
    assert!(seen[0].starts_with("GET /api/store/profiles"));
    assert!(seen[1].starts_with("POST /api/store/profiles/s1"));
    assert!(seen[1].contains("user.name"));
}

/// Verifies non-2xx pulls surface the HTTP error kind.
#[test]
fn remote_pull_maps_status_errors() {
    let (base, handle) = serve(1, 404, "missing");
    let http = Arc::new(
        ReqwestHttpClient::new(ReqwestHttpClientConfig {
            base_url: Some(base.clone()),
            ..ReqwestHttpClientConfig::default()
        })
        .unwrap(),
    );
    let remote = HttpRemoteClient::new(http, base);

    assert!(matches!(remote.pull("ghost", None), Err(BackendError::Http(404))));
    handle.join().unwrap();
}
