// crates/backdrop-runtime/src/http.rs
// ============================================================================
// Module: Backdrop HTTP Client
// Description: Blocking HTTP client and the remote store client over it.
// Purpose: Serve api.request actions and the remote store backend.
// Dependencies: backdrop-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! The executor and the remote store backend speak HTTP only through the
//! injected [`HttpClient`] contract. This module provides the production
//! implementation over `reqwest`'s blocking client (explicit timeout,
//! redirects disabled, JSON payloads) and [`HttpRemoteClient`], which
//! adapts any [`HttpClient`] to the remote store's pull/push endpoints.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use backdrop_core::BackendError;
use backdrop_core::BackendState;
use backdrop_core::Change;
use backdrop_core::HttpClient;
use backdrop_core::HttpMethod;
use backdrop_core::HttpRequest;
use backdrop_core::HttpResponse;
use backdrop_core::KeyPath;
use backdrop_core::RemoteStoreClient;
use backdrop_core::ScenarioId;
use backdrop_core::StoreValue;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde_json::Value;
use url::Url;

// ============================================================================
// SECTION: Client Configuration
// ============================================================================

/// Configuration for the blocking HTTP client.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClientConfig {
    /// Base URL joined with relative request endpoints.
    pub base_url: Option<Url>,
    /// Default request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent for outbound requests.
    pub user_agent: String,
}

impl Default for ReqwestHttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 10_000,
            user_agent: "backdrop/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Reqwest Client
// ============================================================================

/// Blocking HTTP client over `reqwest`.
pub struct ReqwestHttpClient {
    /// Client configuration.
    config: ReqwestHttpClientConfig,
    /// Underlying blocking client.
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] when the underlying client cannot
    /// be constructed.
    pub fn new(config: ReqwestHttpClientConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Resolves an endpoint against the configured base URL.
    fn resolve_url(&self, endpoint: &str) -> Result<Url, BackendError> {
        if let Ok(url) = Url::parse(endpoint) {
            return Ok(url);
        }
        let Some(base) = &self.config.base_url else {
            return Err(BackendError::Transport(format!(
                "relative endpoint without a base url: {endpoint}"
            )));
        };
        base.join(endpoint).map_err(|err| BackendError::Transport(err.to_string()))
    }
}

impl HttpClient for ReqwestHttpClient {
    fn request(&self, request: HttpRequest) -> Result<HttpResponse, BackendError> {
        let url = self.resolve_url(&request.url)?;
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        };
        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.header("content-type", "application/json").body(body.to_string());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        let response = builder.send().map_err(|err| {
            if err.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Transport(err.to_string())
            }
        })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(HttpResponse {
            status,
            body,
        })
    }
}

// ============================================================================
// SECTION: Remote Store Client
// ============================================================================

/// Remote store client over an injected HTTP client.
pub struct HttpRemoteClient {
    /// HTTP transport.
    http: Arc<dyn HttpClient>,
    /// Remote service base URL.
    base_url: Url,
}

impl HttpRemoteClient {
    /// Creates a remote client.
    #[must_use]
    pub const fn new(http: Arc<dyn HttpClient>, base_url: Url) -> Self {
        Self {
            http,
            base_url,
        }
    }

    /// Builds the store endpoint for a namespace and optional scenario.
    fn endpoint(
        &self,
        namespace: &str,
        scenario_id: Option<&ScenarioId>,
    ) -> Result<Url, BackendError> {
        let path = scenario_id.map_or_else(
            || format!("api/store/{namespace}"),
            |scenario| format!("api/store/{namespace}/{scenario}"),
        );
        self.base_url.join(&path).map_err(|err| BackendError::Transport(err.to_string()))
    }
}

impl RemoteStoreClient for HttpRemoteClient {
    fn pull(
        &self,
        namespace: &str,
        scenario_id: Option<&ScenarioId>,
    ) -> Result<BackendState, BackendError> {
        let url = self.endpoint(namespace, scenario_id)?;
        let response = self.http.request(HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        })?;
        if !response.is_success() {
            return Err(BackendError::Http(response.status));
        }
        let payload: Value = serde_json::from_str(&response.body)
            .map_err(|err| BackendError::Decode(err.to_string()))?;
        let Value::Object(map) = payload else {
            return Err(BackendError::Decode("remote state must be an object".to_string()));
        };
        let mut state = BackendState::new();
        for (key, item) in map {
            let value = StoreValue::from_tagged(&item)
                .map_err(|err| BackendError::Decode(err.to_string()))?;
            state.insert(KeyPath::new(key), value);
        }
        Ok(state)
    }

    fn push(
        &self,
        namespace: &str,
        scenario_id: Option<&ScenarioId>,
        changes: &[Change],
    ) -> Result<(), BackendError> {
        let url = self.endpoint(namespace, scenario_id)?;
        let body =
            serde_json::to_value(changes).map_err(|err| BackendError::Decode(err.to_string()))?;
        let response = self.http.request(HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers: Vec::new(),
            body: Some(body),
            timeout: None,
        })?;
        if !response.is_success() {
            return Err(BackendError::Http(response.status));
        }
        Ok(())
    }
}
