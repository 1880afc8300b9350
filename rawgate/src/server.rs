use crate::{
    config::ProxyConfig,
    error::{Error, Result},
    home::{HOME_PAGE, HOME_PAGE_CONTENT_TYPE, RandomSource, RootAction, ThreadRandom, root_action},
    request::{query_token, resolve_request},
};
use axum::{
    Router,
    body::{Body, HttpBody},
    extract::State,
    http::{
        HeaderMap, HeaderName, Method, StatusCode, Uri,
        header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HOST, LOCATION},
    },
    response::{IntoResponse, Response},
    routing::any,
};
use std::sync::Arc;

/// Reverse proxy in front of the raw-content origin.
///
/// Holds a read-only configuration snapshot and a shared HTTP client; cloning
/// is cheap and every request is handled independently.
#[derive(Clone)]
pub struct RawProxyServer {
    config: Arc<ProxyConfig>,
    client: reqwest::Client,
    random: Arc<dyn RandomSource>,
}

impl RawProxyServer {
    /// Create a new proxy server builder.
    pub fn builder() -> RawProxyServerBuilder {
        RawProxyServerBuilder::default()
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Create the axum router: `/` goes to the home handler, every other path
    /// and method is proxied.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", any(handle_root))
            .fallback(handle_proxy)
            .with_state(self.clone())
    }
}

/// Proxy a file request to the origin with the resolved credential attached.
async fn handle_proxy(
    State(server): State<RawProxyServer>,
    method: Method,
    uri: Uri,
) -> Result<Response> {
    let path = uri.path();
    tracing::info!("proxying request: {} {}", method, path);

    let token = query_token(uri.query());
    let resolved = resolve_request(&server.config, path, token.as_deref()).map_err(|e| {
        tracing::warn!("rejected request for {}: {}", path, e);
        Error::from(e)
    })?;

    tracing::debug!(
        target_url = %resolved.target_url,
        credential = ?resolved.credential_origin,
        "resolved upstream request"
    );

    let request = server
        .client
        .request(method, &resolved.target_url)
        .header(AUTHORIZATION, format!("token {}", resolved.credential));

    let response = request.send().await.map_err(|e| {
        tracing::error!("upstream request to {} failed: {}", resolved.target_url, e);
        Error::Network(e.to_string())
    })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("upstream returned {} for {}", status, resolved.target_url);
        return Err(Error::UpstreamStatus {
            status,
            message: server.config.error_message().to_string(),
        });
    }

    relay(response)
}

/// Handle the bare root path: redirect, fetch from the origin pool, or serve
/// the decorative page.
async fn handle_root(
    State(server): State<RawProxyServer>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Result<Response> {
    match root_action(&server.config, server.random.as_ref()) {
        RootAction::Redirect(url) => {
            tracing::info!("redirecting root request to {}", url);
            Ok((StatusCode::FOUND, [(LOCATION, url)]).into_response())
        }
        RootAction::Fetch(url) => {
            tracing::info!("fetching root request from {}", url);
            fetch_passthrough(&server.client, method, &url, headers, body).await
        }
        RootAction::Page => Ok(([(CONTENT_TYPE, HOME_PAGE_CONTENT_TYPE)], HOME_PAGE).into_response()),
    }
}

/// Replay the inbound request against `url` and relay the answer unchanged.
async fn fetch_passthrough(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    headers: HeaderMap,
    body: Body,
) -> Result<Response> {
    let mut request = client.request(method, url);

    // The body is re-framed on the way out
    for (name, value) in headers.iter() {
        if name == HOST || name == CONTENT_LENGTH || is_hop_by_hop(name) {
            continue;
        }
        request = request.header(name, value);
    }

    if body.size_hint().exact() != Some(0) {
        request = request.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    let response = request.send().await.map_err(|e| {
        tracing::error!("origin pool request to {} failed: {}", url, e);
        Error::Network(e.to_string())
    })?;

    relay(response)
}

/// Stream an upstream response back: status, headers and body as received.
fn relay(response: reqwest::Response) -> Result<Response> {
    let mut response_builder = axum::http::Response::builder().status(response.status());
    for (name, value) in response.headers().iter() {
        // Framing is redone by our own server
        if is_hop_by_hop(name) {
            continue;
        }
        response_builder = response_builder.header(name, value);
    }

    response_builder
        .body(Body::from_stream(response.bytes_stream()))
        .map_err(|e| Error::Internal(e.to_string()))
}

/// Connection-level headers that never survive a proxy hop.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-connection"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

// Builder for RawProxyServer.
#[derive(Default)]
pub struct RawProxyServerBuilder {
    config: Option<ProxyConfig>,
    client: Option<reqwest::Client>,
    random: Option<Arc<dyn RandomSource>>,
}

impl RawProxyServerBuilder {
    pub fn config(mut self, config: ProxyConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a preconfigured HTTP client. Redirects should be disabled on it so
    /// origin statuses are relayed as-is.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Replace the random source used for root-path pool selection.
    pub fn random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = Some(random);
        self
    }

    pub fn build(self) -> Result<RawProxyServer> {
        let config = self
            .config
            .ok_or_else(|| Error::Internal("config required".to_string()))?;

        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?,
        };

        Ok(RawProxyServer {
            config: Arc::new(config),
            client,
            random: self.random.unwrap_or_else(|| Arc::new(ThreadRandom)),
        })
    }
}
