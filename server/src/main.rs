//! rawgate server.
//!
//! Reads its configuration from the environment (see `rawgate::config::keys`)
//! and serves the proxy.
//!
//! Run with:
//! ```
//! GH_NAME=owner GH_REPO=repo GH_BRANCH=main GH_TOKEN=... cargo run -p server
//! ```

use miette::{Context, IntoDiagnostic, Result};
use rawgate::{EnvSource, ProxyConfig, RawProxyServer};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("server=info,rawgate=info")),
        )
        .init();

    let config = ProxyConfig::from_source(&EnvSource);

    let proxy = RawProxyServer::builder()
        .config(config)
        .build()
        .into_diagnostic()
        .wrap_err("failed to build proxy server")?;

    let app = proxy.router().layer(CorsLayer::permissive());

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .into_diagnostic()
        .wrap_err("invalid BIND_ADDR")?;

    tracing::info!("rawgate listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_diagnostic()
        .wrap_err("failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .into_diagnostic()
        .wrap_err("server error")?;

    Ok(())
}
