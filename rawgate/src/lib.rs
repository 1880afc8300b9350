//! # rawgate
//!
//! A reverse proxy for a private raw-content origin that keeps the real
//! access credential on the server.
//!
//! Callers request files by path and optionally present a `token` query
//! parameter. The proxy maps the path onto the configured repository, decides
//! which credential to attach, and streams the origin's answer back.
//!
//! ## Features
//!
//! - **Credential hiding**: a public alias token is swapped for the real one
//! - **Path scoping**: `secret@path` rules gate subtrees behind their own secrets
//! - **Streaming**: origin bodies are relayed without buffering
//! - **Root camouflage**: `/` redirects, proxies to a pool, or serves a plain page
//!
//! ## Example
//!
//! ```rust,no_run
//! use rawgate::{EnvSource, ProxyConfig, RawProxyServer};
//!
//! # async fn example() -> rawgate::Result<()> {
//! let config = ProxyConfig::from_source(&EnvSource);
//! let proxy = RawProxyServer::builder().config(config).build()?;
//!
//! let app = proxy.router();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod home;
pub mod list;
pub mod origin;
pub mod request;
pub mod scope;
#[cfg(feature = "axum")]
pub mod server;
pub mod source;
pub mod token;

pub use config::ProxyConfig;
pub use error::{AuthError, Error, Result};
pub use home::{RandomSource, RootAction, ThreadRandom};
pub use request::{ResolvedRequest, resolve_request};
pub use scope::ScopeRule;
#[cfg(feature = "axum")]
pub use server::{RawProxyServer, RawProxyServerBuilder};
pub use source::{ConfigSource, EnvSource};
pub use token::{CredentialOrigin, TokenResolver};
