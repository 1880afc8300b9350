use crate::config::ProxyConfig;
use crate::error::AuthError;
use crate::origin::build_origin_url;
use crate::token::{CredentialOrigin, TokenResolver};

/// Target and credential for one proxied request.
///
/// Every successful resolution carries a credential; requests without one are
/// rejected before a `ResolvedRequest` exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub target_url: String,
    pub credential: String,
    pub credential_origin: CredentialOrigin,
}

/// Work out where a request goes and what it is authenticated with.
///
/// Auth failures are returned before anything touches the network.
pub fn resolve_request(
    config: &ProxyConfig,
    request_path: &str,
    user_token: Option<&str>,
) -> Result<ResolvedRequest, AuthError> {
    let target_url = build_origin_url(config, request_path);
    let credential = TokenResolver::new(config).resolve(request_path, user_token)?;

    Ok(ResolvedRequest {
        target_url,
        credential: credential.value,
        credential_origin: credential.origin,
    })
}

/// Extract the `token` query parameter. An empty value counts as absent.
pub fn query_token(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
