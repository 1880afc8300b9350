use crate::config::ProxyConfig;
use crate::error::AuthError;
use crate::scope::match_scope;

/// Which setting ended up supplying the upstream credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    /// Scoped secret accepted, server credential attached
    Scoped,
    /// Alias setting: swapped for the server credential when presented, or
    /// used itself as the last resort
    Alias,
    /// Caller's own token forwarded as-is
    Caller,
    /// Nothing presented, server credential attached
    Server,
}

/// Result of credential resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub value: String,
    pub origin: CredentialOrigin,
}

/// Decides which credential, if any, a request is forwarded with
pub struct TokenResolver<'a> {
    config: &'a ProxyConfig,
}

impl<'a> TokenResolver<'a> {
    pub fn new(config: &'a ProxyConfig) -> Self {
        Self { config }
    }

    /// Resolve the upstream credential for `request_path`.
    ///
    /// Scoped rules are checked first. A matching scope only gates access:
    /// the caller's secret is compared and then replaced by the server
    /// credential. Paths outside every scope use the default policy.
    pub fn resolve(
        &self,
        request_path: &str,
        user_token: Option<&str>,
    ) -> Result<ResolvedCredential, AuthError> {
        let user_token = user_token.filter(|t| !t.is_empty());
        let upstream = self.config.upstream_credential.as_deref();
        let alias = self.config.alias_credential.as_deref();

        if let Some(rule) = match_scope(&self.config.scoped_rules, request_path) {
            let presented = user_token.ok_or(AuthError::MissingToken)?;
            if presented != rule.required_secret {
                return Err(AuthError::InvalidToken);
            }
            let credential = upstream.ok_or_else(|| {
                tracing::error!(
                    scope = %rule.scope_path,
                    "scoped rule matched but no upstream credential is configured"
                );
                AuthError::ServerMisconfigured
            })?;
            return Ok(resolved(credential, CredentialOrigin::Scoped));
        }

        if let (Some(alias), Some(presented)) = (alias, user_token) {
            if presented == alias {
                return Ok(resolved(upstream.unwrap_or(alias), CredentialOrigin::Alias));
            }
        }

        user_token
            .map(|t| resolved(t, CredentialOrigin::Caller))
            .or_else(|| upstream.map(|t| resolved(t, CredentialOrigin::Server)))
            .or_else(|| alias.map(|t| resolved(t, CredentialOrigin::Alias)))
            .filter(|c| !c.value.is_empty())
            .ok_or(AuthError::MissingToken)
    }
}

fn resolved(value: &str, origin: CredentialOrigin) -> ResolvedCredential {
    ResolvedCredential {
        value: value.to_string(),
        origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(
        config: &ProxyConfig,
        path: &str,
        token: Option<&str>,
    ) -> Result<String, AuthError> {
        TokenResolver::new(config)
            .resolve(path, token)
            .map(|c| c.value)
    }

    #[test]
    fn test_nothing_configured_requires_token() {
        let config = ProxyConfig::new();
        assert_eq!(
            resolve(&config, "/a.txt", None),
            Err(AuthError::MissingToken)
        );
        assert_eq!(
            resolve(&config, "/a.txt", Some("")),
            Err(AuthError::MissingToken)
        );
    }

    #[test]
    fn test_caller_token_forwarded_without_config() {
        let config = ProxyConfig::new();
        let resolved = TokenResolver::new(&config)
            .resolve("/a.txt", Some("mine"))
            .unwrap();
        assert_eq!(resolved.value, "mine");
        assert_eq!(resolved.origin, CredentialOrigin::Caller);
    }

    #[test]
    fn test_alias_swapped_for_upstream() {
        let config = ProxyConfig::new()
            .with_upstream_credential("U")
            .with_alias_credential("V");
        let resolved = TokenResolver::new(&config)
            .resolve("/a.txt", Some("V"))
            .unwrap();
        assert_eq!(resolved.value, "U");
        assert_eq!(resolved.origin, CredentialOrigin::Alias);
    }

    #[test]
    fn test_alias_without_upstream_falls_back_to_alias() {
        let config = ProxyConfig::new().with_alias_credential("V");
        assert_eq!(resolve(&config, "/a.txt", Some("V")), Ok("V".to_string()));
    }

    #[test]
    fn test_non_alias_token_is_forwarded() {
        let config = ProxyConfig::new()
            .with_upstream_credential("U")
            .with_alias_credential("V");
        assert_eq!(
            resolve(&config, "/a.txt", Some("other")),
            Ok("other".to_string())
        );
    }

    #[test]
    fn test_no_token_uses_server_then_alias() {
        let config = ProxyConfig::new().with_upstream_credential("U");
        let resolved = TokenResolver::new(&config).resolve("/a.txt", None).unwrap();
        assert_eq!(resolved.value, "U");
        assert_eq!(resolved.origin, CredentialOrigin::Server);

        let config = ProxyConfig::new().with_alias_credential("V");
        let resolved = TokenResolver::new(&config).resolve("/a.txt", None).unwrap();
        assert_eq!(resolved.value, "V");
        assert_eq!(resolved.origin, CredentialOrigin::Alias);
    }

    #[test]
    fn test_scoped_rule_gates_subtree() {
        let config = ProxyConfig::new()
            .with_upstream_credential("U")
            .with_scoped_rules("open-sesame@/private");

        assert_eq!(
            resolve(&config, "/private/x.txt", Some("open-sesame")),
            Ok("U".to_string())
        );
        assert_eq!(
            resolve(&config, "/private", Some("open-sesame")),
            Ok("U".to_string())
        );
        assert_eq!(
            resolve(&config, "/private/x.txt", Some("wrong")),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            resolve(&config, "/private/x.txt", None),
            Err(AuthError::MissingToken)
        );
    }

    #[test]
    fn test_scoped_secret_never_forwarded() {
        let config = ProxyConfig::new()
            .with_upstream_credential("U")
            .with_scoped_rules("S@/docs");
        let resolved = TokenResolver::new(&config)
            .resolve("/docs/readme.md", Some("S"))
            .unwrap();
        assert_eq!(resolved.value, "U");
        assert_eq!(resolved.origin, CredentialOrigin::Scoped);
    }

    #[test]
    fn test_scoped_match_without_server_credential() {
        let config = ProxyConfig::new().with_scoped_rules("S@/docs");
        assert_eq!(
            resolve(&config, "/docs/a", Some("S")),
            Err(AuthError::ServerMisconfigured)
        );
    }

    #[test]
    fn test_alias_does_not_open_scope() {
        let config = ProxyConfig::new()
            .with_upstream_credential("U")
            .with_alias_credential("V")
            .with_scoped_rules("S@/docs");
        assert_eq!(
            resolve(&config, "/docs/a", Some("V")),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_unscoped_path_falls_through_to_default() {
        let config = ProxyConfig::new()
            .with_upstream_credential("U")
            .with_scoped_rules("S@/docs");
        assert_eq!(resolve(&config, "/public/a", None), Ok("U".to_string()));
    }

    #[test]
    fn test_embedded_origin_path_is_not_scoped() {
        let config = ProxyConfig::new()
            .with_repository("o", "r", "b")
            .with_upstream_credential("U")
            .with_scoped_rules("S@/private");
        let resolved = TokenResolver::new(&config)
            .resolve("/raw.githubusercontent.com/o/r/b/private/x", None)
            .unwrap();
        assert_eq!(resolved.origin, CredentialOrigin::Server);
    }

    #[test]
    fn test_earlier_rule_takes_precedence() {
        let config = ProxyConfig::new()
            .with_upstream_credential("U")
            .with_scoped_rules("first@/a, second@/a/b");
        assert_eq!(
            resolve(&config, "/a/b/c", Some("first")),
            Ok("U".to_string())
        );
        assert_eq!(
            resolve(&config, "/a/b/c", Some("second")),
            Err(AuthError::InvalidToken)
        );
    }
}
