use crate::list::parse_list;
use crate::scope::{ScopeRule, parse_rules};
use crate::source::ConfigSource;

/// Canonical raw-content origin
pub const DEFAULT_UPSTREAM_HOST: &str = "https://raw.githubusercontent.com";

/// Body returned for non-success upstream statuses when no override is set
pub const DEFAULT_ERROR_MESSAGE: &str = "Unable to fetch the requested file from the origin.";

/// Setting names understood by [`ProxyConfig::from_source`].
pub mod keys {
    pub const REDIRECT_POOL: &str = "URL302";
    pub const ORIGIN_POOL: &str = "URL";
    pub const REPO_OWNER: &str = "GH_NAME";
    pub const REPO_NAME: &str = "GH_REPO";
    pub const REPO_BRANCH: &str = "GH_BRANCH";
    pub const UPSTREAM_CREDENTIAL: &str = "GH_TOKEN";
    pub const ALIAS_CREDENTIAL: &str = "TOKEN";
    /// `secret@path` rules, relative to the configured repository.
    ///
    /// Fully qualified request paths (`/raw.githubusercontent.com/owner/repo/branch/...`)
    /// are not checked against these rules, so they can still reach a scoped
    /// subtree with the server credential. Do not rely on rules alone to keep
    /// files private when `GH_TOKEN` can read the whole repository.
    pub const SCOPED_RULES: &str = "PATH_TOKENS";
    pub const ERROR_MESSAGE: &str = "ERROR";
    pub const UPSTREAM_HOST: &str = "UPSTREAM_HOST";
}

/// Immutable configuration snapshot for the proxy
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Origin that file requests are forwarded to
    pub upstream_host: String,

    /// Repository owner prepended to request paths
    pub repo_owner: Option<String>,

    /// Repository name prepended to request paths
    pub repo_name: Option<String>,

    /// Branch prepended to request paths
    pub repo_branch: Option<String>,

    /// Real credential sent to the origin; never shown to callers
    pub upstream_credential: Option<String>,

    /// Public-facing token callers may present in place of the real credential
    pub alias_credential: Option<String>,

    /// Ordered path-scoped rules, first match wins
    pub scoped_rules: Vec<ScopeRule>,

    /// Root-path redirect targets
    pub redirect_pool: Vec<String>,

    /// Root-path proxy targets
    pub origin_pool: Vec<String>,

    /// Body text for non-success upstream responses
    pub error_message: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxyConfig {
    /// Create an empty configuration pointing at the canonical origin
    pub fn new() -> Self {
        Self {
            upstream_host: DEFAULT_UPSTREAM_HOST.to_string(),
            repo_owner: None,
            repo_name: None,
            repo_branch: None,
            upstream_credential: None,
            alias_credential: None,
            scoped_rules: Vec::new(),
            redirect_pool: Vec::new(),
            origin_pool: Vec::new(),
            error_message: None,
        }
    }

    /// Build a snapshot from a key-value source. Unset and empty values are
    /// treated the same.
    pub fn from_source<S: ConfigSource>(source: &S) -> Self {
        let get = |key: &str| source.get(key).filter(|v| !v.trim().is_empty());

        let scoped_rules = get(keys::SCOPED_RULES)
            .map(|raw| parse_rules(&raw))
            .unwrap_or_default();

        let config = Self {
            upstream_host: get(keys::UPSTREAM_HOST)
                .map(|h| h.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_UPSTREAM_HOST.to_string()),
            repo_owner: get(keys::REPO_OWNER),
            repo_name: get(keys::REPO_NAME),
            repo_branch: get(keys::REPO_BRANCH),
            upstream_credential: get(keys::UPSTREAM_CREDENTIAL),
            alias_credential: get(keys::ALIAS_CREDENTIAL),
            scoped_rules,
            redirect_pool: get(keys::REDIRECT_POOL)
                .map(|raw| parse_list(&raw))
                .unwrap_or_default(),
            origin_pool: get(keys::ORIGIN_POOL)
                .map(|raw| parse_list(&raw))
                .unwrap_or_default(),
            error_message: get(keys::ERROR_MESSAGE),
        };

        tracing::debug!(
            upstream = %config.upstream_host,
            scoped_rules = config.scoped_rules.len(),
            redirect_pool = config.redirect_pool.len(),
            origin_pool = config.origin_pool.len(),
            has_upstream_credential = config.upstream_credential.is_some(),
            has_alias_credential = config.alias_credential.is_some(),
            "loaded proxy configuration"
        );

        config
    }

    /// Set the origin host (scheme included, no trailing slash needed)
    pub fn with_upstream_host(mut self, host: impl Into<String>) -> Self {
        self.upstream_host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Set owner, repository and branch in one go
    pub fn with_repository(
        mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        self.repo_owner = Some(owner.into());
        self.repo_name = Some(name.into());
        self.repo_branch = Some(branch.into());
        self
    }

    /// Set the real upstream credential
    pub fn with_upstream_credential(mut self, credential: impl Into<String>) -> Self {
        self.upstream_credential = Some(credential.into());
        self
    }

    /// Set the visible alias token
    pub fn with_alias_credential(mut self, alias: impl Into<String>) -> Self {
        self.alias_credential = Some(alias.into());
        self
    }

    /// Parse and set path-scoped rules from their raw `secret@path` form
    pub fn with_scoped_rules(mut self, raw: &str) -> Self {
        self.scoped_rules = parse_rules(raw);
        self
    }

    /// Set the root-path redirect pool
    pub fn with_redirect_pool(mut self, urls: Vec<String>) -> Self {
        self.redirect_pool = urls;
        self
    }

    /// Set the root-path origin pool
    pub fn with_origin_pool(mut self, urls: Vec<String>) -> Self {
        self.origin_pool = urls;
        self
    }

    /// Override the body text of non-success upstream responses
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Body text for non-success upstream responses
    pub fn error_message(&self) -> &str {
        self.error_message.as_deref().unwrap_or(DEFAULT_ERROR_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config = ProxyConfig::from_source(&source(&[]));
        assert_eq!(config.upstream_host, DEFAULT_UPSTREAM_HOST);
        assert!(config.repo_owner.is_none());
        assert!(config.scoped_rules.is_empty());
        assert!(config.redirect_pool.is_empty());
        assert_eq!(config.error_message(), DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = ProxyConfig::from_source(&source(&[
            (keys::UPSTREAM_CREDENTIAL, ""),
            (keys::ALIAS_CREDENTIAL, "  "),
            (keys::ERROR_MESSAGE, ""),
        ]));
        assert!(config.upstream_credential.is_none());
        assert!(config.alias_credential.is_none());
        assert!(config.error_message.is_none());
    }

    #[test]
    fn test_reads_all_keys() {
        let config = ProxyConfig::from_source(&source(&[
            (keys::REPO_OWNER, "o"),
            (keys::REPO_NAME, "r"),
            (keys::REPO_BRANCH, "b"),
            (keys::UPSTREAM_CREDENTIAL, "ghp_real"),
            (keys::ALIAS_CREDENTIAL, "public"),
            (keys::SCOPED_RULES, "s1@/docs, junk, s2@/Team"),
            (keys::REDIRECT_POOL, "https://a.example https://b.example"),
            (keys::ORIGIN_POOL, "\"https://c.example\""),
            (keys::ERROR_MESSAGE, "nope"),
            (keys::UPSTREAM_HOST, "http://127.0.0.1:9000/"),
        ]));

        assert_eq!(config.repo_owner.as_deref(), Some("o"));
        assert_eq!(config.repo_name.as_deref(), Some("r"));
        assert_eq!(config.repo_branch.as_deref(), Some("b"));
        assert_eq!(config.upstream_credential.as_deref(), Some("ghp_real"));
        assert_eq!(config.alias_credential.as_deref(), Some("public"));
        assert_eq!(config.scoped_rules.len(), 2);
        assert_eq!(config.scoped_rules[1].scope_path, "/team");
        assert_eq!(
            config.redirect_pool,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.origin_pool, vec!["https://c.example"]);
        assert_eq!(config.error_message(), "nope");
        assert_eq!(config.upstream_host, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_builder_setters() {
        let config = ProxyConfig::new()
            .with_upstream_host("http://localhost:1234/")
            .with_repository("o", "r", "b")
            .with_scoped_rules("x@/y");
        assert_eq!(config.upstream_host, "http://localhost:1234");
        assert_eq!(config.repo_branch.as_deref(), Some("b"));
        assert_eq!(config.scoped_rules[0].required_secret, "x");
    }
}
