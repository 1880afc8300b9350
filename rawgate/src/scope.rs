//! Path-scoped credential rules.
//!
//! A rule binds a subtree of the repository to a secret that callers must
//! present. Rules are written as `secret@path` and evaluated in the order they
//! were configured.

use crate::list::parse_list;
use crate::origin::resolve_dot_segments;

/// A single `secret@path` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRule {
    /// Secret the caller has to present as `token`
    pub required_secret: String,
    /// Lower-cased, slash-normalised path with a leading slash
    pub scope_path: String,
}

impl ScopeRule {
    /// Parse a `secret@path` entry, splitting on the first `@`.
    ///
    /// Entries without an `@`, with an empty secret, or whose path normalises
    /// to nothing are rejected.
    pub fn parse(entry: &str) -> Option<Self> {
        let (secret, path) = entry.split_once('@')?;
        if secret.is_empty() {
            return None;
        }

        let scope_path = normalize_scope_path(path)?;
        Some(Self {
            required_secret: secret.to_string(),
            scope_path,
        })
    }

    /// Whether an already normalised request path falls inside this scope.
    fn covers(&self, normalized_path: &str) -> bool {
        match normalized_path.strip_prefix(self.scope_path.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Parse the raw rule setting into an ordered rule list, skipping malformed entries.
pub fn parse_rules(raw: &str) -> Vec<ScopeRule> {
    parse_list(raw)
        .iter()
        .filter_map(|entry| {
            let rule = ScopeRule::parse(entry);
            if rule.is_none() {
                tracing::debug!("skipping malformed scoped rule entry");
            }
            rule
        })
        .collect()
}

/// Find the first rule whose scope contains `request_path`.
pub fn match_scope<'a>(rules: &'a [ScopeRule], request_path: &str) -> Option<&'a ScopeRule> {
    let normalized = normalize_request_path(request_path);
    rules.iter().find(|rule| rule.covers(&normalized))
}

fn normalize_request_path(path: &str) -> String {
    let decoded = urlencoding::decode(path)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| path.to_string());

    // Match what the origin will actually be asked for: the outbound URL
    // collapses slashes and resolves dot segments.
    resolve_dot_segments(&decoded).to_lowercase()
}

fn normalize_scope_path(path: &str) -> Option<String> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    let mut normalized = String::with_capacity(trimmed.len() + 1);
    for segment in trimmed.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    Some(normalized.to_lowercase())
}
