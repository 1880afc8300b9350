//! Construction of origin URLs from request paths.

use crate::config::ProxyConfig;

/// Host name that marks a fully-qualified origin URL embedded in a request path
pub const UPSTREAM_HOST_MARKER: &str = "raw.githubusercontent.com";

/// Build the origin URL for `request_path`.
///
/// A path that embeds the origin host (e.g. `/https://raw.githubusercontent.com/o/r/b/f`)
/// is forwarded with everything after the host, ignoring the configured
/// repository. Otherwise owner, repository and branch are prepended, each only
/// when set. Dot segments in the request path are resolved before joining, so
/// `..` never climbs above the configured repository.
pub fn build_origin_url(config: &ProxyConfig, request_path: &str) -> String {
    let host = config.upstream_host.trim_end_matches('/');

    // ASCII lowercasing keeps byte offsets stable
    let lowered = request_path.to_ascii_lowercase();
    let joined = match lowered.find(UPSTREAM_HOST_MARKER) {
        Some(idx) => {
            let remainder = &request_path[idx + UPSTREAM_HOST_MARKER.len()..];
            format!("{}/{}", host, resolve_dot_segments(remainder))
        }
        None => {
            let mut url = host.to_string();
            for segment in [&config.repo_owner, &config.repo_name, &config.repo_branch]
                .into_iter()
                .flatten()
            {
                url.push('/');
                url.push_str(segment);
            }
            url.push_str(&resolve_dot_segments(request_path));
            url
        }
    };

    collapse_slashes(&joined)
}

/// Resolve `.` and `..` segments (including their `%2e` spellings) the way a
/// URL parser does, dropping empty segments along the way. `\\` counts as a
/// separator. The result always starts with `/`; a trailing slash is kept.
pub fn resolve_dot_segments(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let mut trailing_slash = false;

    for segment in path.split(['/', '\\']) {
        match dot_segment(segment) {
            Some(DotSegment::Current) => trailing_slash = true,
            Some(DotSegment::Parent) => {
                segments.pop();
                trailing_slash = true;
            }
            None if segment.is_empty() => trailing_slash = true,
            None => {
                segments.push(segment);
                trailing_slash = false;
            }
        }
    }

    let mut resolved = String::with_capacity(path.len() + 1);
    for segment in &segments {
        resolved.push('/');
        resolved.push_str(segment);
    }
    if resolved.is_empty() || trailing_slash {
        resolved.push('/');
    }
    resolved
}

enum DotSegment {
    Current,
    Parent,
}

fn dot_segment(segment: &str) -> Option<DotSegment> {
    match segment.to_ascii_lowercase().as_str() {
        "." | "%2e" => Some(DotSegment::Current),
        ".." | ".%2e" | "%2e." | "%2e%2e" => Some(DotSegment::Parent),
        _ => None,
    }
}

/// Collapse runs of `/` into one, leaving the `scheme://` separator intact.
pub fn collapse_slashes(url: &str) -> String {
    let (prefix, rest) = match url.find("://") {
        Some(idx) => url.split_at(idx + 3),
        None => ("", url),
    };

    let mut out = String::with_capacity(url.len());
    out.push_str(prefix);
    let mut previous_slash = prefix.ends_with('/');
    for c in rest.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(c);
    }
    out
}
