//! Behaviour of the bare root path.

use crate::config::ProxyConfig;

/// Content type of [`HOME_PAGE`]
pub const HOME_PAGE_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Decorative page served at `/` when no pool is configured
pub const HOME_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Welcome to nginx!</title>
<style>
html { color-scheme: light dark; }
body { width: 35em; margin: 0 auto;
font-family: Tahoma, Verdana, Arial, sans-serif; }
</style>
</head>
<body>
<h1>Welcome to nginx!</h1>
<p>If you see this page, the nginx web server is successfully installed and
working. Further configuration is required.</p>

<p>For online documentation and support please refer to
<a href="http://nginx.org/">nginx.org</a>.<br/>
Commercial support is available at
<a href="http://nginx.com/">nginx.com</a>.</p>

<p><em>Thank you for using nginx.</em></p>
</body>
</html>
"#;

/// Source of uniformly distributed indices
pub trait RandomSource: Send + Sync {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// [`RandomSource`] backed by the thread-local generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        use rand::Rng;
        rand::thread_rng().gen_range(0..len)
    }
}

/// What to do with a request for `/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootAction {
    /// Answer with a redirect to this URL
    Redirect(String),
    /// Fetch this URL with the inbound request and relay the answer
    Fetch(String),
    /// Serve the decorative page
    Page,
}

/// Pick the root-path action. The redirect pool wins over the origin pool.
pub fn root_action(config: &ProxyConfig, random: &dyn RandomSource) -> RootAction {
    if let Some(url) = pick(&config.redirect_pool, random) {
        return RootAction::Redirect(url);
    }
    if let Some(url) = pick(&config.origin_pool, random) {
        return RootAction::Fetch(url);
    }
    RootAction::Page
}

fn pick(pool: &[String], random: &dyn RandomSource) -> Option<String> {
    if pool.is_empty() {
        return None;
    }
    // Clamp in case an injected source misbehaves
    let idx = random.pick(pool.len()).min(pool.len() - 1);
    Some(pool[idx].clone())
}
