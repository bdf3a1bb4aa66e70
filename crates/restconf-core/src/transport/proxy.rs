//! Proxy settings, resolved once from the standard environment variables.

/// Outbound proxy configuration captured at transport construction.
///
/// libcurl would otherwise re-read the environment on every transfer; the
/// transport pins whatever was set when it was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    /// Comma-separated host exclusions (`NO_PROXY` syntax).
    pub no_proxy: Option<String>,
}

impl ProxySettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through `lookup` (lower-case names win, as in curl).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|n| lookup(*n))
                .map(|v| v.trim().to_string())
                .find(|v| !v.is_empty())
        };
        let all = first(&["all_proxy", "ALL_PROXY"]);
        Self {
            http: first(&["http_proxy", "HTTP_PROXY"]).or_else(|| all.clone()),
            https: first(&["https_proxy", "HTTPS_PROXY"]).or(all),
            no_proxy: first(&["no_proxy", "NO_PROXY"]),
        }
    }

    /// Proxy to use for `url`, chosen by scheme.
    pub fn for_url(&self, url: &str) -> Option<&str> {
        if url.get(..8).is_some_and(|s| s.eq_ignore_ascii_case("https://")) {
            self.https.as_deref()
        } else {
            self.http.as_deref()
        }
    }
}
