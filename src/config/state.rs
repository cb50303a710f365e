// Application state module
// Holds the read-only configuration and the shared upstream client

use std::time::Duration;

use reqwest::redirect;

use super::types::{Config, ProxyConfig};

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Application state, created once at startup and shared by every connection
pub struct AppState {
    pub config: Config,
    /// Upstream HTTP client (connection pool, TLS roots)
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.proxy.user_agent.as_str())
            .connect_timeout(Duration::from_secs(config.proxy.timeout_secs))
            .no_proxy()
            .redirect(redirect_policy(&config.proxy))
            .build()?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    /// Timeout covering upstream connect and response headers
    pub const fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.config.proxy.timeout_secs)
    }
}

/// Redirect policy for upstream fetches.
///
/// With an allow list configured every hop must land on an allowed host,
/// otherwise the fetch fails before the redirect target is contacted.
fn redirect_policy(proxy: &ProxyConfig) -> redirect::Policy {
    if proxy.allowed_hosts.is_empty() {
        return redirect::Policy::limited(MAX_REDIRECTS);
    }

    let proxy = proxy.clone();
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let host = attempt.url().host_str().unwrap_or_default().to_string();
        if proxy.is_host_allowed(&host) {
            attempt.follow()
        } else {
            attempt.error(format!("redirect to host not allowed: {host}"))
        }
    })
}
