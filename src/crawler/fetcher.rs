use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::crawler::proxy::{ProxyEndpoint, ProxyPool};
use crate::error::ScrapeError;

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const ACCEPT_LANGUAGE_VALUE: &str = "uk-UA,uk;q=0.9,en-US;q=0.8,en;q=0.7";

/// Flat inter-attempt timing, deliberately not a backoff curve. The delay is
/// slept before every attempt, including the first.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(10),
        }
    }
}

pub struct Fetcher {
    user_agent: String,
    proxies: Arc<ProxyPool>,
    requests: AtomicU32,
}

impl Fetcher {
    pub fn new(user_agent: &str, proxies: Arc<ProxyPool>) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            proxies,
            requests: AtomicU32::new(0),
        }
    }

    /// Requests actually sent through this fetcher, one per attempt.
    pub fn requests_sent(&self) -> u32 {
        self.requests.load(Ordering::Relaxed)
    }

    /// GETs `url`, retrying transport failures and non-200 statuses under the
    /// given policy. With `use_proxy`, one endpoint is picked for the whole
    /// call and every attempt is routed through it.
    pub async fn fetch(
        &self,
        url: &str,
        policy: &RetryPolicy,
        use_proxy: bool,
    ) -> Result<String, ScrapeError> {
        let proxy = if use_proxy {
            Some(self.proxies.pick()?.clone())
        } else {
            None
        };
        let client = self.build_client(url, proxy.as_ref())?;

        let mut last_error: Option<Box<ScrapeError>> = None;

        for attempt in 1..=policy.max_attempts {
            tokio::time::sleep(policy.delay).await;
            self.requests.fetch_add(1, Ordering::Relaxed);

            match client.get(url).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if status == 200 {
                        match response.text().await {
                            Ok(body) => {
                                debug!(url, attempt, "Fetched document");
                                return Ok(body);
                            }
                            Err(e) => {
                                warn!(url, attempt, error = %e, "Failed to read response body");
                                last_error = Some(Box::new(ScrapeError::Transport {
                                    url: url.to_string(),
                                    source: e,
                                }));
                            }
                        }
                    } else {
                        warn!(url, attempt, status, "Unexpected response status");
                        last_error = Some(Box::new(ScrapeError::NonSuccessStatus {
                            url: url.to_string(),
                            status,
                        }));
                    }
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "Request failed");
                    last_error = Some(Box::new(ScrapeError::Transport {
                        url: url.to_string(),
                        source: e,
                    }));
                }
            }
        }

        Err(ScrapeError::RetriesExhausted {
            url: url.to_string(),
            attempts: policy.max_attempts,
            source: last_error,
        })
    }

    fn build_client(
        &self,
        url: &str,
        proxy: Option<&ProxyEndpoint>,
    ) -> Result<Client, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
        );
        if let Some(origin) = site_origin(url) {
            if let Ok(value) = HeaderValue::from_str(&origin) {
                headers.insert(ORIGIN, value.clone());
                headers.insert(REFERER, value);
            }
        }

        let mut builder = Client::builder()
            .user_agent(self.user_agent.as_str())
            .default_headers(headers);

        if let Some(endpoint) = proxy {
            let proxy =
                reqwest::Proxy::all(format!("http://{}", endpoint)).map_err(|e| {
                    ScrapeError::Transport {
                        url: url.to_string(),
                        source: e,
                    }
                })?;
            builder = builder.proxy(proxy);
        }

        builder.build().map_err(|e| ScrapeError::Transport {
            url: url.to_string(),
            source: e,
        })
    }
}

fn site_origin(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .map(|u| u.origin().ascii_serialization())
        .filter(|origin| origin != "null")
}
