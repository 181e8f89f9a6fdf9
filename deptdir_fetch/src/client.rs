//! HTTP client for department directory pages.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use url::Url;

use crate::{
    request::{FetchRequest, Method},
    stats::{FetchStats, RequestTracker},
    Error,
};

/// Default user agent: identifies the tool and its version.
pub const DEFAULT_USER_AGENT: &str = concat!("deptdir/", env!("CARGO_PKG_VERSION"));

/// Tuning knobs for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-request timeout. Expiry counts as a transient failure.
    pub timeout: Duration,
    /// Fixed pause before every live request, to go easy on the remote host.
    pub request_delay: Duration,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    /// Backoff for the first retry; doubled on each further retry.
    pub base_backoff: Duration,
    /// Upper bound of the random jitter added to each backoff.
    pub max_jitter: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            request_delay: Duration::from_secs(1),
            max_retries: 2,
            base_backoff: Duration::from_secs(2),
            max_jitter: Duration::from_millis(500),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// No delay, no backoff. Used against local mock servers.
    pub fn immediate() -> Self {
        Self {
            request_delay: Duration::ZERO,
            base_backoff: Duration::ZERO,
            max_jitter: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Paced, retrying HTTP client.
///
/// Requests are issued strictly one at a time by the caller; the client only
/// enforces the inter-request delay and the retry policy.
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    tracker: RequestTracker,
}

impl Client {
    /// Creates a client with the default configuration.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client with an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Build(e)
            })?;
        Ok(Self {
            http,
            config,
            tracker: RequestTracker::new(),
        })
    }

    /// Snapshot of request outcomes so far.
    pub fn stats(&self) -> FetchStats {
        self.tracker.summary()
    }

    /// Fetches the full response body, retrying transient failures.
    ///
    /// - Sleeps `request_delay` before each attempt.
    /// - On a transient error: waits `base_backoff * 2^attempt` plus jitter,
    ///   then retries, up to `max_retries` times.
    /// - On a final error, or when retries are exhausted: returns the last error.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, Error> {
        let url = Url::parse(&request.url).map_err(|e| Error::InvalidUrl {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;

        let mut attempt: u32 = 0;
        loop {
            if !self.config.request_delay.is_zero() {
                tracing::debug!("sleeping {:?} before {}", self.config.request_delay, request);
                sleep(self.config.request_delay).await;
            }

            let err = match self.send_once(&url, request).await {
                Ok(body) => {
                    self.tracker.record_success();
                    return Ok(body);
                }
                Err(e) => e,
            };

            if !err.is_transient() || attempt >= self.config.max_retries {
                self.tracker.record_failure();
                tracing::error!("{} failed after {} attempt(s): {}", request, attempt + 1, err);
                return Err(err);
            }

            let backoff = self.backoff(attempt);
            self.tracker.record_retry(backoff);
            tracing::warn!("{} failed ({}), retrying in {:?}", request, err, backoff);
            sleep(backoff).await;
            attempt += 1;
        }
    }

    async fn send_once(&self, url: &Url, request: &FetchRequest) -> Result<Vec<u8>, Error> {
        tracing::info!("fetching {}", request);
        let builder = match request.method {
            Method::Get => self.http.get(url.clone()),
            Method::Post => self.http.post(url.clone()).form(&request.form),
        };
        let resp = builder
            .header("accept", "text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.8")
            .header("accept-language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| classify(&request.url, e))?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| classify(&request.url, e))?;

        if !status.is_success() {
            let snippet = truncate_body(&String::from_utf8_lossy(&body));
            return Err(Error::HttpStatus {
                url: request.url.clone(),
                status: status.as_u16(),
                body: snippet,
            });
        }

        Ok(body.to_vec())
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let multiplier = 1u32 << attempt.min(16);
        let jitter_ms = self.config.max_jitter.as_millis() as u64;
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms));
        self.config.base_backoff * multiplier + jitter
    }
}

fn classify(url: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout {
            url: url.to_string(),
        }
    } else {
        Error::RequestFailed {
            url: url.to_string(),
            source: e,
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
