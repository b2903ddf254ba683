use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::Semaphore;

use harvester_core::{CategoryId, CategoryMap, HarvestTarget, RawEntry};

use crate::credentials::Credentials;

/// Production catalog endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Retries allowed per logical request beyond the initial attempt.
const RETRY_LIMIT: u32 = 3;

#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Catalog base URL; overridable so tests can point at a mock server.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Base delay for rate-limit backoff; doubles on each retry.
    pub rate_limit_backoff: Duration,
    /// Base delay for transient backoff; grows linearly with the retry index.
    pub transient_backoff: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            rate_limit_backoff: Duration::from_secs(1),
            transient_backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The remote rejected the API key. Never retried.
    #[error("invalid API key: {0}")]
    InvalidCredentials(String),
    /// The category list could not be resolved; fatal for the harvest.
    #[error("category list unavailable: {0}")]
    Categories(String),
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Page-oriented access to the remote catalog.
///
/// `fetch_page` returning `Ok(None)` is the empty-signal: the page yielded
/// no entries, either because the catalog is drained past this point or
/// because retries were exhausted on a transient failure. A single drained
/// page never stops the harvest by itself; only credential rejection
/// escapes as an error.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<Option<Vec<RawEntry>>, TransportError>;

    async fn fetch_categories(&self) -> Result<CategoryMap, TransportError>;
}

#[derive(Debug, Deserialize)]
struct PageEnvelope {
    #[serde(default)]
    results: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct CategoryEnvelope {
    #[serde(default)]
    genres: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    id: CategoryId,
    name: String,
}

/// Verdict of the shared retry loop: a usable response, or a message
/// describing why the request was abandoned after bounded retries.
enum Fetched {
    Response(reqwest::Response),
    GaveUp(String),
}

/// Rate-limited transport over the remote catalog API.
///
/// All requests, the category call included, pass through one semaphore
/// sized to the harvest's concurrency bound, so peak in-flight requests
/// never exceed it no matter how wide a batch is.
pub struct TmdbTransport {
    http: reqwest::Client,
    creds: Credentials,
    settings: TransportSettings,
    include_adult: bool,
    permits: Arc<Semaphore>,
}

impl TmdbTransport {
    pub fn new(
        creds: Credentials,
        settings: TransportSettings,
        target: HarvestTarget,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            http,
            creds,
            settings,
            include_adult: target.include_adult(),
            permits: Arc::new(Semaphore::new(target.concurrency())),
        })
    }

    fn page_query(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("api_key", self.creds.api_key().to_string()),
            ("page", page.to_string()),
            ("sort_by", "popularity.desc".to_string()),
            ("language", "en-US".to_string()),
        ];
        // The flag is sent only when enabled for this harvest.
        if self.include_adult {
            query.push(("include_adult", "true".to_string()));
        }
        query
    }

    /// Issues one request with bounded retries.
    ///
    /// 401/403 fail immediately as a credential error. 429 backs off
    /// exponentially (base, 2x, 4x); other failures, timeouts included,
    /// back off linearly. Exhaustion yields `Fetched::GaveUp`, letting the
    /// caller decide whether that is fatal.
    async fn send_with_retry(
        &self,
        url: &str,
        query: &[(&'static str, String)],
        what: &str,
    ) -> Result<Fetched, TransportError> {
        let mut attempt = 0u32;
        loop {
            let last = attempt == RETRY_LIMIT;

            let response = match self.http.get(url).query(query).send().await {
                Ok(response) => response,
                Err(err) => {
                    if last {
                        return Ok(Fetched::GaveUp(format!(
                            "request error after {} attempts: {err}",
                            attempt + 1
                        )));
                    }
                    log::warn!("{what}: request error on attempt {}: {err}", attempt + 1);
                    attempt += 1;
                    tokio::time::sleep(self.settings.transient_backoff * attempt).await;
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(TransportError::InvalidCredentials(format!(
                    "remote rejected the API key (HTTP {})",
                    status.as_u16()
                )));
            }
            if status == StatusCode::TOO_MANY_REQUESTS {
                if last {
                    return Ok(Fetched::GaveUp(format!(
                        "still rate limited after {RETRY_LIMIT} retries"
                    )));
                }
                let delay = self.settings.rate_limit_backoff * (1u32 << attempt);
                log::warn!("{what}: rate limited, backing off {delay:?}");
                attempt += 1;
                tokio::time::sleep(delay).await;
                continue;
            }
            if !status.is_success() {
                if last {
                    return Ok(Fetched::GaveUp(format!("HTTP {status} persisted")));
                }
                log::warn!("{what}: HTTP {status} on attempt {}", attempt + 1);
                attempt += 1;
                tokio::time::sleep(self.settings.transient_backoff * attempt).await;
                continue;
            }

            return Ok(Fetched::Response(response));
        }
    }
}

#[async_trait]
impl CatalogTransport for TmdbTransport {
    async fn fetch_page(&self, page: u32) -> Result<Option<Vec<RawEntry>>, TransportError> {
        // One permit per logical page request, held across backoff sleeps
        // and released on every exit path when the guard drops.
        let _permit = self.permits.acquire().await.expect("permit pool closed");

        let url = format!("{}/discover/movie", self.settings.base_url);
        let what = format!("page {page}");
        let response = match self.send_with_retry(&url, &self.page_query(page), &what).await? {
            Fetched::Response(response) => response,
            Fetched::GaveUp(reason) => {
                log::warn!("page {page}: {reason}; dropping page");
                return Ok(None);
            }
        };

        match response.json::<PageEnvelope>().await {
            Ok(envelope) if envelope.results.is_empty() => {
                log::debug!("page {page}: no results");
                Ok(None)
            }
            Ok(envelope) => Ok(Some(envelope.results)),
            Err(err) => {
                // A malformed body is dropped without retrying.
                log::warn!("page {page}: unreadable response body: {err}");
                Ok(None)
            }
        }
    }

    async fn fetch_categories(&self) -> Result<CategoryMap, TransportError> {
        let _permit = self.permits.acquire().await.expect("permit pool closed");

        let url = format!("{}/genre/movie/list", self.settings.base_url);
        let query = [
            ("api_key", self.creds.api_key().to_string()),
            ("language", "en-US".to_string()),
        ];
        let response = match self.send_with_retry(&url, &query, "category list").await? {
            Fetched::Response(response) => response,
            Fetched::GaveUp(reason) => return Err(TransportError::Categories(reason)),
        };

        let envelope: CategoryEnvelope = response
            .json()
            .await
            .map_err(|err| TransportError::Categories(format!("unreadable body: {err}")))?;

        Ok(envelope
            .genres
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect())
    }
}
