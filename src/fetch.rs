//! Fetch-or-cache retrieval
//!
//! Every network access in the crate goes through [`Fetcher::fetch`], which
//! returns the cached value when the key is known and otherwise runs the
//! supplied producer once, caches its result and persists the cache.

use std::future::Future;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::cache::CacheStore;

/// Errors that can occur while retrieving a response
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Status returned by the server
        status: StatusCode,
    },

    /// Cached value has the wrong shape for the requested kind of body
    #[error("Cached body for {0} is not text")]
    UnexpectedBody(String),
}

/// Cache-backed retriever owning the cache store and the HTTP client
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    cache: CacheStore,
}

impl Fetcher {
    /// Creates a new Fetcher over an opened cache
    pub fn new(cache: CacheStore) -> Self {
        Self::with_client(Client::new(), cache)
    }

    /// Creates a new Fetcher with a custom HTTP client
    pub fn with_client(client: Client, cache: CacheStore) -> Self {
        Self { client, cache }
    }

    /// Read access to the underlying cache
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Returns the value cached under `key`, producing it on a miss
    ///
    /// On a hit `producer` is never invoked. On a miss it is invoked exactly
    /// once; a successful result is cached and the cache file rewritten. A
    /// failing producer leaves the cache untouched, so a later call retries.
    ///
    /// Failing to persist the cache is logged and otherwise ignored: the value
    /// is still returned and stays cached for the rest of the run.
    pub async fn fetch<F, Fut>(&mut self, key: &str, producer: F) -> Result<Value, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, FetchError>>,
    {
        if let Some(cached) = self.cache.get(key) {
            info!(key, "using cache");
            return Ok(cached.clone());
        }

        info!(key, "fetching");
        let value = producer().await?;

        if let Err(e) = self.cache.insert(key, value.clone()) {
            warn!(key, path = %self.cache.path().display(), error = %e, "failed to persist cache");
        }
        Ok(value)
    }

    /// Fetches an HTML page, cached under its URL
    pub async fn fetch_page(&mut self, url: &str) -> Result<String, FetchError> {
        let client = self.client.clone();
        let target = url.to_string();
        let value = self.fetch(url, move || get_text(client, target)).await?;

        match value {
            Value::String(body) => Ok(body),
            _ => Err(FetchError::UnexpectedBody(url.to_string())),
        }
    }

    /// Fetches a JSON document from `url`, cached under `key`
    pub async fn fetch_json(&mut self, key: &str, url: Url) -> Result<Value, FetchError> {
        let client = self.client.clone();
        self.fetch(key, move || get_json(client, url)).await
    }
}

/// GETs `url` and returns its body as a JSON string value
async fn get_text(client: Client, url: String) -> Result<Value, FetchError> {
    let response = ensure_success(client.get(&url).send().await?, &url)?;
    Ok(Value::String(response.text().await?))
}

/// GETs `url` and decodes its body as JSON
async fn get_json(client: Client, url: Url) -> Result<Value, FetchError> {
    let target = url.to_string();
    let response = ensure_success(client.get(url).send().await?, &target)?;
    Ok(response.json::<Value>().await?)
}

/// Turns a non-2xx response into [`FetchError::Status`]
fn ensure_success(response: reqwest::Response, url: &str) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Status {
            url: url.to_string(),
            status,
        })
    }
}
