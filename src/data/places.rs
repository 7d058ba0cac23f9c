//! MapQuest radius search client
//!
//! Looks up points of interest around a site's zip code and decodes the
//! `searchResults` list for display.

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::SiteRecord;
use crate::fetch::{FetchError, Fetcher};

/// Radius search endpoint of the MapQuest Search API
pub const PLACES_ENDPOINT: &str = "http://www.mapquestapi.com/search/v2/radius";

/// Search radius in miles
const SEARCH_RADIUS: u32 = 10;

/// Maximum number of places returned per search
const MAX_MATCHES: u32 = 10;

/// Errors that can occur when querying nearby places
#[derive(Debug, Error)]
pub enum PlacesError {
    /// HTTP request failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Site has no zip code to search around
    #[error("No zip code for {0}; cannot search nearby places")]
    MissingZipcode(String),

    /// No API key was configured and the answer is not cached
    #[error("No MapQuest API key configured (set MAPQUEST_API_KEY or pass --api-key)")]
    MissingApiKey,

    /// Endpoint could not be combined with the query parameters
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response did not have the expected shape
    #[error("Failed to parse API response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// How radius search responses are keyed in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PlacesCacheKey {
    /// Key by the endpoint alone; the first response is reused for every site
    Endpoint,
    /// Key by the endpoint plus every query parameter except the API key
    #[default]
    Request,
}

/// Client for the radius search API
#[derive(Debug, Clone)]
pub struct PlacesClient {
    endpoint: String,
    api_key: Option<String>,
    cache_key: PlacesCacheKey,
}

impl PlacesClient {
    /// Creates a new PlacesClient with the given credential
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            endpoint: PLACES_ENDPOINT.to_string(),
            api_key,
            cache_key: PlacesCacheKey::default(),
        }
    }

    /// Uses a different endpoint (for testing)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Selects the cache key policy
    pub fn with_cache_key(mut self, cache_key: PlacesCacheKey) -> Self {
        self.cache_key = cache_key;
        self
    }

    /// Query parameters for a search around `zipcode`, excluding the API key
    fn search_params(zipcode: &str) -> [(&'static str, String); 5] {
        [
            ("origin", zipcode.to_string()),
            ("radius", SEARCH_RADIUS.to_string()),
            ("maxMatches", MAX_MATCHES.to_string()),
            ("ambiguities", "ignore".to_string()),
            ("outFormat", "json".to_string()),
        ]
    }

    /// Cache key for a search around `zipcode`
    ///
    /// Never contains the API key.
    pub fn cache_key(&self, zipcode: &str) -> Result<String, PlacesError> {
        Ok(match self.cache_key {
            PlacesCacheKey::Endpoint => self.endpoint.clone(),
            PlacesCacheKey::Request => {
                Url::parse_with_params(&self.endpoint, Self::search_params(zipcode))?.to_string()
            }
        })
    }

    /// Full request URL including the API key
    fn request_url(&self, api_key: &str, zipcode: &str) -> Result<Url, PlacesError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("key", api_key)
            .extend_pairs(Self::search_params(zipcode));
        Ok(url)
    }

    /// Fetches the radius search response for the site's zip code
    ///
    /// Returns the decoded JSON body unchanged. A cached response is served
    /// even when no API key is configured. A site without a zip code is
    /// rejected before any request is made.
    pub async fn query_nearby(
        &self,
        fetcher: &mut Fetcher,
        record: &SiteRecord,
    ) -> Result<Value, PlacesError> {
        if record.zipcode.trim().is_empty() {
            return Err(PlacesError::MissingZipcode(record.name.clone()));
        }
        let key = self.cache_key(&record.zipcode)?;
        let url = match (&self.api_key, fetcher.cache().contains(&key)) {
            (Some(api_key), _) => self.request_url(api_key, &record.zipcode)?,
            // Never sent: the cached response is returned without a request.
            (None, true) => Url::parse(&self.endpoint)?,
            (None, false) => return Err(PlacesError::MissingApiKey),
        };

        Ok(fetcher.fetch_json(&key, url).await?)
    }
}

/// A point of interest from a radius search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    /// Name of the place
    pub name: String,
    /// Business category (`group_sic_code_name`)
    pub category: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {} ({}): {}, {}",
            self.name,
            self.category.as_deref().unwrap_or("no category"),
            self.address.as_deref().unwrap_or("no address"),
            self.city.as_deref().unwrap_or("no city"),
        )
    }
}

/// Radius search response, reduced to what is displayed
#[derive(Debug, Deserialize)]
struct RadiusResponse {
    #[serde(rename = "searchResults", default)]
    search_results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: SearchFields,
}

#[derive(Debug, Default, Deserialize)]
struct SearchFields {
    group_sic_code_name: Option<String>,
    address: Option<String>,
    city: Option<String>,
}

/// Enumerates the places in a radius search response
///
/// A response without `searchResults` has no places. Empty field values are
/// treated as missing.
pub fn nearby_places(payload: &Value) -> Result<Vec<Place>, PlacesError> {
    let response = RadiusResponse::deserialize(payload)?;

    Ok(response
        .search_results
        .into_iter()
        .map(|result| Place {
            name: result.name,
            category: non_empty(result.fields.group_sic_code_name),
            address: non_empty(result.fields.address),
            city: non_empty(result.fields.city),
        })
        .collect())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::test_support::serve;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn record(zipcode: &str) -> SiteRecord {
        SiteRecord {
            name: "Isle Royale".to_string(),
            zipcode: zipcode.to_string(),
            ..SiteRecord::default()
        }
    }

    #[test]
    fn test_request_cache_key_includes_params_but_not_api_key() {
        let client = PlacesClient::new(Some("secret-key".to_string()));
        let key = client.cache_key("49931").expect("valid key");

        assert!(key.starts_with(PLACES_ENDPOINT));
        assert!(key.contains("origin=49931"));
        assert!(key.contains("radius=10"));
        assert!(key.contains("maxMatches=10"));
        assert!(key.contains("ambiguities=ignore"));
        assert!(key.contains("outFormat=json"));
        assert!(!key.contains("secret-key"));
    }

    #[test]
    fn test_request_cache_key_differs_per_zipcode() {
        let client = PlacesClient::new(None);
        assert_ne!(
            client.cache_key("49931").expect("valid key"),
            client.cache_key("82190").expect("valid key")
        );
    }

    #[test]
    fn test_endpoint_cache_key_ignores_zipcode() {
        let client = PlacesClient::new(None).with_cache_key(PlacesCacheKey::Endpoint);
        assert_eq!(client.cache_key("49931").expect("valid key"), PLACES_ENDPOINT);
        assert_eq!(client.cache_key("82190").expect("valid key"), PLACES_ENDPOINT);
    }

    #[test]
    fn test_request_url_carries_api_key() {
        let client = PlacesClient::new(None);
        let url = client.request_url("secret-key", "49931").expect("valid url");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(pairs[0], ("key".to_string(), "secret-key".to_string()));
        assert!(pairs.contains(&("origin".to_string(), "49931".to_string())));
        assert_eq!(pairs.len(), 6);
    }

    #[tokio::test]
    async fn test_missing_api_key_without_cache_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut fetcher = Fetcher::new(CacheStore::open(temp_dir.path().join("cache.json")));
        let client = PlacesClient::new(None);

        let result = client.query_nearby(&mut fetcher, &record("49931")).await;

        assert!(matches!(result, Err(PlacesError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_cached_response_served_without_api_key() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let client = PlacesClient::new(None);
        let key = client.cache_key("49931").expect("valid key");
        let mut cache = CacheStore::open(temp_dir.path().join("cache.json"));
        cache
            .insert(key, json!({"searchResults": []}))
            .expect("Seeding should succeed");
        let mut fetcher = Fetcher::new(cache);

        let payload = client
            .query_nearby(&mut fetcher, &record("49931"))
            .await
            .expect("Cached response should be served");

        assert_eq!(payload, json!({"searchResults": []}));
    }

    #[tokio::test]
    async fn test_endpoint_policy_reuses_first_response_for_other_sites() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let client = PlacesClient::new(Some("secret-key".to_string()))
            .with_cache_key(PlacesCacheKey::Endpoint);
        let mut cache = CacheStore::open(temp_dir.path().join("cache.json"));
        cache
            .insert(PLACES_ENDPOINT, json!({"searchResults": [{"name": "First"}]}))
            .expect("Seeding should succeed");
        let mut fetcher = Fetcher::new(cache);

        let payload = client
            .query_nearby(&mut fetcher, &record("82190"))
            .await
            .expect("Cached response should be served");

        assert_eq!(payload["searchResults"][0]["name"], "First");
    }

    #[tokio::test]
    async fn test_query_sends_api_key_but_never_caches_it() {
        let (base, requests) = serve(vec![("200 OK", r#"{"searchResults": [{"name": "Cafe"}]}"#)]);
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("cache.json");
        let mut fetcher = Fetcher::new(CacheStore::open(&path));
        let client = PlacesClient::new(Some("k3y".to_string()))
            .with_endpoint(format!("{}/search/v2/radius", base));

        let payload = client
            .query_nearby(&mut fetcher, &record("49931"))
            .await
            .expect("Query should succeed");

        assert_eq!(payload["searchResults"][0]["name"], "Cafe");
        let request = requests.recv().expect("Server saw a request");
        assert!(
            request.starts_with("GET /search/v2/radius?key=k3y&origin=49931&radius=10"),
            "Unexpected request line: {}",
            request
        );
        let on_disk = fs::read_to_string(&path).expect("Cache file written");
        assert!(on_disk.contains("Cafe"));
        assert!(on_disk.contains("origin=49931"));
        assert!(!on_disk.contains("k3y"));
    }

    #[tokio::test]
    async fn test_missing_zipcode_is_rejected_without_request() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mut fetcher = Fetcher::new(CacheStore::open(temp_dir.path().join("cache.json")));
        // Unroutable endpoint: a request would fail with a fetch error instead.
        let client = PlacesClient::new(Some("k3y".to_string()))
            .with_endpoint("http://127.0.0.1:9/search/v2/radius");

        let result = client.query_nearby(&mut fetcher, &record("  ")).await;

        match result {
            Err(PlacesError::MissingZipcode(name)) => assert_eq!(name, "Isle Royale"),
            other => panic!("Expected MissingZipcode, got {:?}", other),
        }
        assert!(fetcher.cache().is_empty());
    }

    #[test]
    fn test_nearby_places_decodes_fields() {
        let payload = json!({
            "searchResults": [
                {
                    "name": "Keweenaw Co-op",
                    "fields": {
                        "group_sic_code_name": "Grocery Stores",
                        "address": "1035 Ethel Ave",
                        "city": "Hancock"
                    }
                },
                {
                    "name": "Unnamed Spot",
                    "fields": {
                        "group_sic_code_name": "",
                        "city": "Houghton"
                    }
                },
                { "name": "Bare" }
            ]
        });

        let places = nearby_places(&payload).expect("Failed to decode places");

        assert_eq!(places.len(), 3);
        assert_eq!(
            places[0].to_string(),
            "- Keweenaw Co-op (Grocery Stores): 1035 Ethel Ave, Hancock"
        );
        assert_eq!(
            places[1].to_string(),
            "- Unnamed Spot (no category): no address, Houghton"
        );
        assert_eq!(
            places[2].to_string(),
            "- Bare (no category): no address, no city"
        );
    }

    #[test]
    fn test_nearby_places_without_results() {
        let places = nearby_places(&json!({"info": {"statuscode": 0}})).expect("Should decode");
        assert!(places.is_empty());
    }

    #[test]
    fn test_nearby_places_rejects_malformed_results() {
        let result = nearby_places(&json!({"searchResults": "oops"}));
        assert!(matches!(result, Err(PlacesError::ParseError(_))));
    }
}
