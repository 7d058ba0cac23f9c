//! Core data models for the park sites explorer
//!
//! This module contains the records scraped from the park directory, the
//! region index, and the clients that produce them through the shared
//! [`Fetcher`](crate::fetch::Fetcher).

pub mod directory;
pub mod listing;
pub mod nps;
pub mod places;
pub mod site;

pub use nps::NpsClient;
pub use places::{nearby_places, Place, PlacesCacheKey, PlacesClient, PlacesError};

use std::collections::BTreeMap;
use std::fmt;

use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur when scraping the park directory
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Page could not be retrieved
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A required element is absent, usually because the upstream layout changed
    #[error("Missing expected element '{element}' on {url}")]
    MissingElement {
        /// Page being parsed
        url: String,
        /// Selector or description of the missing element
        element: &'static str,
    },

    /// A link could not be resolved to an absolute URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A built-in CSS selector failed to parse
    #[error("Invalid selector '{0}'")]
    InvalidSelector(&'static str),
}

impl ScrapeError {
    fn missing(url: &str, element: &'static str) -> Self {
        ScrapeError::MissingElement {
            url: url.to_string(),
            element,
        }
    }
}

/// One national site scraped from its detail page
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Designation such as "National Park"; empty for some sites
    pub category: String,
    /// Name of the site, e.g. "Isle Royale"
    pub name: String,
    /// City and state, e.g. "Houghton, MI"; empty when the page has no address
    pub address: String,
    /// Five digit zip code; empty when the page has no address
    pub zipcode: String,
    /// Phone number, e.g. "(906) 482-0984"
    pub phone: String,
}

impl fmt::Display for SiteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} {}",
            self.name, self.category, self.address, self.zipcode
        )
    }
}

/// Mapping from lowercase region (state) name to its listing page URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionDirectory {
    regions: BTreeMap<String, String>,
}

impl RegionDirectory {
    /// Looks up a region by name, ignoring case and surrounding whitespace
    pub fn get(&self, name: &str) -> Option<&str> {
        self.regions
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Number of regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no regions were found
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterates regions in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.regions.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes the directory, returning the underlying map
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.regions
    }
}

impl From<BTreeMap<String, String>> for RegionDirectory {
    fn from(regions: BTreeMap<String, String>) -> Self {
        Self { regions }
    }
}

/// Parses one of the crate's fixed CSS selectors
pub(crate) fn selector(css: &'static str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|_| ScrapeError::InvalidSelector(css))
}

/// Concatenated, trimmed text content of an element
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
