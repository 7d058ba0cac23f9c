//! National Park Service site directory client
//!
//! Walks the directory from the home page's state menu down to individual
//! site records. Every page goes through the shared [`Fetcher`], so a rerun
//! only touches the network for pages it has not seen before.

use tracing::debug;
use url::Url;

use super::directory::parse_region_index;
use super::listing::parse_site_urls;
use super::site::parse_site;
use super::{RegionDirectory, ScrapeError, SiteRecord};
use crate::fetch::Fetcher;

/// Base URL of the National Park Service site
pub const NPS_BASE_URL: &str = "https://www.nps.gov";

/// Path of the directory home page, relative to the base URL
const INDEX_PAGE: &str = "index.htm";

/// Client for scraping the park directory
#[derive(Debug, Clone)]
pub struct NpsClient {
    /// Base URL every relative link is resolved against
    base_url: Url,
}

impl Default for NpsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NpsClient {
    /// Creates a new NpsClient for nps.gov
    pub fn new() -> Self {
        Self {
            base_url: Url::parse(NPS_BASE_URL).expect("NPS_BASE_URL is a valid URL"),
        }
    }

    /// Creates a new NpsClient with a custom base URL (for mirrors and testing)
    ///
    /// Site links on the directory are root-relative, so only the scheme,
    /// host and port of `base_url` take effect.
    pub fn with_base_url(base_url: Url) -> Self {
        Self { base_url }
    }

    /// URL of the directory home page
    pub fn index_url(&self) -> Result<String, ScrapeError> {
        Ok(self.base_url.join(INDEX_PAGE)?.to_string())
    }

    /// Builds the mapping from state name to state listing URL
    pub async fn build_region_index(
        &self,
        fetcher: &mut Fetcher,
    ) -> Result<RegionDirectory, ScrapeError> {
        let url = self.index_url()?;
        let html = fetcher.fetch_page(&url).await?;
        let directory = parse_region_index(&html, &self.base_url, &url)?;
        debug!(regions = directory.len(), "built region index");
        Ok(directory)
    }

    /// Lists the detail page URLs of every site on a state page, in page order
    pub async fn list_site_urls(
        &self,
        fetcher: &mut Fetcher,
        region_url: &str,
    ) -> Result<Vec<String>, ScrapeError> {
        let html = fetcher.fetch_page(region_url).await?;
        parse_site_urls(&html, &self.base_url, region_url)
    }

    /// Scrapes one site detail page
    pub async fn extract_site(
        &self,
        fetcher: &mut Fetcher,
        site_url: &str,
    ) -> Result<SiteRecord, ScrapeError> {
        let html = fetcher.fetch_page(site_url).await?;
        parse_site(&html, site_url)
    }

    /// Scrapes every site listed on a state page, in page order
    ///
    /// Stops at the first site that cannot be fetched or parsed.
    pub async fn sites_for_region(
        &self,
        fetcher: &mut Fetcher,
        region_url: &str,
    ) -> Result<Vec<SiteRecord>, ScrapeError> {
        let urls = self.list_site_urls(fetcher, region_url).await?;
        let mut sites = Vec::with_capacity(urls.len());
        for url in &urls {
            sites.push(self.extract_site(fetcher, url).await?);
        }
        Ok(sites)
    }
}
