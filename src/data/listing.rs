//! Site listing parsing for a region page

use scraper::Html;
use tracing::debug;
use url::Url;

use super::{selector, ScrapeError};

/// Container holding the list of parks on a state page
const LISTING_CONTAINER: &str = "#list_parks";

/// File name appended to a site's path to reach its detail page
const DETAIL_PAGE: &str = "index.htm";

/// Enumerates the detail page URLs listed on a region page, in page order
///
/// Each `h3` heading inside the listing container links to a site directory
/// (e.g. `/isro/`); the detail URL is that path resolved against `base` with
/// `index.htm` appended. Headings without a link are skipped.
pub fn parse_site_urls(html: &str, base: &Url, page_url: &str) -> Result<Vec<String>, ScrapeError> {
    let document = Html::parse_document(html);
    let container = document
        .select(&selector(LISTING_CONTAINER)?)
        .next()
        .ok_or_else(|| ScrapeError::missing(page_url, LISTING_CONTAINER))?;
    let heading = selector("h3")?;
    let link = selector("a[href]")?;

    let mut urls = Vec::new();
    for entry in container.select(&heading) {
        match entry.select(&link).next().and_then(|a| a.value().attr("href")) {
            Some(href) => urls.push(format!("{}{}", base.join(href)?, DETAIL_PAGE)),
            None => debug!(page = page_url, "skipping listing heading without a link"),
        }
    }

    Ok(urls)
}
