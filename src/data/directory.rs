//! Region index parsing for the park directory home page
//!
//! The home page carries a "find a park by state" dropdown. Each entry of that
//! menu becomes one region in the [`RegionDirectory`].

use std::collections::BTreeMap;

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use super::{element_text, selector, RegionDirectory, ScrapeError};

/// Selector for the state dropdown on the home page
const REGION_MENU: &str = "ul.dropdown-menu.SearchBar-keywordSearch";

/// Builds the region index from the directory home page
///
/// Keys are the lowercase entry labels, values the entry links resolved
/// against `base`. Entries without a link are skipped. A page without the
/// region menu is an error.
pub fn parse_region_index(
    html: &str,
    base: &Url,
    page_url: &str,
) -> Result<RegionDirectory, ScrapeError> {
    let document = Html::parse_document(html);
    let menu = document
        .select(&selector(REGION_MENU)?)
        .next()
        .ok_or_else(|| ScrapeError::missing(page_url, REGION_MENU))?;
    let link = selector("a[href]")?;

    let mut regions = BTreeMap::new();
    for item in menu
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "li")
    {
        let name = element_text(item).to_lowercase();
        let Some(href) = item
            .select(&link)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            debug!(region = %name, "skipping region entry without a link");
            continue;
        };
        regions.insert(name, base.join(href)?.to_string());
    }

    Ok(RegionDirectory::from(regions))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME_PAGE: &str = r#"
        <html><body>
        <ul class="dropdown-menu SearchBar-keywordSearch">
            <li><a href="/state/al/index.htm">Alabama</a></li>
            <li><a href="/state/mi/index.htm">Michigan</a></li>
            <li><a href="/state/wy/index.htm">Wyoming</a></li>
        </ul>
        <ul class="dropdown-menu">
            <li><a href="/topics/index.htm">Topics</a></li>
        </ul>
        </body></html>
    "#;

    fn base() -> Url {
        Url::parse("https://www.nps.gov").expect("valid base")
    }

    #[test]
    fn test_parse_region_index() {
        let directory = parse_region_index(HOME_PAGE, &base(), "https://www.nps.gov/index.htm")
            .expect("Failed to parse home page");

        assert_eq!(directory.len(), 3);
        assert_eq!(
            directory.get("michigan"),
            Some("https://www.nps.gov/state/mi/index.htm")
        );
        assert_eq!(
            directory.get("wyoming"),
            Some("https://www.nps.gov/state/wy/index.htm")
        );
        assert_eq!(directory.get("topics"), None);
    }

    #[test]
    fn test_keys_are_lowercase() {
        let directory = parse_region_index(HOME_PAGE, &base(), "https://www.nps.gov/index.htm")
            .expect("Failed to parse home page");

        let names: Vec<&str> = directory.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alabama", "michigan", "wyoming"]);
    }

    #[test]
    fn test_entries_without_links_are_skipped() {
        let html = r#"
            <ul class="dropdown-menu SearchBar-keywordSearch">
                <li><a href="/state/mi/index.htm">Michigan</a></li>
                <li>No link here</li>
            </ul>
        "#;
        let directory = parse_region_index(html, &base(), "https://www.nps.gov/index.htm")
            .expect("Failed to parse menu");

        assert_eq!(directory.len(), 1);
        assert!(directory.get("no link here").is_none());
    }

    #[test]
    fn test_missing_menu_is_an_error() {
        let html = "<html><body><p>Maintenance</p></body></html>";
        let result = parse_region_index(html, &base(), "https://www.nps.gov/index.htm");

        match result {
            Err(ScrapeError::MissingElement { element, .. }) => assert_eq!(element, REGION_MENU),
            other => panic!("Expected MissingElement, got {:?}", other),
        }
    }
}
