//! Site detail page parsing
//!
//! Extracts a [`SiteRecord`] from a park's home page. Category and the
//! address block are optional on real pages and default to empty strings;
//! the title and telephone block are always present on a valid page, so their
//! absence is reported as an error.

use scraper::{ElementRef, Html};

use super::{element_text, selector, ScrapeError, SiteRecord};

const CATEGORY: &str = "span.Hero-designation";
const NAME: &str = "a.Hero-title";
const ADDRESS_BLOCK: &str = ".adr";
const PHONE: &str = "span.tel";

/// Parses a site detail page into a record
pub fn parse_site(html: &str, page_url: &str) -> Result<SiteRecord, ScrapeError> {
    let document = Html::parse_document(html);

    let category = first_text(&document, CATEGORY)?.unwrap_or_default();
    let name = first_text(&document, NAME)?.ok_or_else(|| ScrapeError::missing(page_url, NAME))?;
    let (address, zipcode) = parse_address(&document)?.unwrap_or_default();
    let phone = parse_phone(&document, page_url)?;

    Ok(SiteRecord {
        category,
        name,
        address,
        zipcode,
        phone,
    })
}

/// Trimmed text of the first element matching `css`, if any
fn first_text(document: &Html, css: &'static str) -> Result<Option<String>, ScrapeError> {
    Ok(document.select(&selector(css)?).next().map(element_text))
}

/// Extracts `("City, ST", "zip")` from the address microformat block
///
/// The locality line is the second `span` inside the `.adr` block; the city is
/// its first nested `span`, the state its `.region`, the zip its
/// `.postal-code`. Returns `None` if any of those pieces is missing, so the
/// address and zip code are always either both present or both blank.
fn parse_address(document: &Html) -> Result<Option<(String, String)>, ScrapeError> {
    let Some(block) = document.select(&selector(ADDRESS_BLOCK)?).next() else {
        return Ok(None);
    };
    let span = selector("span")?;
    let Some(line) = block.select(&span).nth(1) else {
        return Ok(None);
    };

    let city = line.select(&span).next().map(element_text);
    let region = first_in(line, ".region")?;
    let zipcode = first_in(line, ".postal-code")?.and_then(|raw| normalize_zipcode(&raw));

    Ok(match (city, region, zipcode) {
        (Some(city), Some(region), Some(zipcode)) => Some((format!("{}, {}", city, region), zipcode)),
        _ => None,
    })
}

fn first_in(element: ElementRef<'_>, css: &'static str) -> Result<Option<String>, ScrapeError> {
    Ok(element.select(&selector(css)?).next().map(element_text))
}

/// Reduces a postal code field to its five digit zip
///
/// Keeps the first whitespace-delimited token and drops a ZIP+4 extension,
/// so `"49931   "`, `"49931 1234"` and `"49931-1234"` all become `"49931"`.
pub fn normalize_zipcode(raw: &str) -> Option<String> {
    let token = raw.split_whitespace().next()?;
    token
        .split('-')
        .next()
        .filter(|zip| !zip.is_empty())
        .map(str::to_string)
}

/// The phone number is the second line of the telephone block; the first
/// line holds the label or is blank.
fn parse_phone(document: &Html, page_url: &str) -> Result<String, ScrapeError> {
    let block = document
        .select(&selector(PHONE)?)
        .next()
        .ok_or_else(|| ScrapeError::missing(page_url, PHONE))?;
    let text: String = block.text().collect();

    text.split('\n')
        .nth(1)
        .map(|line| line.trim().to_string())
        .ok_or_else(|| ScrapeError::missing(page_url, "span.tel phone line"))
}
