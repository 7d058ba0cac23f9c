//! Interactive prompt for browsing sites by state
//!
//! Reads commands line by line and writes results as plain text, so a session
//! can be driven from a terminal or from an in-memory buffer.

use std::io::{self, BufRead, Lines, Write};

use tracing::warn;

use crate::data::{nearby_places, NpsClient, PlacesClient, RegionDirectory, ScrapeError, SiteRecord};
use crate::fetch::Fetcher;

const SEPARATOR: &str = "----------------------------------";
const REGION_PROMPT: &str = "Enter a state name (e.g. Michigan, michigan) or \"exit\"";
const SITE_PROMPT: &str = "Choose the number for detail search or \"exit\" or \"back\"";

/// What the user asked for after viewing a state listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Back,
    Exit,
}

/// Interactive session over the shared fetcher
pub struct Explorer {
    fetcher: Fetcher,
    nps: NpsClient,
    places: PlacesClient,
}

impl Explorer {
    /// Creates a new Explorer
    pub fn new(fetcher: Fetcher, nps: NpsClient, places: PlacesClient) -> Self {
        Self {
            fetcher,
            nps,
            places,
        }
    }

    /// Builds the state index the prompt resolves names against
    pub async fn build_region_index(&mut self) -> Result<RegionDirectory, ScrapeError> {
        self.nps.build_region_index(&mut self.fetcher).await
    }

    /// Runs the prompt until the user exits or the input ends
    ///
    /// Lookup failures are reported on `output` and the prompt continues;
    /// only I/O errors on `input`/`output` end the session early.
    pub async fn run<R: BufRead, W: Write>(
        &mut self,
        regions: &RegionDirectory,
        input: R,
        mut output: W,
    ) -> io::Result<()> {
        let mut lines = input.lines();

        loop {
            let Some(answer) = read_answer(&mut lines, &mut output, REGION_PROMPT)? else {
                break;
            };
            let name = answer.to_lowercase();
            if name == "exit" {
                break;
            }
            let Some(region_url) = regions.get(&name) else {
                writeln!(output, "[Error] Enter proper state name")?;
                continue;
            };

            let sites = match self.nps.sites_for_region(&mut self.fetcher, region_url).await {
                Ok(sites) => sites,
                Err(e) => {
                    warn!(region = %name, error = %e, "failed to load sites");
                    writeln!(output, "[Error] {}", e)?;
                    continue;
                }
            };

            writeln!(output, "{}", SEPARATOR)?;
            writeln!(output, "List of national sites in {}", name)?;
            writeln!(output, "{}", SEPARATOR)?;
            for (i, site) in sites.iter().enumerate() {
                writeln!(output, "[{}] {}", i + 1, site)?;
            }

            if self.choose_sites(&sites, &mut lines, &mut output).await? == Flow::Exit {
                break;
            }
        }

        Ok(())
    }

    /// Second-level loop: show nearby places for chosen sites
    async fn choose_sites<R: BufRead, W: Write>(
        &mut self,
        sites: &[SiteRecord],
        lines: &mut Lines<R>,
        output: &mut W,
    ) -> io::Result<Flow> {
        loop {
            let Some(answer) = read_answer(lines, output, SITE_PROMPT)? else {
                return Ok(Flow::Exit);
            };
            match answer.to_lowercase().as_str() {
                "back" => return Ok(Flow::Back),
                "exit" => return Ok(Flow::Exit),
                _ => {}
            }
            let Some(index) = parse_selection(&answer, sites.len()) else {
                writeln!(output, "[Error] Invalid input")?;
                continue;
            };

            let site = &sites[index];
            self.show_nearby(site, output).await?;
        }
    }

    async fn show_nearby<W: Write>(&mut self, site: &SiteRecord, output: &mut W) -> io::Result<()> {
        let places = self
            .places
            .query_nearby(&mut self.fetcher, site)
            .await
            .and_then(|payload| nearby_places(&payload));

        match places {
            Ok(places) => {
                writeln!(output, "{}", SEPARATOR)?;
                writeln!(output, "Places near {}", site.name)?;
                writeln!(output, "{}", SEPARATOR)?;
                for place in places {
                    writeln!(output, "{}", place)?;
                }
            }
            Err(e) => {
                warn!(site = %site.name, error = %e, "nearby search failed");
                writeln!(output, "[Error] {}", e)?;
            }
        }
        Ok(())
    }
}

/// Prints `prompt` and reads the next trimmed line; `None` at end of input
fn read_answer<R: BufRead, W: Write>(
    lines: &mut Lines<R>,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    writeln!(output, "{}", prompt)?;
    write!(output, ":")?;
    output.flush()?;
    match lines.next() {
        Some(line) => Ok(Some(line?.trim().to_string())),
        None => Ok(None),
    }
}

/// Converts a 1-based menu choice into an index into a list of `count` items
pub fn parse_selection(answer: &str, count: usize) -> Option<usize> {
    let choice: usize = answer.trim().parse().ok()?;
    (1..=count).contains(&choice).then(|| choice - 1)
}
