//! Command-line interface parsing for npsfind
//!
//! Arguments fall back to environment variables (a `.env` file in the working
//! directory is loaded before parsing), and are resolved into a
//! [`StartupConfig`] before anything touches the network.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use url::Url;

use crate::cache::CacheStore;
use crate::data::nps::NPS_BASE_URL;
use crate::data::PlacesCacheKey;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The directory base URL is not an absolute URL
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The directory base URL has a path; site links are root-relative and would ignore it
    #[error("Base URL '{0}' must not have a path (use scheme, host and port only)")]
    BaseUrlHasPath(String),
}

/// npsfind - Browse national park sites by state and find places nearby
#[derive(Parser, Debug)]
#[command(name = "npsfind")]
#[command(about = "Browse national park sites by state and find places nearby")]
#[command(version)]
pub struct Cli {
    /// JSON file holding cached pages and API responses
    #[arg(long, env = "NPSFIND_CACHE_FILE", value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// MapQuest API key used for nearby place searches
    #[arg(long, env = "MAPQUEST_API_KEY", hide_env_values = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Base URL of the park directory site (scheme, host and port only)
    #[arg(long, default_value = NPS_BASE_URL, value_name = "URL")]
    pub base_url: String,

    /// How nearby place responses are keyed in the cache
    ///
    /// `endpoint` reuses the first response for every site; `request` caches
    /// one response per zip code.
    #[arg(long, value_enum, default_value = "request")]
    pub places_cache_key: PlacesCacheKey,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Location of the cache file
    pub cache_path: PathBuf,
    /// MapQuest API key, if one was supplied
    pub api_key: Option<String>,
    /// Base URL of the park directory
    pub base_url: Url,
    /// Cache key policy for nearby place searches
    pub places_cache_key: PlacesCacheKey,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with defaults filled in
    /// * `Err(CliError)` if the base URL is invalid or has a path
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let base_url = Url::parse(&cli.base_url).map_err(|source| CliError::InvalidBaseUrl {
            url: cli.base_url.clone(),
            source,
        })?;
        if base_url.path() != "/" {
            return Err(CliError::BaseUrlHasPath(cli.base_url.clone()));
        }

        Ok(StartupConfig {
            cache_path: cli
                .cache_file
                .clone()
                .unwrap_or_else(CacheStore::default_path),
            api_key: cli
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            base_url,
            places_cache_key: cli.places_cache_key,
        })
    }
}
