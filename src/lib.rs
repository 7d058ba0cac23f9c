//! npsfind library
//!
//! Scrapes the National Park Service site directory through a persistent
//! fetch-or-cache layer and looks up places near each site.

pub mod cache;
pub mod cli;
pub mod data;
pub mod fetch;
pub mod prompt;

#[cfg(test)]
mod test_support;
