use std::time::Duration;

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "http://www.bcpa.net/";
pub const DEFAULT_SEARCH_PATH: &str = "RecAddr.asp";
pub const SEARCH_FORM_NAME: &str = "homeind";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub search_path: String,
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub card_concurrency: usize,
    /// Look for an optional "Units" row in the land table. Turn off for
    /// layouts that always print both the units and building rows.
    pub sniff_units_row: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            user_agent: concat!("bcpa_scraper/", env!("CARGO_PKG_VERSION")).to_string(),
            fetch_timeout_secs: 30,
            card_concurrency: 4,
            sniff_units_row: true,
        }
    }
}

impl Settings {
    /// Defaults, then `bcpa.toml` if present, then `BCPA_*` environment variables.
    pub fn load() -> Result<Self> {
        let d = Settings::default();
        let settings = Config::builder()
            .set_default("base_url", d.base_url)?
            .set_default("search_path", d.search_path)?
            .set_default("user_agent", d.user_agent)?
            .set_default("fetch_timeout_secs", d.fetch_timeout_secs)?
            .set_default("card_concurrency", d.card_concurrency as u64)?
            .set_default("sniff_units_row", d.sniff_units_row)?
            .add_source(File::with_name("bcpa").required(false))
            .add_source(Environment::with_prefix("BCPA").try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, self.search_path)
    }
}
