use crate::config::cli::Args;
use crate::error::Result;
use clap::Parser;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub(crate) mod cli;
pub(crate) mod sites;

pub use sites::{EventsSite, ListingSite, MoviesSite, PaginationMode, ScraperConfig};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct Config {
    pub args: Args,
    pub scraper_config: ScraperConfig,
    pub http_client: Client,
}

impl Config {
    pub fn new() -> Result<Self> {
        let args = Args::parse();

        let mut scraper_config = Self::load_scraper_config(&args.config_file)?;
        if let Some(max_pages) = args.max_pages {
            scraper_config.listings.max_pages = max_pages;
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            args,
            scraper_config,
            http_client,
        })
    }

    /// Reads the site configuration. A missing file means every site runs
    /// with its built-in defaults.
    fn load_scraper_config(path: &Path) -> Result<ScraperConfig> {
        if !path.exists() {
            return Ok(ScraperConfig::default());
        }
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }

    pub fn ensure_directories(&self) -> Result<()> {
        if !self.args.data_dir.exists() {
            std::fs::create_dir_all(&self.args.data_dir)?;
        }

        info!("Data dir {:?} exists", self.args.data_dir);
        Ok(())
    }
}
