use crate::config::cli::Command;
use crate::config::Config;
use crate::domain::storage::Storage;
use crate::error::Result;
use crate::infrastructure::HttpLauncher;
use crate::services::events::EventsService;
use crate::services::listings::ListingService;
use crate::services::movies::MoviesService;
use std::sync::Arc;
use tracing::{error, info};

/// Refreshes the board's data files.
pub struct UpdateService {
    events: EventsService,
    movies: MoviesService,
    listings: ListingService<HttpLauncher>,
}

impl UpdateService {
    pub fn new(config: &Config, store: Arc<dyn Storage + 'static>) -> Result<Self> {
        let sites = &config.scraper_config;
        let client = config.http_client.clone();

        Ok(Self {
            events: EventsService::new(client.clone(), sites.events.clone(), Arc::clone(&store))?,
            movies: MoviesService::new(
                client.clone(),
                sites.movies.clone(),
                &config.args.data_dir,
                Arc::clone(&store),
            ),
            listings: ListingService::new(
                HttpLauncher::new(client),
                sites.listings.clone(),
                store,
                config.args.keep_previous_on_failure,
            ),
        })
    }

    /// Runs the scrapers `command` names. With [`Command::All`] each scraper
    /// runs even when an earlier one failed.
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Events => {
                self.events.run().await?;
            }
            Command::Movies => {
                self.movies.run().await?;
            }
            Command::Listings => {
                self.listings.run().await?;
            }
            Command::All => {
                info!("Running all scrapers");
                if let Err(e) = self.events.run().await {
                    error!("Events update failed: {}", e);
                }
                if let Err(e) = self.movies.run().await {
                    error!("Movies update failed: {}", e);
                }
                if let Err(e) = self.listings.run().await {
                    error!("Listings update failed: {}", e);
                }
            }
        }
        Ok(())
    }
}
