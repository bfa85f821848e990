use crate::config::EventsSite;
use crate::domain::storage::Storage;
use crate::domain::Event;
use crate::error::Result;
use crate::infrastructure::{GatewayEventsScraper, PageParser};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

pub struct EventsService {
    client: Client,
    site: EventsSite,
    scraper: GatewayEventsScraper,
    store: Arc<dyn Storage>,
}

impl EventsService {
    pub fn new(client: Client, site: EventsSite, store: Arc<dyn Storage + 'static>) -> Result<Self> {
        info!("Created new Events service");
        Ok(Self {
            client,
            scraper: GatewayEventsScraper::new(&site)?,
            site,
            store,
        })
    }

    /// Refreshes `gateway_events.json`. The file always ends up with at
    /// least one entry; a placeholder stands in when the calendar is
    /// unreachable or empty.
    pub async fn run(&self) -> Result<Vec<Event>> {
        info!("Scraping events from {}", self.site.url);

        let events = self.collect().await;
        self.store.save_events(&events)?;
        info!("Saved {} events", events.len());

        Ok(events)
    }

    async fn collect(&self) -> Vec<Event> {
        let body = match self.fetch().await {
            Ok(body) => body,
            Err(e) => {
                error!("Could not fetch events calendar: {}", e);
                return vec![Event::unreachable_placeholder()];
            }
        };

        let events = match self.scraper.parse(&Html::parse_document(&body)) {
            Ok(events) => events,
            Err(e) => {
                warn!("Could not parse events calendar: {}", e);
                Vec::new()
            }
        };

        if events.is_empty() {
            warn!("No events parsed, using placeholder");
            return vec![Event::empty_calendar_placeholder()];
        }
        events
    }

    async fn fetch(&self) -> Result<String> {
        if self.site.delay_ms > 0 {
            sleep(Duration::from_millis(self.site.delay_ms)).await;
        }

        let body = self
            .client
            .get(&self.site.url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .header(CONNECTION, "keep-alive")
            .timeout(Duration::from_secs(self.site.timeout_secs))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}
