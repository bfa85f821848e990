use crate::domain::storage::StorageKeys;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub listings: ListingSite,
    pub events: EventsSite,
    pub movies: MoviesSite,
}

/// How the listings search moves from one result page to the next.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PaginationMode {
    /// Deep-linking through a query parameter, e.g. `&page=3`.
    Url { param: String },
    /// Activating a "next" control on the rendered page.
    Click { next_selector: String },
}

impl Default for PaginationMode {
    fn default() -> Self {
        PaginationMode::Url {
            param: "page".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingSite {
    pub search_url: String,
    pub origin: String,
    pub card_selector: String,
    pub address_selector: String,
    pub details_selector: String,
    pub link_selector: String,
    pub pagination: PaginationMode,
    pub max_pages: u32,
    pub navigation_timeout_ms: u64,
    pub initial_settle_ms: u64,
    pub page_settle_ms: u64,
    pub attribute_timeout_ms: u64,
    pub diagnostic_path: PathBuf,
    pub output: String,
}

impl Default for ListingSite {
    fn default() -> Self {
        Self {
            search_url: "https://www.utahrealestate.com/search/public.search?type=1&zip=84101"
                .to_string(),
            origin: "https://www.utahrealestate.com".to_string(),
            card_selector: ".public-detail-quickview".to_string(),
            address_selector: "h2.public".to_string(),
            details_selector: ".public-detail-overview".to_string(),
            link_selector: "li.view-prop-details a".to_string(),
            pagination: PaginationMode::default(),
            max_pages: 10,
            navigation_timeout_ms: 60_000,
            initial_settle_ms: 5_000,
            page_settle_ms: 4_000,
            attribute_timeout_ms: 500,
            diagnostic_path: PathBuf::from("error_snapshot.html"),
            output: StorageKeys::LISTINGS.to_string(),
        }
    }
}

impl ListingSite {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn initial_settle(&self) -> Duration {
        Duration::from_millis(self.initial_settle_ms)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn attribute_timeout(&self) -> Duration {
        Duration::from_millis(self.attribute_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsSite {
    pub url: String,
    pub card_selector: String,
    pub fallback_card_selector: String,
    pub title_selector: String,
    pub date_selector: String,
    pub schedule_selector: String,
    pub description_selector: String,
    pub image_selector: String,
    pub max_events: usize,
    pub description_limit: usize,
    pub timeout_secs: u64,
    pub delay_ms: u64,
}

impl Default for EventsSite {
    fn default() -> Self {
        Self {
            url: "https://atthegateway.com/calendar/".to_string(),
            card_selector: ".tribe-events-calendar-list__event-row".to_string(),
            fallback_card_selector: ".type-tribe_events".to_string(),
            title_selector:
                ".tribe-events-calendar-list__event-title, .tribe-events-list-event-title"
                    .to_string(),
            date_selector: "time".to_string(),
            schedule_selector: ".tribe-event-schedule-details".to_string(),
            description_selector:
                ".tribe-events-calendar-list__event-description, .tribe-events-list-event-description"
                    .to_string(),
            image_selector:
                ".tribe-events-calendar-list__event-featured-image-wrapper img, .tribe-events-event-image img"
                    .to_string(),
            max_events: 4,
            description_limit: 100,
            timeout_secs: 15,
            delay_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MoviesSite {
    pub url: String,
    pub poster_dir: String,
    pub max_showtimes: usize,
    pub timeout_secs: u64,
}

impl Default for MoviesSite {
    fn default() -> Self {
        Self {
            url: "https://www.imdb.com/showtimes/cinema/US/ci0011810/US/84062/".to_string(),
            poster_dir: "posters".to_string(),
            max_showtimes: 5,
            timeout_secs: 15,
        }
    }
}
