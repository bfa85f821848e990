use crate::error::{Result, ScrapeError};
use scraper::{ElementRef, Html, Selector};

pub(crate) mod gateway_events;
pub(crate) mod imdb_showtimes;

/// Turns one fetched page into the items a site publishes.
pub trait PageParser {
    type Item;

    fn parse(&self, document: &Html) -> Result<Vec<Self::Item>>;
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector(e.to_string()))
}

/// All text below `element`, concatenated.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}
