use super::{element_text, parse_selector, PageParser};
use crate::config::EventsSite;
use crate::domain::Event;
use crate::error::Result;
use crate::services::text_utils::{clean_text, truncate_with_ellipsis};
use scraper::{ElementRef, Html, Selector};
use tracing::info;

struct EventSelectors {
    card: Selector,
    fallback_card: Selector,
    title: Selector,
    date: Selector,
    schedule: Selector,
    description: Selector,
    image: Selector,
}

/// Reads the event list of a The Events Calendar (tribe-events) page.
pub struct GatewayEventsScraper {
    selectors: EventSelectors,
    max_events: usize,
    description_limit: usize,
}

impl GatewayEventsScraper {
    pub fn new(site: &EventsSite) -> Result<Self> {
        Ok(Self {
            selectors: EventSelectors {
                card: parse_selector(&site.card_selector)?,
                fallback_card: parse_selector(&site.fallback_card_selector)?,
                title: parse_selector(&site.title_selector)?,
                date: parse_selector(&site.date_selector)?,
                schedule: parse_selector(&site.schedule_selector)?,
                description: parse_selector(&site.description_selector)?,
                image: parse_selector(&site.image_selector)?,
            },
            max_events: site.max_events,
            description_limit: site.description_limit,
        })
    }

    fn first_text(&self, card: ElementRef<'_>, selector: &Selector) -> Option<String> {
        card.select(selector)
            .next()
            .map(|el| clean_text(&element_text(el)))
    }

    fn event_from_card(&self, card: ElementRef<'_>) -> Option<Event> {
        let title = self.first_text(card, &self.selectors.title)?;

        let date = self
            .first_text(card, &self.selectors.date)
            .or_else(|| self.first_text(card, &self.selectors.schedule))
            .unwrap_or_else(|| "See details".to_string());

        let description = self
            .first_text(card, &self.selectors.description)
            .map(|d| truncate_with_ellipsis(&d, self.description_limit))
            .unwrap_or_default();

        let image = card
            .select(&self.selectors.image)
            .next()
            .and_then(|img| {
                let value = img.value();
                value
                    .attr("src")
                    .filter(|src| !src.is_empty())
                    .or_else(|| value.attr("data-src"))
            })
            .map(|src| src.split('?').next().unwrap_or_default().to_string())
            .unwrap_or_default();

        Some(Event {
            title,
            date,
            description,
            image,
        })
    }
}

impl PageParser for GatewayEventsScraper {
    type Item = Event;

    fn parse(&self, document: &Html) -> Result<Vec<Event>> {
        let mut cards: Vec<ElementRef<'_>> = document.select(&self.selectors.card).collect();
        if cards.is_empty() {
            cards = document.select(&self.selectors.fallback_card).collect();
        }
        info!("Found {} event entries", cards.len());

        Ok(cards
            .into_iter()
            .filter_map(|card| self.event_from_card(card))
            .take(self.max_events)
            .collect())
    }
}
