use super::dedup::SeenUnits;
use super::matching::matches;
use crate::config::ListingSite;
use crate::domain::{ListingCandidate, ListingRecord, CALL_FOR_PRICE, DETAILS_NOT_FOUND};
use crate::error::Result;
use crate::infrastructure::PageElement;
use crate::services::text_utils::{clean_text, derive_unit, extract_price, normalize_text};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

/// Turns one result card into at most one listing record.
pub struct RecordExtractor {
    address_selector: String,
    details_selector: String,
    link_selector: String,
    origin: Url,
    attribute_timeout: Duration,
}

impl RecordExtractor {
    pub fn new(site: &ListingSite) -> Result<Self> {
        Ok(Self {
            address_selector: site.address_selector.clone(),
            details_selector: site.details_selector.clone(),
            link_selector: site.link_selector.clone(),
            origin: Url::parse(&site.origin)?,
            attribute_timeout: site.attribute_timeout(),
        })
    }

    /// Reads the card's text and address. Cards without an address element
    /// (or with a blank one) produce no candidate.
    pub async fn candidate<E: PageElement>(&self, card: &E) -> Result<Option<ListingCandidate>> {
        let addresses = card.query_all(&self.address_selector).await?;
        let Some(address) = addresses.first() else {
            return Ok(None);
        };

        // Text content, so markup inside the heading does not split the unit.
        let address = normalize_text(&address.text().await?);
        if address.is_empty() {
            return Ok(None);
        }

        Ok(Some(ListingCandidate {
            raw_text: card.inner_text().await?.to_uppercase(),
            address,
        }))
    }

    /// Applies the allow-list and field rules to `card`. Returns `None` for
    /// cards that are not tracked properties and for units already in `seen`.
    pub async fn extract<E: PageElement>(
        &self,
        card: &E,
        seen: &SeenUnits,
    ) -> Result<Option<ListingRecord>> {
        let Some(candidate) = self.candidate(card).await? else {
            return Ok(None);
        };

        if !matches(&candidate.address) {
            return Ok(None);
        }

        let price =
            extract_price(&candidate.raw_text).unwrap_or_else(|| CALL_FOR_PRICE.to_string());

        let unit = derive_unit(&candidate.address);
        if seen.contains(&unit) {
            debug!("Skipping repeated unit {}", unit);
            return Ok(None);
        }

        let details = match card.query_all(&self.details_selector).await?.first() {
            Some(overview) => clean_text(&overview.inner_text().await?),
            None => DETAILS_NOT_FOUND.to_string(),
        };

        let link = self.resolve_link(card).await;

        Ok(Some(ListingRecord {
            unit,
            price,
            details,
            link,
        }))
    }

    /// Absolute URL of the card's details link, or empty when it cannot be
    /// read in time.
    async fn resolve_link<E: PageElement>(&self, card: &E) -> String {
        match timeout(self.attribute_timeout, self.link_href(card)).await {
            Ok(Ok(Some(href))) => self.absolutize(&href),
            Ok(Ok(None)) => String::new(),
            Ok(Err(e)) => {
                debug!("Link lookup failed: {}", e);
                String::new()
            }
            Err(_) => {
                debug!("Link lookup timed out");
                String::new()
            }
        }
    }

    async fn link_href<E: PageElement>(&self, card: &E) -> Result<Option<String>> {
        match card.query_all(&self.link_selector).await?.first() {
            Some(link) => link.attribute("href", self.attribute_timeout).await,
            None => Ok(None),
        }
    }

    fn absolutize(&self, href: &str) -> String {
        let href = href.trim();
        if href.is_empty() {
            return String::new();
        }
        self.origin
            .join(href)
            .map(|url| url.to_string())
            .unwrap_or_default()
    }
}
