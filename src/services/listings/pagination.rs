//! Walks the result pages of a listings search.
//!
//! The driver is a small state machine over one renderer session:
//!
//! ```text
//! Loading -> Extracting -> Advancing -> Extracting -> ... -> Stopped
//!    \            \             \
//!     +------------+-------------+--> Failed
//! ```
//!
//! Pages are drained strictly one at a time. An empty page is the normal end
//! of results; the page ceiling bounds a source that never runs dry. Any
//! navigation or read failure ends the walk but keeps what was collected.

use super::dedup::SeenUnits;
use super::extraction::RecordExtractor;
use crate::config::{ListingSite, PaginationMode};
use crate::domain::ListingRecord;
use crate::error::{Result, ScrapeError};
use crate::infrastructure::{PageElement, PageRenderer};
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;

/// Moves a session from one result page to the next.
pub(crate) trait PaginationStrategy {
    /// Navigates to result page `page` (2 and up). `Ok(false)` means the
    /// source has no such page.
    async fn advance<R: PageRenderer>(
        &self,
        renderer: &mut R,
        page: u32,
        timeout: Duration,
    ) -> Result<bool>;
}

/// Deep-links to each page through a query parameter.
#[derive(Debug, Clone)]
pub struct UrlPagination {
    base: Url,
    param: String,
}

impl UrlPagination {
    pub fn new(search_url: &str, param: &str) -> Result<Self> {
        Ok(Self {
            base: Url::parse(search_url)?,
            param: param.to_string(),
        })
    }

    /// The search URL with the page parameter set to `page`, replacing any
    /// page parameter already present.
    pub fn page_url(&self, page: u32) -> String {
        let mut url = self.base.clone();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key.as_ref() != self.param.as_str())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(pairs)
            .append_pair(&self.param, &page.to_string());
        url.to_string()
    }
}

impl PaginationStrategy for UrlPagination {
    async fn advance<R: PageRenderer>(
        &self,
        renderer: &mut R,
        page: u32,
        timeout: Duration,
    ) -> Result<bool> {
        let url = self.page_url(page);
        info!("--- Loading page {} ({}) ---", page, url);
        renderer.load(&url, timeout).await?;
        Ok(true)
    }
}

/// Activates the first visible "next" control on the current page.
#[derive(Debug, Clone)]
pub struct ClickPagination {
    next_selector: String,
}

impl ClickPagination {
    pub fn new(next_selector: &str) -> Self {
        Self {
            next_selector: next_selector.to_string(),
        }
    }
}

impl PaginationStrategy for ClickPagination {
    async fn advance<R: PageRenderer>(
        &self,
        renderer: &mut R,
        page: u32,
        timeout: Duration,
    ) -> Result<bool> {
        let controls = renderer.query_all(&self.next_selector).await?;
        for control in &controls {
            if control.is_visible().await? {
                info!("--- Following next control to page {} ---", page);
                renderer.click(control, timeout).await?;
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// The strategy a site is configured with, chosen once per run.
#[derive(Debug, Clone)]
pub enum SitePagination {
    Url(UrlPagination),
    Click(ClickPagination),
}

impl SitePagination {
    pub fn for_site(site: &ListingSite) -> Result<Self> {
        Ok(match &site.pagination {
            PaginationMode::Url { param } => {
                SitePagination::Url(UrlPagination::new(&site.search_url, param)?)
            }
            PaginationMode::Click { next_selector } => {
                SitePagination::Click(ClickPagination::new(next_selector))
            }
        })
    }
}

impl PaginationStrategy for SitePagination {
    async fn advance<R: PageRenderer>(
        &self,
        renderer: &mut R,
        page: u32,
        timeout: Duration,
    ) -> Result<bool> {
        match self {
            SitePagination::Url(strategy) => strategy.advance(renderer, page, timeout).await,
            SitePagination::Click(strategy) => strategy.advance(renderer, page, timeout).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A page came back with no cards.
    EmptyPage,
    /// No usable "next" control was found.
    NoNextPage,
    /// The configured page ceiling was reached.
    PageCeiling,
    /// Navigation or reading failed; holds the error message.
    Failed(String),
}

#[derive(Debug)]
pub struct PaginationOutcome {
    /// Accepted records in the order they were found.
    pub records: Vec<ListingRecord>,
    /// Pages whose cards were queried, including a final empty page.
    pub pages_scanned: u32,
    pub stop: StopReason,
}

impl PaginationOutcome {
    pub fn failed(error: &ScrapeError) -> Self {
        Self {
            records: Vec::new(),
            pages_scanned: 0,
            stop: StopReason::Failed(error.to_string()),
        }
    }

    pub fn is_complete(&self) -> bool {
        !matches!(self.stop, StopReason::Failed(_))
    }
}

enum State {
    Loading,
    Extracting,
    Advancing,
    Stopped(StopReason),
    Failed(ScrapeError),
}

pub struct PaginationDriver<'a, S> {
    site: &'a ListingSite,
    strategy: S,
    extractor: RecordExtractor,
}

impl<'a, S: PaginationStrategy> PaginationDriver<'a, S> {
    pub fn new(site: &'a ListingSite, strategy: S) -> Result<Self> {
        Ok(Self {
            site,
            strategy,
            extractor: RecordExtractor::new(site)?,
        })
    }

    /// Collects every accepted record across the result pages. Never fails:
    /// an aborted walk returns whatever was gathered before the error.
    pub async fn run<R: PageRenderer>(&self, renderer: &mut R) -> PaginationOutcome {
        let mut seen = SeenUnits::new();
        let mut records = Vec::new();
        let mut page: u32 = 1;
        let mut pages_scanned: u32 = 0;

        let mut state = if self.site.max_pages == 0 {
            State::Stopped(StopReason::PageCeiling)
        } else {
            State::Loading
        };

        loop {
            state = match state {
                State::Loading => {
                    info!("Loading search: {}", self.site.search_url);
                    match renderer
                        .load(&self.site.search_url, self.site.navigation_timeout())
                        .await
                    {
                        Ok(()) => {
                            renderer.wait(self.site.initial_settle()).await;
                            State::Extracting
                        }
                        Err(e) => State::Failed(e),
                    }
                }
                State::Extracting => {
                    info!("--- Scanning page {} ---", page);
                    match self.drain_page(&*renderer, &mut seen, &mut records).await {
                        Ok(0) => {
                            pages_scanned += 1;
                            info!("No listings found on page {}", page);
                            State::Stopped(StopReason::EmptyPage)
                        }
                        Ok(_) => {
                            pages_scanned += 1;
                            State::Advancing
                        }
                        Err(e) => State::Failed(e),
                    }
                }
                State::Advancing => {
                    if page >= self.site.max_pages {
                        State::Stopped(StopReason::PageCeiling)
                    } else {
                        page += 1;
                        match self
                            .strategy
                            .advance(renderer, page, self.site.navigation_timeout())
                            .await
                        {
                            Ok(true) => {
                                renderer.wait(self.site.page_settle()).await;
                                State::Extracting
                            }
                            Ok(false) => State::Stopped(StopReason::NoNextPage),
                            Err(e) => State::Failed(e),
                        }
                    }
                }
                State::Stopped(stop) => {
                    info!(
                        "Pagination finished after {} pages ({:?}): {} listings, {} distinct units",
                        pages_scanned,
                        stop,
                        records.len(),
                        seen.len()
                    );
                    return PaginationOutcome {
                        records,
                        pages_scanned,
                        stop,
                    };
                }
                State::Failed(e) => {
                    error!("Pagination aborted on page {}: {}", page, e);
                    if let Err(capture) = renderer.capture_diagnostic(&self.site.diagnostic_path).await
                    {
                        warn!("Could not capture diagnostic: {}", capture);
                    }
                    return PaginationOutcome {
                        records,
                        pages_scanned,
                        stop: StopReason::Failed(e.to_string()),
                    };
                }
            };
        }
    }

    /// Runs every card on the current page through the extractor and returns
    /// how many cards the page had. A card that fails to parse is skipped.
    async fn drain_page<R: PageRenderer>(
        &self,
        renderer: &R,
        seen: &mut SeenUnits,
        records: &mut Vec<ListingRecord>,
    ) -> Result<usize> {
        let cards = renderer.query_all(&self.site.card_selector).await?;
        info!("Found {} listings on this page", cards.len());

        for card in &cards {
            match self.extractor.extract(card, seen).await {
                Ok(Some(record)) => {
                    if seen.admit(&record.unit) {
                        info!("MATCH: Unit {} - {}", record.unit, record.price);
                        records.push(record);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("Error parsing listing: {}", e),
            }
        }

        Ok(cards.len())
    }
}
