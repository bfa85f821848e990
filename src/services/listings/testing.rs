//! Scripted stand-ins for a live browser session.

use crate::config::{ListingSite, PaginationMode};
use crate::error::{Result, ScrapeError};
use crate::infrastructure::{PageElement, PageRenderer, RendererLauncher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const NEXT_SELECTOR: &str = "ul.pagination a.next";

pub fn test_site() -> ListingSite {
    ListingSite {
        search_url: "https://www.example.com/search?type=1&zip=84101".to_string(),
        origin: "https://www.example.com".to_string(),
        initial_settle_ms: 0,
        page_settle_ms: 0,
        diagnostic_path: PathBuf::from("diagnostic.html"),
        ..ListingSite::default()
    }
}

pub fn click_site() -> ListingSite {
    ListingSite {
        pagination: PaginationMode::Click {
            next_selector: NEXT_SELECTOR.to_string(),
        },
        ..test_site()
    }
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    text: String,
    attributes: HashMap<String, String>,
    children: HashMap<String, Vec<FakeElement>>,
    visible: bool,
    broken: bool,
}

impl FakeElement {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            attributes: HashMap::new(),
            children: HashMap::new(),
            visible: true,
            broken: false,
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_child(mut self, selector: &str, child: FakeElement) -> Self {
        self.children
            .entry(selector.to_string())
            .or_default()
            .push(child);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Every read fails, as with an element detached from the page.
    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    fn check(&self) -> Result<()> {
        if self.broken {
            return Err(ScrapeError::Render("element is detached".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PageElement for FakeElement {
    async fn text(&self) -> Result<String> {
        self.check()?;
        Ok(self.text.clone())
    }

    async fn inner_text(&self) -> Result<String> {
        self.check()?;
        Ok(self.text.clone())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<FakeElement>> {
        self.check()?;
        Ok(self.children.get(selector).cloned().unwrap_or_default())
    }

    async fn attribute(&self, name: &str, _timeout: Duration) -> Result<Option<String>> {
        self.check()?;
        Ok(self.attributes.get(name).cloned())
    }

    async fn is_visible(&self) -> Result<bool> {
        self.check()?;
        Ok(self.visible)
    }
}

/// A result card laid out with the default listing selectors.
pub fn listing_card(
    address: &str,
    text: &str,
    details: Option<&str>,
    href: Option<&str>,
) -> FakeElement {
    let site = ListingSite::default();
    let full_text = [Some(address), Some(text), details]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n");

    let mut card =
        FakeElement::new(&full_text).with_child(&site.address_selector, FakeElement::new(address));
    if let Some(details) = details {
        card = card.with_child(&site.details_selector, FakeElement::new(details));
    }
    if let Some(href) = href {
        card = card.with_child(
            &site.link_selector,
            FakeElement::new("View").with_attr("href", href),
        );
    }
    card
}

/// A tracked card for unit `unit`.
pub fn unit_card(unit: &str) -> FakeElement {
    listing_card(
        &format!("5 S 500 W #{}, Salt Lake City, UT", unit),
        "$350,000",
        None,
        Some(&format!("/listing/{}", unit)),
    )
}

#[derive(Debug, Clone)]
pub enum ScriptedPage {
    Cards { cards: Vec<FakeElement>, next: bool },
    /// Navigating to this page fails.
    Unreachable,
    /// The page loads but cannot be read.
    Detached,
}

impl ScriptedPage {
    pub fn cards(cards: Vec<FakeElement>) -> Self {
        ScriptedPage::Cards { cards, next: true }
    }

    pub fn last(cards: Vec<FakeElement>) -> Self {
        ScriptedPage::Cards { cards, next: false }
    }
}

/// Counters shared between a scripted renderer and the test that drives it.
#[derive(Debug, Clone, Default)]
pub struct RenderLog {
    loads: Arc<Mutex<Vec<String>>>,
    card_queries: Arc<AtomicUsize>,
    clicks: Arc<AtomicUsize>,
    waits: Arc<Mutex<Vec<Duration>>>,
    diagnostics: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl RenderLog {
    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }

    pub fn card_queries(&self) -> usize {
        self.card_queries.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    pub fn diagnostics(&self) -> usize {
        self.diagnostics.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Serves a fixed sequence of pages; the n-th navigation (load or click)
/// lands on the n-th page.
pub struct ScriptedRenderer {
    pages: Vec<ScriptedPage>,
    endless: Option<ScriptedPage>,
    navigations: usize,
    current: Option<ScriptedPage>,
    card_selector: String,
    log: RenderLog,
}

impl ScriptedRenderer {
    pub fn new(pages: Vec<ScriptedPage>) -> Self {
        Self {
            pages,
            endless: None,
            navigations: 0,
            current: None,
            card_selector: ListingSite::default().card_selector,
            log: RenderLog::default(),
        }
    }

    /// Every page has cards and a live "next" control.
    pub fn endless(cards: Vec<FakeElement>) -> Self {
        let mut renderer = Self::new(Vec::new());
        renderer.endless = Some(ScriptedPage::cards(cards));
        renderer
    }

    pub fn log(&self) -> RenderLog {
        self.log.clone()
    }

    fn navigate(&mut self) -> Result<()> {
        let page = match &self.endless {
            Some(page) => page.clone(),
            None => self
                .pages
                .get(self.navigations)
                .cloned()
                .unwrap_or(ScriptedPage::last(Vec::new())),
        };
        self.navigations += 1;

        if let ScriptedPage::Unreachable = page {
            return Err(ScrapeError::Navigation("net::ERR_CONNECTION_RESET".to_string()));
        }
        self.current = Some(page);
        Ok(())
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    type Element = FakeElement;

    async fn load(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.log.loads.lock().unwrap().push(url.to_string());
        self.navigate()
    }

    async fn wait(&mut self, duration: Duration) {
        self.log.waits.lock().unwrap().push(duration);
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<FakeElement>> {
        let page = self
            .current
            .as_ref()
            .ok_or_else(|| ScrapeError::Render("no page loaded".to_string()))?;

        let (cards, next) = match page {
            ScriptedPage::Cards { cards, next } => (cards, *next),
            _ => return Err(ScrapeError::Render("execution context destroyed".to_string())),
        };

        if selector == self.card_selector {
            self.log.card_queries.fetch_add(1, Ordering::SeqCst);
            Ok(cards.clone())
        } else if selector == NEXT_SELECTOR && next {
            Ok(vec![
                FakeElement::new("Prev").hidden(),
                FakeElement::new("Next"),
            ])
        } else {
            Ok(Vec::new())
        }
    }

    async fn click(&mut self, element: &FakeElement, _timeout: Duration) -> Result<()> {
        if !element.visible {
            return Err(ScrapeError::Render("element is not visible".to_string()));
        }
        self.log.clicks.fetch_add(1, Ordering::SeqCst);
        self.navigate()
    }

    async fn capture_diagnostic(&self, _path: &Path) -> Result<()> {
        self.log.diagnostics.fetch_add(1, Ordering::SeqCst);
        Err(ScrapeError::Other("screenshots unavailable".to_string()))
    }

    async fn close(self) -> Result<()> {
        self.log.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out one scripted renderer, or fails to launch when built with
/// [`ScriptedLauncher::failing`].
pub struct ScriptedLauncher {
    renderer: Mutex<Option<ScriptedRenderer>>,
}

impl ScriptedLauncher {
    pub fn new(renderer: ScriptedRenderer) -> Self {
        Self {
            renderer: Mutex::new(Some(renderer)),
        }
    }

    pub fn failing() -> Self {
        Self {
            renderer: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RendererLauncher for ScriptedLauncher {
    type Renderer = ScriptedRenderer;

    async fn launch(&self) -> Result<ScriptedRenderer> {
        self.renderer
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ScrapeError::Other("browser executable not found".to_string()))
    }
}
