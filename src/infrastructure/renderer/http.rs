use super::{PageElement, PageRenderer, RendererLauncher};
use crate::error::{Result, ScrapeError};
use crate::infrastructure::scrapers::parse_selector;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html};
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use url::Url;

pub struct HttpLauncher {
    client: Client,
}

impl HttpLauncher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RendererLauncher for HttpLauncher {
    type Renderer = HttpRenderer;

    async fn launch(&self) -> Result<HttpRenderer> {
        Ok(HttpRenderer::new(self.client.clone()))
    }
}

/// Renders pages from their server-side markup. Scripts are not executed,
/// so the session only sees what the site sends in the initial response.
pub struct HttpRenderer {
    client: Client,
    current_url: Option<Url>,
    markup: String,
}

impl HttpRenderer {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            current_url: None,
            markup: String::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_page(url: &str, markup: &str) -> Self {
        Self {
            client: Client::new(),
            current_url: Url::parse(url).ok(),
            markup: markup.to_string(),
        }
    }

    fn select_snapshots(&self, selector: &str) -> Result<Vec<HtmlElement>> {
        let selector = parse_selector(selector)?;
        let document = Html::parse_document(&self.markup);
        Ok(document
            .select(&selector)
            .map(|el| HtmlElement::new(el.html()))
            .collect())
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    type Element = HtmlElement;

    async fn load(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let target = Url::parse(url)?;
        debug!("Loading {}", target);

        let response = self
            .client
            .get(target.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScrapeError::Timeout(format!("loading {}", target))
                } else {
                    ScrapeError::Network(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(ScrapeError::Navigation(format!(
                "{} returned {}",
                target,
                response.status()
            )));
        }

        let final_url = response.url().clone();
        self.markup = response.text().await?;
        self.current_url = Some(final_url);
        Ok(())
    }

    async fn wait(&mut self, duration: Duration) {
        if !duration.is_zero() {
            sleep(duration).await;
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<HtmlElement>> {
        self.select_snapshots(selector)
    }

    async fn click(&mut self, element: &HtmlElement, timeout: Duration) -> Result<()> {
        let href = element
            .attr("href")
            .ok_or_else(|| ScrapeError::Render("element has no link to follow".to_string()))?;
        let base = self
            .current_url
            .as_ref()
            .ok_or_else(|| ScrapeError::Navigation("no page loaded".to_string()))?;
        let target = base.join(&href)?;

        self.load(target.as_str(), timeout).await
    }

    async fn capture_diagnostic(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, &self.markup).await?;
        Ok(())
    }

    async fn close(self) -> Result<()> {
        debug!("Closing HTTP renderer");
        Ok(())
    }
}

/// Owned snapshot of one element's outer markup.
#[derive(Debug, Clone)]
pub struct HtmlElement {
    markup: String,
}

impl HtmlElement {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    /// Re-parses the snapshot and hands its outermost element to `f`.
    fn with_root<T>(&self, f: impl FnOnce(ElementRef<'_>) -> T) -> Option<T> {
        let tag = tag_name(&self.markup)?;
        let fragment = Html::parse_fragment(&in_table_context(&tag, &self.markup));
        let root = fragment
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == tag)?;
        Some(f(root))
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.with_root(|el| el.value().attr(name).map(str::to_string))
            .flatten()
    }
}

fn tag_name(markup: &str) -> Option<String> {
    let rest = markup.trim_start().strip_prefix('<')?;
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    (!name.is_empty()).then(|| name.to_ascii_lowercase())
}

// Fragments parse in a <body> context, where table parts lose their tags
// unless they sit inside the table structure they came from.
fn in_table_context(tag: &str, markup: &str) -> String {
    match tag {
        "tr" => format!("<table><tbody>{}</tbody></table>", markup),
        "td" | "th" => format!("<table><tbody><tr>{}</tr></tbody></table>", markup),
        "col" => format!("<table><colgroup>{}</colgroup></table>", markup),
        "thead" | "tbody" | "tfoot" | "caption" | "colgroup" => {
            format!("<table>{}</table>", markup)
        }
        _ => markup.to_string(),
    }
}

#[async_trait]
impl PageElement for HtmlElement {
    async fn text(&self) -> Result<String> {
        Ok(self
            .with_root(|el| el.text().collect::<String>())
            .unwrap_or_default())
    }

    async fn inner_text(&self) -> Result<String> {
        Ok(self
            .with_root(|el| {
                el.text()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<HtmlElement>> {
        let selector = parse_selector(selector)?;
        Ok(self
            .with_root(|el| {
                el.select(&selector)
                    .map(|child| HtmlElement::new(child.html()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default())
    }

    async fn attribute(&self, name: &str, _timeout: Duration) -> Result<Option<String>> {
        Ok(self.attr(name))
    }

    async fn is_visible(&self) -> Result<bool> {
        Ok(self
            .with_root(|el| {
                let value = el.value();
                if value.attr("hidden").is_some() {
                    return false;
                }
                if value.attr("aria-hidden") == Some("true") {
                    return false;
                }
                if let Some(style) = value.attr("style") {
                    let style: String = style
                        .chars()
                        .filter(|c| !c.is_whitespace())
                        .collect::<String>()
                        .to_lowercase();
                    if style.contains("display:none") || style.contains("visibility:hidden") {
                        return false;
                    }
                }
                !value.classes().any(|c| c.eq_ignore_ascii_case("disabled"))
            })
            .unwrap_or(false))
    }
}
