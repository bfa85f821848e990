//! The page rendering capability the listings search is driven through.
//!
//! A renderer owns one browsing session: it holds the current page, answers
//! selector queries against it, and can be navigated either by loading a URL
//! or by activating an element. The pagination logic only ever talks to
//! these traits, so it runs the same against a live site or a scripted fake.

pub(crate) mod http;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

pub use http::HttpLauncher;

/// One element of the current page. Elements are read-only views; anything
/// that changes the session goes through [`PageRenderer`].
#[async_trait]
pub trait PageElement: Send + Sync + Sized {
    /// Concatenated text content of the element and its descendants.
    async fn text(&self) -> Result<String>;

    /// Rendered text, with block boundaries kept as line breaks.
    async fn inner_text(&self) -> Result<String>;

    /// Descendants of this element matching `selector`, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self>>;

    /// Value of attribute `name`, or `None` when it is absent.
    async fn attribute(&self, name: &str, timeout: Duration) -> Result<Option<String>>;

    async fn is_visible(&self) -> Result<bool>;
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    type Element: PageElement;

    /// Navigates the session to `url`. Fails with a navigation error when
    /// the page cannot be loaded within `timeout`.
    async fn load(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Lets client-side work settle before the page is read.
    async fn wait(&mut self, duration: Duration);

    /// Elements of the current page matching `selector`.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Activates `element`, navigating the session wherever it leads.
    async fn click(&mut self, element: &Self::Element, timeout: Duration) -> Result<()>;

    /// Writes a debugging artifact of the current page to `path`.
    async fn capture_diagnostic(&self, path: &Path) -> Result<()>;

    /// Releases the session.
    async fn close(self) -> Result<()>;
}

/// Acquires a fresh renderer for one run.
#[async_trait]
pub trait RendererLauncher: Send + Sync {
    type Renderer: PageRenderer;

    async fn launch(&self) -> Result<Self::Renderer>;
}
