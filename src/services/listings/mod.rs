mod dedup;
mod extraction;
mod matching;
mod ordering;
mod pagination;
#[cfg(test)]
pub(crate) mod testing;

pub use ordering::assemble;
pub use pagination::{PaginationDriver, PaginationOutcome, SitePagination};

use crate::config::ListingSite;
use crate::domain::storage::Storage;
use crate::domain::ListingRecord;
use crate::error::Result;
use crate::infrastructure::{PageRenderer, RendererLauncher};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Runs the listings search end to end: one renderer session per run,
/// natural-ordered output, written through the store.
pub struct ListingService<L> {
    launcher: L,
    site: ListingSite,
    store: Arc<dyn Storage>,
    keep_previous_on_failure: bool,
}

impl<L: RendererLauncher> ListingService<L> {
    pub fn new(
        launcher: L,
        site: ListingSite,
        store: Arc<dyn Storage + 'static>,
        keep_previous_on_failure: bool,
    ) -> Self {
        info!("Created new Listing service");
        Self {
            launcher,
            site,
            store,
            keep_previous_on_failure,
        }
    }

    pub async fn run(&self) -> Result<Vec<ListingRecord>> {
        info!("Scraping listings from {}", self.site.search_url);

        let outcome = self.scrape().await?;
        self.persist(&outcome)?;

        Ok(outcome.records)
    }

    /// Walks the search and returns the accepted records in unit order. The
    /// renderer is closed exactly once, whether the walk completed or not.
    pub async fn scrape(&self) -> Result<PaginationOutcome> {
        let strategy = SitePagination::for_site(&self.site)?;
        let driver = PaginationDriver::new(&self.site, strategy)?;

        let mut renderer = match self.launcher.launch().await {
            Ok(renderer) => renderer,
            Err(e) => {
                error!("Could not start renderer: {}", e);
                return Ok(PaginationOutcome::failed(&e));
            }
        };

        let mut outcome = driver.run(&mut renderer).await;

        if let Err(e) = renderer.close().await {
            warn!("Failed to release renderer: {}", e);
        }

        info!(
            "Scanned {} result pages, stopped with {:?}",
            outcome.pages_scanned, outcome.stop
        );
        outcome.records = assemble(outcome.records);
        Ok(outcome)
    }

    fn persist(&self, outcome: &PaginationOutcome) -> Result<()> {
        if !outcome.is_complete()
            && self.keep_previous_on_failure
            && self.store.has_listings(&self.site.output)
        {
            warn!(
                "Search stopped early with {} listings; keeping previous {}.json",
                outcome.records.len(),
                self.site.output
            );
            return Ok(());
        }

        self.store.save_listings(&self.site.output, &outcome.records)?;
        info!("Saved {} listings to {}.json", outcome.records.len(), self.site.output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{
        test_site, unit_card, ScriptedLauncher, ScriptedPage, ScriptedRenderer,
    };
    use super::*;
    use crate::domain::DETAILS_NOT_FOUND;
    use crate::infrastructure::{FileSystemStore, HttpLauncher};
    use std::path::Path;

    fn service(
        launcher: ScriptedLauncher,
        data_dir: &Path,
        keep_previous_on_failure: bool,
    ) -> ListingService<ScriptedLauncher> {
        ListingService::new(
            launcher,
            test_site(),
            Arc::new(FileSystemStore::new(data_dir)),
            keep_previous_on_failure,
        )
    }

    fn written_units(data_dir: &Path) -> Vec<String> {
        let content = std::fs::read_to_string(data_dir.join("forsale.json")).unwrap();
        let records: Vec<ListingRecord> = serde_json::from_str(&content).unwrap();
        records.into_iter().map(|r| r.unit).collect()
    }

    #[tokio::test]
    async fn writes_records_in_natural_unit_order() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ScriptedRenderer::new(vec![
            ScriptedPage::cards(vec![unit_card("1001"), unit_card("104")]),
            ScriptedPage::cards(vec![unit_card("74"), unit_card("402")]),
        ]);
        let log = renderer.log();

        let records = service(ScriptedLauncher::new(renderer), dir.path(), false)
            .run()
            .await
            .unwrap();

        let units: Vec<&str> = records.iter().map(|r| r.unit.as_str()).collect();
        assert_eq!(units, ["74", "104", "402", "1001"]);
        assert_eq!(written_units(dir.path()), ["74", "104", "402", "1001"]);
        assert_eq!(log.closes(), 1);
    }

    #[tokio::test]
    async fn renderer_is_closed_after_a_failed_walk() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ScriptedRenderer::new(vec![
            ScriptedPage::cards(vec![unit_card("402")]),
            ScriptedPage::Unreachable,
        ]);
        let log = renderer.log();

        let outcome = service(ScriptedLauncher::new(renderer), dir.path(), false)
            .scrape()
            .await
            .unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(log.closes(), 1);
    }

    #[tokio::test]
    async fn partial_results_overwrite_by_default() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("forsale.json"), "[]").unwrap();
        let renderer = ScriptedRenderer::new(vec![
            ScriptedPage::cards(vec![unit_card("402")]),
            ScriptedPage::Unreachable,
        ]);

        service(ScriptedLauncher::new(renderer), dir.path(), false)
            .run()
            .await
            .unwrap();

        assert_eq!(written_units(dir.path()), ["402"]);
    }

    #[tokio::test]
    async fn partial_results_can_keep_the_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("forsale.json"),
            r#"[{"unit":"7","price":"$1","details":"d","link":""}]"#,
        )
        .unwrap();
        let renderer = ScriptedRenderer::new(vec![
            ScriptedPage::cards(vec![unit_card("402")]),
            ScriptedPage::Unreachable,
        ]);

        let records = service(ScriptedLauncher::new(renderer), dir.path(), true)
            .run()
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(written_units(dir.path()), ["7"]);
    }

    #[tokio::test]
    async fn keep_previous_still_writes_when_nothing_exists() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ScriptedRenderer::new(vec![ScriptedPage::Unreachable]);

        service(ScriptedLauncher::new(renderer), dir.path(), true)
            .run()
            .await
            .unwrap();

        assert!(written_units(dir.path()).is_empty());
    }

    const ROW_RESULTS: &str = r#"<html><body><table><tbody>
        <tr class="listing">
          <td><h2 class="public">5 S 500 W #4<b>02</b>, Salt Lake City, UT</h2></td>
          <td><span>$350,000</span></td>
          <td><div class="public-detail-overview">2 bed 2 bath</div></td>
          <td><ul><li class="view-prop-details"><a href="/listing/402">View</a></li></ul></td>
        </tr>
        <tr class="listing">
          <td><h2 class="public">165 S Rio Grande St #74, Salt Lake City, UT</h2></td>
          <td><span>$299,000</span></td>
        </tr>
    </tbody></table></body></html>"#;

    #[tokio::test]
    async fn table_row_results_are_read_through_the_http_renderer() {
        let mut server = mockito::Server::new_async().await;
        let _first = server
            .mock("GET", "/search?zip=84101")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(ROW_RESULTS)
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/search?zip=84101&page=2")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body><table></table></body></html>")
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let site = ListingSite {
            search_url: format!("{}/search?zip=84101", server.url()),
            origin: server.url(),
            card_selector: "tr.listing".to_string(),
            diagnostic_path: dir.path().join("error_snapshot.html"),
            ..test_site()
        };

        let records = ListingService::new(
            HttpLauncher::new(reqwest::Client::new()),
            site,
            Arc::new(FileSystemStore::new(dir.path())),
            false,
        )
        .run()
        .await
        .unwrap();

        assert_eq!(
            records,
            vec![
                ListingRecord {
                    unit: "74".to_string(),
                    price: "$299,000".to_string(),
                    details: DETAILS_NOT_FOUND.to_string(),
                    link: String::new(),
                },
                ListingRecord {
                    unit: "402".to_string(),
                    price: "$350,000".to_string(),
                    details: "2 bed 2 bath".to_string(),
                    link: format!("{}/listing/402", server.url()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn launch_failure_is_an_empty_result() {
        let dir = tempfile::tempdir().unwrap();

        let records = service(ScriptedLauncher::failing(), dir.path(), false)
            .run()
            .await
            .unwrap();

        assert!(records.is_empty());
        assert!(written_units(dir.path()).is_empty());
    }
}
