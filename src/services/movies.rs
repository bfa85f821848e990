use crate::config::MoviesSite;
use crate::domain::storage::Storage;
use crate::domain::Movie;
use crate::error::Result;
use crate::infrastructure::{ImdbShowtimesScraper, PageParser, Screening};
use crate::services::posters::PosterService;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::Client;
use scraper::Html;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

pub struct MoviesService {
    client: Client,
    site: MoviesSite,
    scraper: ImdbShowtimesScraper,
    posters: PosterService,
    store: Arc<dyn Storage>,
}

impl MoviesService {
    pub fn new(
        client: Client,
        site: MoviesSite,
        data_dir: &Path,
        store: Arc<dyn Storage + 'static>,
    ) -> Self {
        info!("Created new Movies service");
        Self {
            posters: PosterService::new(client.clone(), data_dir, &site.poster_dir),
            scraper: ImdbShowtimesScraper::new(site.max_showtimes),
            client,
            site,
            store,
        }
    }

    /// Refreshes `movies.json` and the poster folder. When nothing could be
    /// read the previous file and posters are left alone.
    pub async fn run(&self) -> Result<Vec<Movie>> {
        info!("Scraping showtimes from {}", self.site.url);

        let screenings = match self.fetch_screenings().await {
            Ok(screenings) => screenings,
            Err(e) => {
                error!("Could not read showtimes: {}", e);
                Vec::new()
            }
        };

        if screenings.is_empty() {
            warn!("No movies found, keeping previous movies.json");
            return Ok(Vec::new());
        }

        let movies = self.attach_posters(screenings).await?;
        self.store.save_movies(&movies)?;
        info!("Saved {} movies", movies.len());

        Ok(movies)
    }

    async fn fetch_screenings(&self) -> Result<Vec<Screening>> {
        let body = self
            .client
            .get(&self.site.url)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .timeout(Duration::from_secs(self.site.timeout_secs))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        self.scraper.parse(&Html::parse_document(&body))
    }

    async fn attach_posters(&self, screenings: Vec<Screening>) -> Result<Vec<Movie>> {
        let sources: Vec<(String, Option<String>)> = screenings
            .iter()
            .map(|s| (s.title.clone(), s.poster_url.clone()))
            .collect();
        let references = self.posters.fetch_all(&sources).await?;

        if let Err(e) = self.posters.remove_stale(&references).await {
            warn!("Could not clean up old posters: {}", e);
        }

        Ok(screenings
            .into_iter()
            .zip(references)
            .map(|(s, poster)| Movie {
                title: s.title,
                rating: s.rating,
                score: s.score,
                runtime: s.runtime,
                genre: s.genre,
                times: s.times,
                poster,
            })
            .collect())
    }
}
