use super::{element_text, PageParser};
use crate::error::{Result, ScrapeError};
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::info;

static NEXT_DATA: Lazy<Selector> = Lazy::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());

// The page embeds its GraphQL payload as Next.js page props. Every level is
// optional because the payload shape shifts between deployments.

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NextData {
    props: Option<Props>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Props {
    page_props: Option<PageProps>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PageProps {
    title_and_showtime_data: Option<Vec<TitleEdge>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TitleEdge {
    node: Option<TitleNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TitleNode {
    title: Option<ImdbTitle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ImdbTitle {
    title_text: Option<TextField>,
    ratings_summary: Option<RatingsSummary>,
    certificate: Option<Certificate>,
    runtime: Option<Runtime>,
    title_genres: Option<TitleGenres>,
    primary_image: Option<PrimaryImage>,
    cinema_showtimes_by_screening_type: Option<ScreeningConnection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextField {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RatingsSummary {
    aggregate_rating: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Certificate {
    rating: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Runtime {
    seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TitleGenres {
    genres: Option<Vec<GenreEntry>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenreEntry {
    genre: Option<TextField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PrimaryImage {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScreeningConnection {
    edges: Option<Vec<ScreeningEdge>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScreeningEdge {
    node: Option<ScreeningNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScreeningNode {
    showtimes_by_screening_type: Option<Vec<ScreeningType>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScreeningType {
    showtimes: Option<Vec<Showtime>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Showtime {
    screening_start: Option<TextField>,
}

/// One title playing at the cinema, before its poster is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screening {
    pub title: String,
    pub rating: String,
    pub score: String,
    pub runtime: String,
    pub genre: String,
    pub times: Vec<String>,
    pub poster_url: Option<String>,
}

pub struct ImdbShowtimesScraper {
    max_showtimes: usize,
}

impl ImdbShowtimesScraper {
    pub fn new(max_showtimes: usize) -> Self {
        Self { max_showtimes }
    }

    fn screening(&self, title: ImdbTitle) -> Option<Screening> {
        let name = title
            .title_text
            .and_then(|t| t.text)
            .filter(|t| !t.is_empty())?;

        let times = sorted_showtimes(title.cinema_showtimes_by_screening_type);
        if times.is_empty() {
            return None;
        }

        let score = title
            .ratings_summary
            .and_then(|r| r.aggregate_rating)
            .filter(|r| *r != 0.0)
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "NR".to_string());

        let rating = title
            .certificate
            .and_then(|c| c.rating)
            .unwrap_or_else(|| "NR".to_string());

        let genre = title
            .title_genres
            .and_then(|g| g.genres)
            .and_then(|genres| genres.into_iter().next())
            .and_then(|g| g.genre)
            .and_then(|g| g.text)
            .unwrap_or_default();

        Some(Screening {
            title: name,
            rating,
            score,
            runtime: format_runtime(title.runtime.and_then(|r| r.seconds)),
            genre,
            times: times.into_iter().take(self.max_showtimes).collect(),
            poster_url: title
                .primary_image
                .and_then(|i| i.url)
                .filter(|u| !u.is_empty()),
        })
    }
}

impl PageParser for ImdbShowtimesScraper {
    type Item = Screening;

    fn parse(&self, document: &Html) -> Result<Vec<Screening>> {
        let script = document
            .select(&NEXT_DATA)
            .next()
            .ok_or_else(|| ScrapeError::Parse("no __NEXT_DATA__ script tag".to_string()))?;

        let data: NextData = serde_json::from_str(&element_text(script))?;
        let titles = data
            .props
            .and_then(|p| p.page_props)
            .and_then(|p| p.title_and_showtime_data)
            .unwrap_or_default();
        info!("Found {} movies in page data", titles.len());

        Ok(titles
            .into_iter()
            .filter_map(|edge| edge.node.and_then(|n| n.title))
            .filter_map(|title| self.screening(title))
            .collect())
    }
}

/// "{h}h {m}m", or empty when the runtime is unknown.
fn format_runtime(seconds: Option<u64>) -> String {
    match seconds {
        Some(secs) if secs > 0 => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
        _ => String::new(),
    }
}

/// Distinct start times in clock order. Times that do not parse as
/// "7:30 PM" sort first.
fn sorted_showtimes(connection: Option<ScreeningConnection>) -> Vec<String> {
    let unique: BTreeSet<String> = connection
        .and_then(|c| c.edges)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|edge| edge.node)
        .flat_map(|node| node.showtimes_by_screening_type.unwrap_or_default())
        .flat_map(|group| group.showtimes.unwrap_or_default())
        .filter_map(|st| st.screening_start.and_then(|s| s.text))
        .filter(|text| !text.is_empty())
        .collect();

    let mut times: Vec<String> = unique.into_iter().collect();
    times.sort_by_key(|t| NaiveTime::parse_from_str(t.trim(), "%I:%M %p").ok());
    times
}
