mod renderer;
mod scrapers;
mod storage;

pub use renderer::{HttpLauncher, PageElement, PageRenderer, RendererLauncher};
pub use scrapers::{
    gateway_events::GatewayEventsScraper,
    imdb_showtimes::{ImdbShowtimesScraper, Screening},
    PageParser,
};
pub use storage::fs_store::FileSystemStore;
