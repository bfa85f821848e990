use super::{Event, ListingRecord, Movie};
use crate::error::Result;

pub trait Storage: Send + Sync {
    fn has_listings(&self, key: &str) -> bool;
    fn save_listings(&self, key: &str, listings: &[ListingRecord]) -> Result<()>;
    fn save_events(&self, events: &[Event]) -> Result<()>;
    fn save_movies(&self, movies: &[Movie]) -> Result<()>;
}

pub struct StorageKeys;

impl StorageKeys {
    pub const LISTINGS: &'static str = "forsale";
    pub const EVENTS: &'static str = "gateway_events";
    pub const MOVIES: &'static str = "movies";
}
