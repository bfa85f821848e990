mod event;
mod listing;
mod movie;
pub(crate) mod storage;

pub use event::Event;
pub use listing::{ListingCandidate, ListingRecord, CALL_FOR_PRICE, DETAILS_NOT_FOUND};
pub use movie::Movie;
