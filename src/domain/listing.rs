use serde::{Deserialize, Serialize};

/// Fallback `price` when a card shows no dollar amount.
pub const CALL_FOR_PRICE: &str = "Call for Price";
/// Fallback `details` when a card has no overview element.
pub const DETAILS_NOT_FOUND: &str = "Details not found";

/// A card that carried an address element, before the allow-list is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCandidate {
    /// Full visible text of the card, upper-cased.
    pub raw_text: String,
    /// Whitespace-collapsed address, never empty.
    pub address: String,
}

/// One accepted listing, in the shape written to `forsale.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub unit: String,
    pub price: String,
    pub details: String,
    pub link: String,
}
