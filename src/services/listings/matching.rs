//! Allow-list of the properties the board tracks.

use crate::services::text_utils::match_key;

/// Alternative spellings of the same street address; any one is enough.
const ADDRESS_VARIANTS: &[&[&str]] = &[
    &["5 S 500 W", "5 SOUTH 500 WEST"],
    &["165 S RIO GRANDE", "165 SOUTH RIO GRANDE"],
];

/// Name fragments that must all appear, in any order.
const NAME_FRAGMENTS: &[&str] = &["PARC", "GATEWAY"];

/// Whether `address` belongs to one of the tracked properties. Matching is
/// case-insensitive and substring-based, not whole-word.
pub fn matches(address: &str) -> bool {
    let address = match_key(address);

    ADDRESS_VARIANTS
        .iter()
        .any(|variants| variants.iter().any(|v| address.contains(v)))
        || NAME_FRAGMENTS.iter().all(|f| address.contains(f))
}
