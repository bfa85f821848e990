//! Human reading order for unit numbers: "74" < "104" < "402" < "1001".

use crate::domain::ListingRecord;
use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Text(&'a str),
    /// Digit run with leading zeros stripped.
    Number(&'a str),
}

impl Ord for Chunk<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Chunk::Text(a), Chunk::Text(b)) => a.cmp(b),
            // Equal-length digit strings without leading zeros order the
            // same lexically and numerically, so no integer parse is needed.
            (Chunk::Number(a), Chunk::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Chunk<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Splits `text` into alternating text and digit runs. The key always starts
/// with a (possibly empty) text run, so chunks at the same position have the
/// same kind.
fn natural_key(text: &str) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_digits = false;

    for (idx, c) in text.char_indices() {
        let is_digit = c.is_ascii_digit();
        if is_digit != in_digits {
            chunks.push(chunk(&text[start..idx], in_digits));
            start = idx;
            in_digits = is_digit;
        }
    }
    chunks.push(chunk(&text[start..], in_digits));

    chunks
}

fn chunk(run: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Number(run.trim_start_matches('0'))
    } else {
        Chunk::Text(run)
    }
}

/// Total order over unit strings. Digit runs compare numerically, other runs
/// as text, and a key that is a prefix of another sorts first. Strings that
/// only differ in leading zeros fall back to plain text order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a)
        .cmp(&natural_key(b))
        .then_with(|| a.cmp(b))
}

/// Orders accepted records by unit. Stable, and nothing is dropped or changed.
pub fn assemble(mut records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    records.sort_by(|a, b| natural_cmp(&a.unit, &b.unit));
    records
}
