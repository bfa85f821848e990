use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub date: String,
    pub description: String,
    pub image: String,
}

impl Event {
    /// Shown when the calendar could not be fetched at all.
    pub fn unreachable_placeholder() -> Self {
        Self {
            title: "Visit The Gateway Website".to_string(),
            date: "Check Website".to_string(),
            description: "Unable to fetch latest events automatically. Scan QR code for details."
                .to_string(),
            image: String::new(),
        }
    }

    /// Shown when the calendar loaded but no event could be parsed.
    pub fn empty_calendar_placeholder() -> Self {
        Self {
            title: "Visit The Gateway Website".to_string(),
            date: "Daily".to_string(),
            description: "Scan the QR code to see the full calendar of events.".to_string(),
            image: String::new(),
        }
    }
}
