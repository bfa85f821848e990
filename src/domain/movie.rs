use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub title: String,
    /// Content rating such as "PG-13".
    pub rating: String,
    /// Aggregate user score such as "6.6".
    pub score: String,
    pub runtime: String,
    pub genre: String,
    pub times: Vec<String>,
    pub poster: String,
}
