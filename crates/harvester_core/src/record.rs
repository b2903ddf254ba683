use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Category id as issued by the remote catalog.
pub type CategoryId = i64;

/// Mapping from category id to display name, resolved once per harvest and
/// shared read-only by all concurrent normalization calls.
pub type CategoryMap = HashMap<CategoryId, String>;

/// One raw catalog entry as returned by the remote API.
///
/// The remote schema is not under this crate's control: every field may be
/// absent or null, so all of them are optional and unknown fields are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Option<Vec<CategoryId>>,
    #[serde(default)]
    pub adult: Option<bool>,
}

/// One normalized movie record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    #[serde(rename = "Title")]
    pub title: String,
    /// Four-digit release year, or empty when the release date was missing
    /// or malformed.
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Rating")]
    pub rating: f64,
    /// Overview text with embedded newlines collapsed and ends trimmed.
    #[serde(rename = "Description")]
    pub description: String,
    /// Comma-joined category names; never contains an empty token.
    #[serde(rename = "Genre")]
    pub genre: String,
    /// Present only when the harvest ran with adult content enabled.
    #[serde(rename = "Adult", skip_serializing_if = "Option::is_none")]
    pub adult: Option<bool>,
}
