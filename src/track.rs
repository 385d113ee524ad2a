// Track metadata
// The one entity that moves through the whole system: search results,
// the playback queue, and the favorites list all carry these.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Video id, unique within a result set. Example: "dQw4w9WgXcQ".
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_url: Option<String>,
    /// Display duration, "M:SS" (or "H:MM:SS" for long videos).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,
    /// Watch-page URL, not a stream URL; streams expire, watch pages don't.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>, channel: impl Into<String>) -> Self {
        Track {
            id: id.into(),
            title: title.into(),
            thumbnail: None,
            channel: channel.into(),
            channel_url: None,
            duration: None,
            duration_seconds: None,
            views: None,
            url: None,
            description: None,
        }
    }
}
