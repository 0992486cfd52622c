use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Game or category a stream is playing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameInfo {
    pub name: String,
    pub link: String,
    pub image_url: String,
}

/// A live stream in the aggregator's site-agnostic shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRecord {
    pub channel_link: String,
    pub thumbnail_url: String,
    pub title: String,
    pub game: Option<GameInfo>,
    pub viewer_count: u64,
    pub channel_name: String,
    pub start_date: DateTime<Utc>,
    /// Which site the stream came from
    pub site: String,
}
