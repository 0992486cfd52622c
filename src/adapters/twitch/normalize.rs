use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::TwitchConfig;
use crate::core::{GameInfo, StreamRecord};
use crate::error::AdapterError;

/// Site tag attached to every record from this adapter
pub const SITE_TAG: &str = "Twitch";
/// Title used when a stream has none
pub const FALLBACK_TITLE: &str = "(Failed to load title)";

const THUMBNAIL_WIDTH: &str = "240";
const THUMBNAIL_HEIGHT: &str = "135";
const BOX_ART_SIZE: &str = "138x190";

/// One entry of the followed-streams `data` array
#[derive(Debug, Deserialize)]
struct HelixStream {
    user_login: String,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    game_id: Option<String>,
    #[serde(default)]
    game_name: Option<String>,
    #[serde(default)]
    viewer_count: Option<u64>,
    started_at: DateTime<Utc>,
}

/// Turns followed-streams responses into [`StreamRecord`]s
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    site_base: String,
    box_art_base: String,
}

impl ResponseNormalizer {
    pub fn new(config: &TwitchConfig) -> Self {
        Self {
            site_base: config.site_base.trim_end_matches('/').to_string(),
            box_art_base: config.box_art_base.trim_end_matches('/').to_string(),
        }
    }

    /// Normalize a stage result; failures yield an empty list
    pub fn normalize(&self, response: Result<Value, AdapterError>) -> Vec<StreamRecord> {
        let body = match response {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "No streams to normalize after earlier failure");
                return Vec::new();
            }
        };

        let Some(data) = body.get("data").and_then(Value::as_array) else {
            warn!("Followed streams response has no data array");
            return Vec::new();
        };

        data.iter()
            .filter_map(|entry| match HelixStream::deserialize(entry) {
                Ok(stream) => Some(self.to_record(stream)),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed stream entry");
                    None
                }
            })
            .collect()
    }

    fn to_record(&self, stream: HelixStream) -> StreamRecord {
        let title = stream
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        let has_game_id = stream.game_id.as_deref().is_some_and(|id| !id.is_empty());
        let game_name = stream.game_name.unwrap_or_default();
        let game = (has_game_id || !game_name.is_empty()).then(|| GameInfo {
            link: format!("{}/directory/game/{}", self.site_base, game_name),
            image_url: format!("{}/{}-{}.jpg", self.box_art_base, game_name, BOX_ART_SIZE),
            name: game_name,
        });

        StreamRecord {
            channel_link: format!("{}/{}", self.site_base, stream.user_login),
            thumbnail_url: stream
                .thumbnail_url
                .unwrap_or_default()
                .replace("{width}", THUMBNAIL_WIDTH)
                .replace("{height}", THUMBNAIL_HEIGHT),
            title,
            game,
            viewer_count: stream.viewer_count.unwrap_or_default(),
            channel_name: stream.user_name.unwrap_or_default(),
            start_date: stream.started_at,
            site: SITE_TAG.to_string(),
        }
    }
}
