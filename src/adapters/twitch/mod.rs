//! Twitch followed-streams adapter

pub mod api;
pub mod normalize;
pub mod session;

pub use api::{ApiRequest, RequestCompletion, TwitchApiClient};
pub use normalize::{ResponseNormalizer, FALLBACK_TITLE, SITE_TAG};
pub use session::{FollowedStreamsSession, SessionOutcome, Stage};
