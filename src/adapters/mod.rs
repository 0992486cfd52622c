pub mod http_client;
pub mod twitch;

pub use http_client::{HttpClient, ReqwestHttpClient, SimpleHttpResponse};
pub use twitch::{FollowedStreamsSession, SessionOutcome, Stage};
