pub mod adapters;
pub mod auth;
pub mod config;
pub mod core;
pub mod error;

#[cfg(test)]
mod tests;

// Re-export core components
pub use crate::adapters::{FollowedStreamsSession, SessionOutcome, Stage};
pub use crate::auth::{AuthAction, Environment, MemoryEnvironment, Token, UrlAuthExchange, UserId};
pub use crate::config::TwitchConfig;
pub use crate::core::{Notifier, RequestStatus, RequestTracker, StreamRecord, TracingNotifier};
pub use crate::error::AdapterError;
