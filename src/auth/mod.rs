//! Implicit-grant authentication against Twitch

pub mod environment;
pub mod exchange;
pub mod token;

pub use environment::{Environment, MemoryEnvironment};
pub use exchange::{AuthAction, UrlAuthExchange};
pub use token::{Token, TokenStore, UserId};
