use twitch_oauth2::AccessToken;

use crate::error::AdapterError;

/// State of the single bearer credential held by a session
#[derive(Debug, Clone, Default)]
pub enum Token {
    /// Nothing has been evaluated yet
    #[default]
    Absent,
    /// We computed an authorization redirect and are waiting to come back
    PendingRedirect,
    /// The URL told us something went wrong; no API call may use this token
    Error(AdapterError),
    /// A usable access token
    Valid(AccessToken),
}

impl Token {
    /// View the token as a stage result for the request chain
    pub fn as_result(&self) -> Result<&AccessToken, AdapterError> {
        match self {
            Token::Valid(token) => Ok(token),
            Token::Error(e) => Err(e.clone()),
            Token::Absent | Token::PendingRedirect => {
                Err(AdapterError::unauthorized("No access token has been resolved"))
            }
        }
    }
}

/// Holds the session's token and the rules for changing it
///
/// Only [`UrlAuthExchange`](super::UrlAuthExchange) writes to the store.
#[derive(Debug, Default)]
pub struct TokenStore {
    state: Token,
}

impl TokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token state
    pub fn state(&self) -> &Token {
        &self.state
    }

    pub(crate) fn set(&mut self, state: Token) {
        self.state = state;
    }
}

/// Identifier of the authenticated user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserId {
    #[default]
    Unknown,
    Error(AdapterError),
    Known(String),
}

impl UserId {
    /// The user ID, if the lookup succeeded
    pub fn known(&self) -> Option<&str> {
        match self {
            UserId::Known(id) => Some(id),
            _ => None,
        }
    }
}

impl From<Result<String, AdapterError>> for UserId {
    fn from(result: Result<String, AdapterError>) -> Self {
        match result {
            Ok(id) => UserId::Known(id),
            Err(e) => UserId::Error(e),
        }
    }
}
