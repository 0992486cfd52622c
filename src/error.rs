use thiserror::Error;

/// Guidance shown when the authorization server rejects our redirect URI.
pub const REDIRECT_MISMATCH_NOTICE: &str =
    "There was a URL-related problem with Twitch authentication. \
     Try loading the page again from a link or bookmark.";

/// Guidance shown when the URL fragment does not carry a usable token.
pub const TOKEN_UNPARSABLE_NOTICE: &str = "Couldn't find the Twitch authentication token. \
     If there's a # in the URL, try removing the # and everything after it, \
     then load the page again.";

/// Guidance shown when the platform rejects the bearer token.
pub const AUTH_FAILED_NOTICE: &str = "There was a problem with Twitch authentication. \
     Possible fixes: \
     (1) If there's a # in the URL, try removing the # and everything after it, \
     then load the page again. \
     (2) Go to twitch.tv, log out, log in again, and then try loading this page again.";

/// Errors produced by the Twitch adapter.
///
/// None of these are raised past the session: every stage hands its outcome
/// to the next as a `Result`, and a failed stage turns downstream network
/// calls into no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The authorization server reported `error=redirect_mismatch`
    #[error("Redirect URI mismatch reported by the authorization server")]
    RedirectMismatch,

    /// A fragment was present but did not contain an access token
    #[error("Could not parse an access token from the URL fragment")]
    TokenUnparsable,

    /// The platform rejected our bearer token
    #[error("Authentication error: {message}")]
    Unauthorized {
        /// Error message
        message: String,
    },

    /// The request never produced a response
    #[error("Connection error: {message}")]
    Connection {
        /// Error message
        message: String,
    },

    /// The platform answered with something other than data we can use
    #[error("API error: {message}")]
    Api {
        /// Error message
        message: String,
        /// Status code if available
        status: Option<u16>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// The run was cancelled before the request completed
    #[error("Request cancelled")]
    Cancelled,
}

impl AdapterError {
    /// Create an authentication error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an API error without a status code
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status: None,
        }
    }

    /// Create an API error with a status code
    pub fn api_with_status(message: impl Into<String>, status: u16) -> Self {
        Self::Api {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The notification text shown to the user for this failure
    pub fn user_message(&self) -> String {
        match self {
            Self::RedirectMismatch => REDIRECT_MISMATCH_NOTICE.to_string(),
            Self::TokenUnparsable => TOKEN_UNPARSABLE_NOTICE.to_string(),
            Self::Unauthorized { .. } => AUTH_FAILED_NOTICE.to_string(),
            other => format!("There was a problem getting streams from Twitch: {}", other),
        }
    }
}
