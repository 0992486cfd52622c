use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};
use twitch_oauth2::{AccessToken, ClientId};
use url::Url;

use super::environment::Environment;
use super::token::{Token, TokenStore};
use crate::config::TwitchConfig;
use crate::error::AdapterError;

/// Query item the authorization server appends when our redirect URI is rejected
const REDIRECT_MISMATCH_MARKER: &str = "error=redirect_mismatch";

/// Matches `#access_token=<token>`, optionally followed by more parameters
static TOKEN_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#access_token=([a-z0-9]+)").expect("token fragment pattern is valid")
});

/// What the caller should do after evaluating the current URL
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// Leave the page and go to the authorization endpoint
    Redirect(Url),
    /// Stay on the page with the resolved token state
    Continue(Token),
}

/// Resolves the implicit-grant token from the page URL
#[derive(Debug, Clone)]
pub struct UrlAuthExchange {
    auth_endpoint: String,
    client_id: ClientId,
    scopes: Vec<String>,
}

impl UrlAuthExchange {
    /// Create an exchange for the configured application
    pub fn new(config: &TwitchConfig) -> Self {
        Self {
            auth_endpoint: config.auth_endpoint.clone(),
            client_id: config.client_id(),
            scopes: config.scopes.clone(),
        }
    }

    /// Evaluate `current_url` once and record the resulting token in `store`
    pub fn evaluate(&self, current_url: &Url, store: &mut TokenStore) -> AuthAction {
        if has_redirect_mismatch(current_url) {
            // We can't know which redirect URI the server expected, so don't guess one
            warn!("Authorization server reported a redirect URI mismatch");
            return Self::finish(store, Token::Error(AdapterError::RedirectMismatch));
        }

        // Only a missing fragment starts a round trip; a bare `#` falls through to parsing
        let Some(fragment) = current_url.fragment() else {
            return match self.authorize_url(current_url) {
                Ok(url) => {
                    info!(url = %url, "No access token in URL, redirecting to authorization");
                    store.set(Token::PendingRedirect);
                    AuthAction::Redirect(url)
                }
                Err(e) => {
                    warn!(error = %e, "Could not build authorization URL");
                    Self::finish(store, Token::Error(e))
                }
            };
        };

        let hash = format!("#{}", fragment);
        match TOKEN_FRAGMENT.captures(&hash).and_then(|c| c.get(1)) {
            Some(token) => {
                debug!(token_len = token.as_str().len(), "Access token found in URL fragment");
                Self::finish(
                    store,
                    Token::Valid(AccessToken::new(token.as_str().to_string())),
                )
            }
            None => {
                warn!("URL fragment present but no access token could be parsed");
                Self::finish(store, Token::Error(AdapterError::TokenUnparsable))
            }
        }
    }

    /// Build the authorization URL that sends the user back to `redirect_uri`
    pub fn authorize_url(&self, redirect_uri: &Url) -> Result<Url, AdapterError> {
        let scope = self.scopes.join(" ");
        let url = format!(
            "{}?response_type=token&client_id={}&redirect_uri={}&scope={}",
            self.auth_endpoint,
            self.client_id.as_str(),
            redirect_uri,
            urlencoding::encode(&scope)
        );

        Url::parse(&url).map_err(|e| {
            AdapterError::config(format!(
                "Invalid authorization endpoint '{}': {}",
                self.auth_endpoint, e
            ))
        })
    }

    /// Remove the fragment from the displayed URL once the token has proven good
    ///
    /// Returns `false` when there was no fragment to remove.
    pub fn strip_fragment(environment: &dyn Environment) -> bool {
        let mut url = environment.current_url();
        if url.fragment().is_none() {
            return false;
        }

        url.set_fragment(None);
        environment.replace_url(&url);
        debug!("Removed access token fragment from URL");
        true
    }

    fn finish(store: &mut TokenStore, token: Token) -> AuthAction {
        store.set(token.clone());
        AuthAction::Continue(token)
    }
}

fn has_redirect_mismatch(url: &Url) -> bool {
    url.query()
        .map(|query| query.split('&').any(|item| item == REDIRECT_MISMATCH_MARKER))
        .unwrap_or(false)
}
