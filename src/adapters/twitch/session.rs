use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

use super::api::{TwitchApiClient, FOLLOWED_STREAMS_ENDPOINT, USERS_ENDPOINT};
use super::normalize::ResponseNormalizer;
use crate::adapters::http_client::HttpClient;
use crate::auth::{AuthAction, Environment, Token, TokenStore, UrlAuthExchange, UserId};
use crate::config::TwitchConfig;
use crate::core::{Notifier, RequestCounters, RequestTracker, StreamRecord};
use crate::error::AdapterError;

/// Where a session is in its fetch chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    TokenResolved,
    UserResolved,
    StreamsResolved,
    Published,
}

/// How a session run ended
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// The environment was sent to the authorization endpoint
    Redirected(Url),
    /// Records were handed to the notifier (possibly none)
    Published(Vec<StreamRecord>),
    /// The run was cancelled before publishing
    Cancelled,
}

#[derive(Debug, Deserialize)]
struct HelixUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct HelixUsers {
    data: Vec<HelixUser>,
}

/// One page load's worth of work for the Twitch adapter
///
/// Holds the token, user ID and request counters for this adapter instance
/// only, so several sessions can run side by side.
pub struct FollowedStreamsSession {
    id: Uuid,
    config: TwitchConfig,
    environment: Arc<dyn Environment>,
    notifier: Arc<dyn Notifier>,
    exchange: UrlAuthExchange,
    api: TwitchApiClient,
    normalizer: ResponseNormalizer,
    tracker: Arc<RequestTracker>,
    token: TokenStore,
    user_id: UserId,
    stage: Stage,
}

impl FollowedStreamsSession {
    /// Create a session that talks to Twitch over reqwest
    pub fn new(
        config: TwitchConfig,
        environment: Arc<dyn Environment>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let tracker = Arc::new(RequestTracker::new(config.source_label.clone(), notifier.clone()));
        let api = TwitchApiClient::new(&config, Arc::clone(&tracker));
        Self::assemble(config, environment, notifier, tracker, api)
    }

    /// Create a session with a custom HTTP client
    pub fn with_http_client(
        config: TwitchConfig,
        environment: Arc<dyn Environment>,
        notifier: Arc<dyn Notifier>,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        let tracker = Arc::new(RequestTracker::new(config.source_label.clone(), notifier.clone()));
        let api = TwitchApiClient::with_http_client(&config, Arc::clone(&tracker), http_client);
        Self::assemble(config, environment, notifier, tracker, api)
    }

    fn assemble(
        config: TwitchConfig,
        environment: Arc<dyn Environment>,
        notifier: Arc<dyn Notifier>,
        tracker: Arc<RequestTracker>,
        api: TwitchApiClient,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            exchange: UrlAuthExchange::new(&config),
            normalizer: ResponseNormalizer::new(&config),
            config,
            environment,
            notifier,
            api,
            tracker,
            token: TokenStore::new(),
            user_id: UserId::Unknown,
            stage: Stage::Init,
        }
    }

    /// Session identifier used in logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn token(&self) -> &Token {
        self.token.state()
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn counters(&self) -> RequestCounters {
        self.tracker.counters()
    }

    /// Every request this session started has completed
    pub fn requests_are_done(&self) -> bool {
        self.tracker.is_settled()
    }

    /// Run the whole chain: resolve the token, look up the user, fetch and publish streams
    pub async fn run(&mut self, cancel: &CancellationToken) -> SessionOutcome {
        let span = info_span!("twitch_session", session_id = %self.id);
        self.run_stages(cancel).instrument(span).await
    }

    async fn run_stages(&mut self, cancel: &CancellationToken) -> SessionOutcome {
        self.stage = Stage::Init;

        // Init -> TokenResolved
        let current_url = self.environment.current_url();
        match self.exchange.evaluate(&current_url, &mut self.token) {
            AuthAction::Redirect(url) => {
                self.environment.navigate(&url);
                return SessionOutcome::Redirected(url);
            }
            AuthAction::Continue(Token::Error(e)) => self.notify(&e),
            AuthAction::Continue(_) => {}
        }
        self.transition(Stage::TokenResolved);

        // TokenResolved -> UserResolved
        let user_request = match self.token.state() {
            Token::Valid(token) => {
                Some(self.api.request(USERS_ENDPOINT, &[], token).send(cancel).await)
            }
            _ => None,
        };

        let pending_user = match user_request {
            Some((response, completion)) => {
                let user = response.and_then(parse_user_id);
                match &user {
                    Ok(id) => {
                        debug!(user_id = %id, "Resolved Twitch user");
                        UrlAuthExchange::strip_fragment(self.environment.as_ref());
                    }
                    Err(e) if e.is_cancelled() => return SessionOutcome::Cancelled,
                    Err(e) => self.notify(e),
                }
                self.user_id = UserId::from(user);
                Some(completion)
            }
            None => {
                if let Err(e) = self.token.state().as_result() {
                    self.user_id = UserId::Error(e);
                }
                None
            }
        };
        self.transition(Stage::UserResolved);

        // UserResolved -> StreamsResolved
        let streams_request = match (self.token.state(), self.user_id.known()) {
            (Token::Valid(token), Some(user_id)) => {
                let query = [
                    ("first", self.config.stream_limit.to_string()),
                    ("user_id", user_id.to_string()),
                ];
                Some(self.api.request(FOLLOWED_STREAMS_ENDPOINT, &query, token))
            }
            _ => None,
        };

        // StreamsResolved -> Published
        let records = match streams_request {
            Some(request) => {
                // The user lookup only counts as completed once the next request has started
                if let Some(completion) = pending_user {
                    completion.finish();
                }

                let (response, completion) = request.send(cancel).await;
                if matches!(response, Err(AdapterError::Cancelled)) {
                    return SessionOutcome::Cancelled;
                }
                let records = self.handle_streams(response);
                self.publish(&records);
                completion.finish();
                records
            }
            None => {
                debug!("Skipping followed streams request after earlier failure");
                let records = self.normalizer.normalize(Err(self.upstream_failure()));
                self.transition(Stage::StreamsResolved);
                self.publish(&records);
                // A failed user lookup stays open until the empty list is out
                if let Some(completion) = pending_user {
                    completion.finish();
                }
                records
            }
        };

        SessionOutcome::Published(records)
    }

    fn handle_streams(&mut self, response: Result<Value, AdapterError>) -> Vec<StreamRecord> {
        match &response {
            Ok(_) => {
                UrlAuthExchange::strip_fragment(self.environment.as_ref());
            }
            Err(e) => self.notify(e),
        }
        self.transition(Stage::StreamsResolved);
        self.normalizer.normalize(response)
    }

    fn publish(&mut self, records: &[StreamRecord]) {
        info!(count = records.len(), "Publishing followed streams");
        self.notifier.add_streams(records);
        self.transition(Stage::Published);
    }

    /// The failure that made the streams request pointless
    fn upstream_failure(&self) -> AdapterError {
        match (self.token.state(), &self.user_id) {
            (Token::Error(e), _) => e.clone(),
            (_, UserId::Error(e)) => e.clone(),
            _ => AdapterError::api("No user ID available for the followed streams request"),
        }
    }

    fn notify(&self, error: &AdapterError) {
        warn!(error = %error, "Twitch adapter failure");
        self.notifier.show_notification(&error.user_message());
    }

    fn transition(&mut self, stage: Stage) {
        debug!(from = ?self.stage, to = ?stage, "Session stage change");
        self.stage = stage;
    }
}

fn parse_user_id(body: Value) -> Result<String, AdapterError> {
    let users: HelixUsers = serde_json::from_value(body)
        .map_err(|e| AdapterError::api(format!("Failed to parse user response: {}", e)))?;

    users
        .data
        .into_iter()
        .next()
        .map(|user| user.id)
        .ok_or_else(|| AdapterError::api("User lookup returned no users"))
}
