use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use twitch_oauth2::{AccessToken, ClientId};
use url::Url;

use crate::adapters::http_client::{HttpClient, ReqwestHttpClient, SimpleHttpResponse};
use crate::config::TwitchConfig;
use crate::core::RequestTracker;
use crate::error::AdapterError;

/// Endpoint returning the user the token belongs to
pub const USERS_ENDPOINT: &str = "/helix/users";
/// Endpoint returning live streams the user follows
pub const FOLLOWED_STREAMS_ENDPOINT: &str = "/helix/streams/followed";

/// Authenticated client for the Helix API
///
/// Every request is counted by the session's [`RequestTracker`].
#[derive(Clone)]
pub struct TwitchApiClient {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,
    client_id: ClientId,
    api_base: String,
    tracker: Arc<RequestTracker>,
}

impl TwitchApiClient {
    /// Create a new API client with the default HTTP client
    pub fn new(config: &TwitchConfig, tracker: Arc<RequestTracker>) -> Self {
        Self::with_http_client(config, tracker, Arc::new(ReqwestHttpClient::new()))
    }

    /// Create a new API client with a custom HTTP client
    pub fn with_http_client(
        config: &TwitchConfig,
        tracker: Arc<RequestTracker>,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            http_client,
            client_id: config.client_id(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            tracker,
        }
    }

    /// Start a request; it is counted as begun right away
    pub fn request(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        token: &AccessToken,
    ) -> ApiRequest {
        let target = self.endpoint_url(endpoint, query);

        let mut headers = HashMap::new();
        headers.insert("Client-Id".to_string(), self.client_id.as_str().to_string());
        headers.insert("Authorization".to_string(), format!("Bearer {}", token.secret()));

        self.tracker.begin();

        ApiRequest {
            http_client: Arc::clone(&self.http_client),
            target,
            headers,
            completion: RequestCompletion {
                tracker: Some(Arc::clone(&self.tracker)),
            },
        }
    }

    /// Send a request, hand the result to `on_done`, then count it as completed
    pub async fn fetch<T>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        token: &AccessToken,
        cancel: &CancellationToken,
        on_done: impl FnOnce(Result<Value, AdapterError>) -> T,
    ) -> T {
        let (result, completion) = self.request(endpoint, query, token).send(cancel).await;
        let output = on_done(result);
        completion.finish();
        output
    }

    fn endpoint_url(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Url, AdapterError> {
        let mut url = Url::parse(&format!("{}{}", self.api_base, endpoint)).map_err(|e| {
            AdapterError::config(format!("Invalid API URL '{}{}': {}", self.api_base, endpoint, e))
        })?;

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }
}

/// A counted request that has not been sent yet
pub struct ApiRequest {
    http_client: Arc<dyn HttpClient>,
    target: Result<Url, AdapterError>,
    headers: HashMap<String, String>,
    completion: RequestCompletion,
}

impl ApiRequest {
    /// Send the request
    ///
    /// The returned completion must be finished once the caller has handled
    /// the result; that is when the request counts as completed.
    pub async fn send(
        self,
        cancel: &CancellationToken,
    ) -> (Result<Value, AdapterError>, RequestCompletion) {
        let ApiRequest {
            http_client,
            target,
            headers,
            completion,
        } = self;

        let url = match target {
            Ok(url) => url,
            Err(e) => return (Err(e), completion),
        };

        debug!(url = %url, "Sending Twitch API request");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(url = %url, "Request cancelled");
                Err(AdapterError::Cancelled)
            }
            response = http_client.get(url.as_str(), headers) => match response {
                Ok(response) => classify_response(&response),
                Err(e) => {
                    warn!(error = %e, url = %url, "HTTP request to Twitch API failed");
                    Err(AdapterError::connection(format!("Failed to connect to Twitch API: {}", e)))
                }
            },
        };

        (result, completion)
    }
}

/// Marks a request as completed when finished or dropped
#[must_use = "finish the completion after handling the response"]
pub struct RequestCompletion {
    tracker: Option<Arc<RequestTracker>>,
}

impl RequestCompletion {
    /// Count the request as completed
    pub fn finish(mut self) {
        self.complete();
    }

    fn complete(&mut self) {
        if let Some(tracker) = self.tracker.take() {
            tracker.end();
        }
    }
}

impl Drop for RequestCompletion {
    fn drop(&mut self) {
        self.complete();
    }
}

/// Sort a completed HTTP exchange into data or an adapter error
fn classify_response(response: &SimpleHttpResponse) -> Result<Value, AdapterError> {
    let body: Option<Value> = response.json().ok();

    let unauthorized = body
        .as_ref()
        .and_then(|b| b.get("error"))
        .and_then(Value::as_str)
        .is_some_and(|error| error == "Unauthorized");

    if unauthorized || response.status() == 401 {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("Unauthorized")
            .to_string();
        warn!(status = response.status(), message = %message, "Twitch rejected the access token");
        return Err(AdapterError::unauthorized(message));
    }

    if !response.is_success() {
        warn!(
            status = response.status(),
            body = response.body(),
            "Received error status from Twitch API"
        );
        return Err(AdapterError::api_with_status(
            format!("Twitch API error: {}", response.body()),
            response.status(),
        ));
    }

    body.ok_or_else(|| AdapterError::api("Failed to parse Twitch API response"))
}
