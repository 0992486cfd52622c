//! Test harness for driving sessions against a mock Helix server
use std::sync::{Arc, Mutex};

use livelist::core::RequestStatus;
use livelist::{FollowedStreamsSession, MemoryEnvironment, Notifier, StreamRecord, TwitchConfig};

pub const CLIENT_ID: &str = "integration_client_id";

/// Notifier that keeps everything it was told
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    pub notifications: Mutex<Vec<String>>,
    pub statuses: Mutex<Vec<RequestStatus>>,
    pub batches: Mutex<Vec<Vec<StreamRecord>>>,
}

impl Notifier for CollectingNotifier {
    fn show_notification(&self, message: &str) {
        self.notifications.lock().unwrap().push(message.to_string());
    }

    fn update_request_status(&self, status: &RequestStatus) {
        self.statuses.lock().unwrap().push(status.clone());
    }

    fn add_streams(&self, streams: &[StreamRecord]) {
        self.batches.lock().unwrap().push(streams.to_vec());
    }
}

/// A session plus handles on its fakes
pub struct Harness {
    pub session: FollowedStreamsSession,
    pub environment: Arc<MemoryEnvironment>,
    pub notifier: Arc<CollectingNotifier>,
}

impl Harness {
    /// Build a reqwest-backed session pointed at `api_base`
    pub fn new(api_base: &str, page_url: &str) -> Self {
        let config = TwitchConfig::new(CLIENT_ID).with_api_base(api_base);
        let environment = Arc::new(MemoryEnvironment::parse(page_url).unwrap());
        let notifier = Arc::new(CollectingNotifier::default());
        let session = FollowedStreamsSession::new(config, environment.clone(), notifier.clone());

        Self {
            session,
            environment,
            notifier,
        }
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifier.notifications.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<Vec<StreamRecord>> {
        self.notifier.batches.lock().unwrap().clone()
    }
}
