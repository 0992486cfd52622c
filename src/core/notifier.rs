use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::record::StreamRecord;

/// Request counts reported for status display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCounters {
    pub total: u64,
    pub completed: u64,
}

impl RequestCounters {
    /// Every started request has finished
    pub fn is_settled(&self) -> bool {
        self.total == self.completed
    }
}

/// A labelled snapshot of an adapter's request counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
    /// Source the counts belong to (e.g. "Twitch")
    pub label: String,
    #[serde(flatten)]
    pub counters: RequestCounters,
}

/// The aggregation layer the adapter reports to
pub trait Notifier: Send + Sync {
    /// Show a message to the user
    fn show_notification(&self, message: &str);

    /// Report the current request counts
    fn update_request_status(&self, status: &RequestStatus);

    /// Hand over the streams found by the adapter (possibly none)
    fn add_streams(&self, streams: &[StreamRecord]);
}

/// A [`Notifier`] that writes everything to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn show_notification(&self, message: &str) {
        warn!(notification = %message, "User notification");
    }

    fn update_request_status(&self, status: &RequestStatus) {
        info!(
            source = %status.label,
            total = status.counters.total,
            completed = status.counters.completed,
            "Request status"
        );
    }

    fn add_streams(&self, streams: &[StreamRecord]) {
        info!(count = streams.len(), "Streams published");
    }
}
