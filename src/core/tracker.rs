use std::sync::{Arc, Mutex, PoisonError};
use tracing::{trace, warn};

use super::notifier::{Notifier, RequestCounters, RequestStatus};

/// Counts started and finished network requests for one adapter
///
/// Every change is reported to the observer immediately.
pub struct RequestTracker {
    label: String,
    counters: Mutex<RequestCounters>,
    observer: Arc<dyn Notifier>,
}

impl RequestTracker {
    /// Create a tracker that reports under `label`
    pub fn new(label: impl Into<String>, observer: Arc<dyn Notifier>) -> Self {
        Self {
            label: label.into(),
            counters: Mutex::new(RequestCounters {
                total: 0,
                completed: 0,
            }),
            observer,
        }
    }

    /// Record that a request was sent
    pub fn begin(&self) -> RequestCounters {
        self.update(|counters| counters.total += 1)
    }

    /// Record that a request finished
    pub fn end(&self) -> RequestCounters {
        self.update(|counters| {
            if counters.completed < counters.total {
                counters.completed += 1;
            } else {
                warn!(
                    total = counters.total,
                    "Request completion recorded without a matching start; ignoring"
                );
            }
        })
    }

    /// Every started request has finished
    pub fn is_settled(&self) -> bool {
        self.counters().is_settled()
    }

    /// Current counts
    pub fn counters(&self) -> RequestCounters {
        *self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, change: impl FnOnce(&mut RequestCounters)) -> RequestCounters {
        let snapshot = {
            let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
            change(&mut counters);
            *counters
        };

        trace!(
            source = %self.label,
            total = snapshot.total,
            completed = snapshot.completed,
            "Request counters changed"
        );
        self.observer.update_request_status(&RequestStatus {
            label: self.label.clone(),
            counters: snapshot,
        });
        snapshot
    }
}

impl std::fmt::Debug for RequestTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestTracker")
            .field("label", &self.label)
            .field("counters", &self.counters())
            .finish()
    }
}
