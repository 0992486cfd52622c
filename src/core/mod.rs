//! Pieces shared with the aggregation layer: records, reporting and request counts

pub mod notifier;
pub mod record;
pub mod tracker;

pub use notifier::{Notifier, RequestCounters, RequestStatus, TracingNotifier};
pub use record::{GameInfo, StreamRecord};
pub use tracker::RequestTracker;
