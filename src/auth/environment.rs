use url::Url;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Access to the page the adapter runs on
///
/// Abstracts the browser location and history so the auth flow can be
/// driven from tests or a command line.
pub trait Environment: Send + Sync {
    /// The URL currently shown, including query and fragment
    fn current_url(&self) -> Url;

    /// Navigate away to another URL
    fn navigate(&self, url: &Url);

    /// Replace the displayed URL without reloading or adding a history entry
    fn replace_url(&self, url: &Url);
}

/// An [`Environment`] backed by an in-memory URL
///
/// Navigations and replacements are recorded so callers can inspect them.
#[derive(Debug)]
pub struct MemoryEnvironment {
    current: Mutex<Url>,
    navigations: Mutex<Vec<Url>>,
    replacements: Mutex<Vec<Url>>,
}

impl MemoryEnvironment {
    /// Create an environment showing `url`
    pub fn new(url: Url) -> Self {
        Self {
            current: Mutex::new(url),
            navigations: Mutex::new(Vec::new()),
            replacements: Mutex::new(Vec::new()),
        }
    }

    /// Parse `url` and create an environment showing it
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// URLs passed to [`Environment::navigate`], in order
    pub fn navigations(&self) -> Vec<Url> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// URLs passed to [`Environment::replace_url`], in order
    pub fn replacements(&self) -> Vec<Url> {
        self.replacements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Environment for MemoryEnvironment {
    fn current_url(&self) -> Url {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, url: &Url) {
        debug!(url = %url, "Navigating");
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = url.clone();
    }

    fn replace_url(&self, url: &Url) {
        debug!(url = %url, "Replacing displayed URL");
        self.replacements
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.clone());
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = url.clone();
    }
}
