//! Resource loading seam.
//!
//! Every network-like operation the chrome performs goes through
//! [`ResourceLoader`], so hosts decide where partials and the search index
//! actually come from. Loads are synchronous; the bootstrap drives them
//! from worker threads where concurrency is required.

use std::collections::HashMap;

use ch_core::ChromeError;
use ch_core::ChromeResult;

/// Cache behavior requested for a fetch. Partials and the search index are
/// always fetched `NoStore`: a cached response must never be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    NoStore,
    Default,
}

/// Text-document fetching capability.
pub trait ResourceLoader: Sync {
    fn fetch_text(&self, path: &str, mode: FetchMode) -> ChromeResult<String>;
}

/// In-memory loader for tests and embedding without a site directory.
#[derive(Debug, Clone, Default)]
pub struct FixtureLoader {
    entries: HashMap<String, String>,
}

impl FixtureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, body: &str) -> Self {
        self.entries.insert(path.to_owned(), body.to_owned());
        self
    }
}

impl ResourceLoader for FixtureLoader {
    fn fetch_text(&self, path: &str, _mode: FetchMode) -> ChromeResult<String> {
        self.entries.get(path).cloned().ok_or_else(|| {
            ChromeError::new(
                "chrome.loader.not_found",
                format!("no fixture registered for `{path}`"),
            )
        })
    }
}
