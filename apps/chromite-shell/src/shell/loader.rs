//! Site-directory resource loader.

use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use ch_chrome::FetchMode;
use ch_chrome::ResourceLoader;
use ch_core::ChromeError;
use ch_core::ChromeResult;

/// Serves chrome fetches from a static site directory on disk. Paths are
/// confined to the root; no caching exists, so the no-store contract holds
/// trivially.
#[derive(Debug, Clone)]
pub(crate) struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ResourceLoader for DirectoryLoader {
    fn fetch_text(&self, path: &str, _mode: FetchMode) -> ChromeResult<String> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes_root = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_)));
        if escapes_root {
            return Err(ChromeError::new(
                "shell.loader.path_invalid",
                format!("refusing `{path}`: it escapes the site root"),
            ));
        }

        let full = self.root.join(relative);
        log::debug!("loading {}", full.display());
        fs::read_to_string(&full).map_err(|error| {
            ChromeError::new(
                "shell.loader.fetch_failed",
                format!("failed to load {}: {error}", full.display()),
            )
        })
    }
}
