//! Base path resolution.
//!
//! Decides, once per page load, the URL prefix under which the site is
//! served. Reads page metadata only: an explicit `<meta name="site-base">`
//! declaration wins, otherwise the chrome bundle's own `<script src>` is
//! located and the prefix is whatever precedes its well-known path marker.
//! This never fails; anything malformed resolves to the empty prefix.

use ch_dom::Document;
use url::Url;

/// Well-known path of the chrome bundle inside a deployed site.
pub const SCRIPT_MARKER: &str = "assets/chrome.js";

/// Site URL prefix. Either empty (served at the domain root) or an absolute
/// path segment starting with `/` and never ending in one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePrefix(String);

impl BasePrefix {
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for BasePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the base prefix for a page.
pub fn resolve(doc: &Document, page_url: &Url, marker: &str) -> BasePrefix {
    if let Some(declared) = declared_base(doc) {
        return declared;
    }

    let Some(src) = chrome_script_src(doc, marker) else {
        return BasePrefix::empty();
    };

    prefix_from_script_src(page_url, &src, marker)
}

fn declared_base(doc: &Document) -> Option<BasePrefix> {
    let meta = doc
        .elements_by_tag("meta")
        .into_iter()
        .find(|&id| doc.attr(id, "name") == Some("site-base"))?;
    let content = doc.attr(meta, "content")?.trim();
    if content.is_empty() {
        return None;
    }

    let normalized = format!("/{}", content.trim_matches('/'));
    if normalized == "/" {
        Some(BasePrefix::empty())
    } else {
        Some(BasePrefix(normalized))
    }
}

/// Finds the script element whose source path ends in the chrome bundle's
/// filename, case-insensitively, with an optional query string.
fn chrome_script_src(doc: &Document, marker: &str) -> Option<String> {
    let marker = marker.to_ascii_lowercase();
    doc.elements_by_tag("script")
        .into_iter()
        .filter_map(|id| doc.attr(id, "src"))
        .find(|src| {
            let lower = src.to_ascii_lowercase();
            let path = match lower.split_once('?') {
                Some((path, _)) => path,
                None => lower.as_str(),
            };
            path == marker || path.ends_with(&format!("/{marker}"))
        })
        .map(ToOwned::to_owned)
}

fn prefix_from_script_src(page_url: &Url, src: &str, marker: &str) -> BasePrefix {
    let Ok(script_url) = page_url.join(src) else {
        return BasePrefix::empty();
    };

    let path = script_url.path();
    let needle = format!("/{}", marker.to_ascii_lowercase());
    let Some(index) = path.to_ascii_lowercase().rfind(&needle) else {
        return BasePrefix::empty();
    };

    let base = path[..index].trim_end_matches('/');
    if base.is_empty() {
        BasePrefix::empty()
    } else {
        BasePrefix(base.to_owned())
    }
}
