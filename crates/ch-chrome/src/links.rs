//! Site-relative link rewriting.

use ch_dom::Document;
use ch_dom::NodeId;

use crate::basepath::BasePrefix;

/// Rewrites site-relative hrefs under the resolved base prefix.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    prefix: BasePrefix,
}

impl LinkRewriter {
    pub fn new(prefix: BasePrefix) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> &BasePrefix {
        &self.prefix
    }

    /// Returns the rewritten href. Absolute URLs, `mailto:`/`tel:` links,
    /// pure fragments, empty hrefs, and hrefs already under the prefix pass
    /// through unchanged, so re-rewriting is a no-op.
    pub fn rewrite(&self, href: &str) -> String {
        if href.is_empty() || is_external(href) || href.starts_with('#') {
            return href.to_owned();
        }

        let prefix = self.prefix.as_str();
        if !prefix.is_empty() && (href == prefix || href.starts_with(&format!("{prefix}/"))) {
            return collapse_slashes(href);
        }

        let rooted = if href.starts_with('/') {
            href.to_owned()
        } else {
            format!("/{href}")
        };
        collapse_slashes(&format!("{prefix}{rooted}"))
    }

    /// Rewrites every anchor under the nav container.
    pub fn apply_to_nav(&self, doc: &mut Document, nav: NodeId) {
        for link in doc.elements_by_tag_in(nav, "a") {
            self.rewrite_href(doc, link);
        }
    }

    /// Rewrites the site logo link, wherever the partial placed it.
    pub fn apply_to_logo(&self, doc: &mut Document) {
        if let Some(logo) = doc.first_element_by_class("site-logo") {
            self.rewrite_href(doc, logo);
        }
    }

    fn rewrite_href(&self, doc: &mut Document, id: NodeId) {
        let Some(href) = doc.attr(id, "href").map(ToOwned::to_owned) else {
            return;
        };
        doc.set_attr(id, "href", &self.rewrite(&href));
    }
}

fn is_external(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
}

fn collapse_slashes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_slash = false;
    for ch in input.chars() {
        if ch == '/' {
            if !last_was_slash {
                out.push(ch);
            }
            last_was_slash = true;
        } else {
            out.push(ch);
            last_was_slash = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::LinkRewriter;
    use crate::basepath::BasePrefix;
    use crate::basepath::SCRIPT_MARKER;
    use ch_dom::Document;
    use url::Url;

    fn rewriter(prefix: &str) -> LinkRewriter {
        let doc = Document::parse(&format!(
            r#"<script src="{prefix}/assets/chrome.js"></script>"#
        ));
        let url = match Url::parse("https://example.com/") {
            Ok(url) => url,
            Err(error) => panic!("test url should parse: {error}"),
        };
        LinkRewriter::new(crate::basepath::resolve(&doc, &url, SCRIPT_MARKER))
    }

    fn root_rewriter() -> LinkRewriter {
        LinkRewriter::new(BasePrefix::empty())
    }

    #[test]
    fn external_and_fragment_hrefs_pass_through() {
        let rewriter = rewriter("/site");
        for href in [
            "https://example.org/page",
            "HTTP://example.org/",
            "mailto:hi@example.com",
            "tel:+15550100",
            "#section",
            "",
        ] {
            assert_eq!(rewriter.rewrite(href), href);
        }
    }

    #[test]
    fn relative_hrefs_get_rooted_and_prefixed() {
        let rewriter = rewriter("/site");
        assert_eq!(rewriter.rewrite("/docs/"), "/site/docs/");
        assert_eq!(rewriter.rewrite("docs/"), "/site/docs/");
        assert_eq!(rewriter.rewrite("//docs//page/"), "/site/docs/page/");
    }

    #[test]
    fn empty_prefix_only_normalizes() {
        let rewriter = root_rewriter();
        assert_eq!(rewriter.rewrite("docs/"), "/docs/");
        assert_eq!(rewriter.rewrite("/docs/"), "/docs/");
    }

    #[test]
    fn rewriting_twice_equals_rewriting_once() {
        for rewriter in [rewriter("/site"), root_rewriter()] {
            for href in ["/docs/", "docs/", "//a//b", "/"] {
                let once = rewriter.rewrite(href);
                assert_eq!(rewriter.rewrite(&once), once, "href `{href}`");
            }
        }
    }

    #[test]
    fn nav_anchors_and_logo_are_rewritten_in_place() {
        let mut doc = Document::parse(
            r#"<nav id="site-nav">
                 <a id="docs" href="/docs/">Docs</a>
                 <a id="ext" href="https://example.org/">Ext</a>
                 <a id="bare">no href</a>
               </nav>
               <a class="site-logo" href="/">Logo</a>"#,
        );
        let rewriter = rewriter("/site");
        let nav = match doc.element_by_id("site-nav") {
            Some(id) => id,
            None => panic!("nav should parse"),
        };
        rewriter.apply_to_nav(&mut doc, nav);
        rewriter.apply_to_logo(&mut doc);

        let docs = match doc.element_by_id("docs") {
            Some(id) => id,
            None => panic!("docs anchor should parse"),
        };
        assert_eq!(doc.attr(docs, "href"), Some("/site/docs/"));

        let ext = match doc.element_by_id("ext") {
            Some(id) => id,
            None => panic!("external anchor should parse"),
        };
        assert_eq!(doc.attr(ext, "href"), Some("https://example.org/"));

        let logo = match doc.first_element_by_class("site-logo") {
            Some(id) => id,
            None => panic!("logo should parse"),
        };
        assert_eq!(doc.attr(logo, "href"), Some("/site/"));
    }
}
