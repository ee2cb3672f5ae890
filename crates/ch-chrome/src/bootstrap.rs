//! Bootstrap sequencer and runtime.
//!
//! The chrome comes up through an ordered pipeline of named steps. The
//! fallible steps are guarded: the first failure is logged once and aborts
//! everything after it, while steps that already ran keep their effects.
//! Consequently a partial-injection failure means navigation, the scroll
//! header, and search are never set up for that page load, whereas a
//! search-setup failure leaves the earlier chrome fully functional.

use ch_core::ChromeError;
use ch_core::ChromeResult;
use ch_core::MOBILE_BREAKPOINT;
use ch_core::Viewport;
use ch_dom::Document;
use ch_nav::NavController;
use ch_scroll::HeaderRevealController;
use ch_scroll::RevealParams;
use ch_search::MatcherConfig;
use ch_search::MatcherProvider;
use ch_search::SearchController;
use ch_search::SearchElements;
use url::Url;

use crate::basepath;
use crate::basepath::BasePrefix;
use crate::links::LinkRewriter;
use crate::loader::FetchMode;
use crate::loader::ResourceLoader;
use crate::page;
use crate::partials;
use crate::partials::InjectReport;

/// Chrome behavior knobs. Defaults match the deployed site layout.
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    pub breakpoint: u32,
    pub header_partial: String,
    pub footer_partial: String,
    pub search_index: String,
    pub script_marker: String,
    pub reveal: RevealParams,
    pub matcher: MatcherConfig,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            breakpoint: MOBILE_BREAKPOINT,
            header_partial: "/partials/header.html".to_owned(),
            footer_partial: "/partials/footer.html".to_owned(),
            search_index: "/search/search-index.json".to_owned(),
            script_marker: basepath::SCRIPT_MARKER.to_owned(),
            reveal: RevealParams::default(),
            matcher: MatcherConfig::default(),
        }
    }
}

/// What the bootstrap accomplished, for hosts that report on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapSummary {
    pub prefix: BasePrefix,
    pub injected: InjectReport,
    pub nav_ready: bool,
    pub header_ready: bool,
    pub search_ready: bool,
}

/// One page load's chrome: the document plus the live controllers.
pub struct ChromeRuntime {
    pub(crate) doc: Document,
    pub(crate) page_url: Url,
    pub(crate) viewport: Viewport,
    pub(crate) config: ChromeConfig,
    pub(crate) rewriter: Option<LinkRewriter>,
    pub(crate) nav: Option<NavController>,
    pub(crate) scroll: Option<HeaderRevealController>,
    pub(crate) search: Option<SearchController>,
}

impl ChromeRuntime {
    /// Parses the page. Nothing is wired up until [`bootstrap`] runs.
    ///
    /// [`bootstrap`]: ChromeRuntime::bootstrap
    pub fn new(source: &str, page_url: Url, viewport: Viewport, config: ChromeConfig) -> Self {
        Self {
            doc: Document::parse(source),
            page_url,
            viewport,
            config,
            rewriter: None,
            nav: None,
            scroll: None,
            search: None,
        }
    }

    /// Runs the bootstrap pipeline. Aborts on the first failing step after
    /// reporting it to the diagnostic log; completed steps keep their
    /// effects either way.
    pub fn bootstrap(
        &mut self,
        loader: &dyn ResourceLoader,
        matcher_provider: &dyn MatcherProvider,
    ) -> ChromeResult<BootstrapSummary> {
        let prefix = basepath::resolve(&self.doc, &self.page_url, &self.config.script_marker);
        let rewriter = LinkRewriter::new(prefix.clone());
        self.rewriter = Some(rewriter.clone());
        log::debug!("base prefix resolved to `{prefix}`");

        let injected = guard(
            "inject-partials",
            partials::inject(
                &mut self.doc,
                loader,
                &rewriter,
                &self.config.header_partial,
                &self.config.footer_partial,
            ),
        )?;

        page::cleanup_legacy_footer(&mut self.doc);
        page::apply_title_color(&mut self.doc);
        page::stamp_footer_year(&mut self.doc, jiff::Zoned::now().year());

        let nav_node = self.doc.element_by_id("site-nav");
        if let Some(nav) = nav_node {
            rewriter.apply_to_nav(&mut self.doc, nav);
        }
        rewriter.apply_to_logo(&mut self.doc);

        if let Some(nav) = nav_node {
            ch_nav::mark_active_link(&mut self.doc, nav, &self.page_url);
            self.nav = Some(NavController::new(&self.doc, nav, self.config.breakpoint));
        }

        let header = self.doc.first_element_by_class("site-header");
        self.scroll = header.map(|header| {
            HeaderRevealController::new(&mut self.doc, header, self.config.reveal, 0.0)
        });

        self.search = guard(
            "setup-search",
            setup_search(
                &self.doc,
                loader,
                &rewriter,
                matcher_provider,
                &self.config,
            ),
        )?;

        Ok(BootstrapSummary {
            prefix,
            injected,
            nav_ready: self.nav.is_some(),
            header_ready: self.scroll.is_some(),
            search_ready: self.search.is_some(),
        })
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn prefix(&self) -> Option<&BasePrefix> {
        self.rewriter.as_ref().map(LinkRewriter::prefix)
    }

    pub fn nav(&self) -> Option<&NavController> {
        self.nav.as_ref()
    }

    pub fn search(&self) -> Option<&SearchController> {
        self.search.as_ref()
    }

    pub fn header_visibility(&self) -> Option<ch_scroll::HeaderVisibility> {
        self.scroll
            .as_ref()
            .map(HeaderRevealController::visibility)
    }

    /// Href of the anchor carrying the active-link mark, if any.
    pub fn active_link_href(&self) -> Option<String> {
        self.doc
            .elements_by_tag("a")
            .into_iter()
            .find(|&id| self.doc.attr(id, "aria-current") == Some("page"))
            .and_then(|id| self.doc.attr(id, "href"))
            .map(ToOwned::to_owned)
    }
}

/// Logs the first failure of a guarded step exactly once and hands the
/// result back for `?` propagation.
fn guard<T>(step: &'static str, result: ChromeResult<T>) -> ChromeResult<T> {
    if let Err(error) = &result {
        log::error!("chrome bootstrap aborted at {step}: {error}");
    }
    result
}

/// Loads the search index and matcher, once, and builds the overlay
/// controller. Pages without the full set of search elements skip search
/// entirely and that is not an error.
fn setup_search(
    doc: &Document,
    loader: &dyn ResourceLoader,
    rewriter: &LinkRewriter,
    matcher_provider: &dyn MatcherProvider,
    config: &ChromeConfig,
) -> ChromeResult<Option<SearchController>> {
    let Some(elements) = search_elements(doc) else {
        return Ok(None);
    };

    let index_path = rewriter.rewrite(&config.search_index);
    let body = loader
        .fetch_text(&index_path, FetchMode::NoStore)
        .map_err(|error| {
            ChromeError::new(
                "search.index.fetch_failed",
                format!("failed to load {index_path}: {error}"),
            )
        })?;
    let documents = ch_search::parse_index(&body)?;
    let matcher = matcher_provider.load(&documents, &config.matcher)?;

    let rewriter = rewriter.clone();
    Ok(Some(SearchController::new(
        elements,
        documents,
        matcher,
        Box::new(move |href| rewriter.rewrite(href)),
    )))
}

fn search_elements(doc: &Document) -> Option<SearchElements> {
    Some(SearchElements {
        input: doc.element_by_id("site-search-input")?,
        results: doc.element_by_id("site-search-results")?,
        container: doc.first_element_by_class("site-search")?,
        toggle: doc.first_element_by_class("search-toggle")?,
        panel: doc.element_by_id("site-search-panel")?,
    })
}

#[cfg(test)]
include!("tests.rs");
