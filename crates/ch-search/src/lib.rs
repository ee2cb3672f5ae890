//! Incremental search overlay.
//!
//! Serves query-to-results rendering over a cached index. The index and the
//! matcher are loaded once per page load during chrome setup; afterwards the
//! controller only reacts to input, toggle, outside-click, and Escape
//! events. Panel visibility and rendered results are tracked separately, as
//! on the page: closing the panel via its toggle keeps the rendered list
//! for the next open, while outside clicks and Escape clear it.

use ch_core::ChromeError;
use ch_core::ChromeResult;
use ch_dom::Document;
use ch_dom::NodeId;
use serde::Deserialize;

mod matcher;

pub use matcher::BuiltinMatcher;
pub use matcher::BuiltinMatcherProvider;
pub use matcher::Matcher;
pub use matcher::MatcherConfig;
pub use matcher::MatcherProvider;
pub use matcher::RankedMatch;

/// Ranked results rendered per query.
pub const RESULT_LIMIT: usize = 8;

const EMPTY_RESULTS_MARKUP: &str = "<div class=\"search-result-empty\">No results found.</div>";

/// One searchable page, as recorded in the prebuilt index document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

impl SearchDocument {
    /// Field access by matcher key name; unknown keys read as empty.
    pub fn field(&self, key: &str) -> &str {
        match key {
            "title" => &self.title,
            "url" => &self.url,
            "content" => &self.content,
            _ => "",
        }
    }
}

/// Parses the fetched index document.
pub fn parse_index(text: &str) -> ChromeResult<Vec<SearchDocument>> {
    serde_json::from_str(text).map_err(|error| {
        ChromeError::new(
            "search.index.parse_failed",
            format!("malformed search index: {error}"),
        )
    })
}

/// Overlay lifecycle state, derived for reporting and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    OpenEmpty,
    OpenResults,
}

/// Whether a click was consumed by the search toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Consumed,
    Propagated,
}

/// DOM elements the overlay drives. All five must be present for the
/// controller to be set up at all.
#[derive(Debug, Clone, Copy)]
pub struct SearchElements {
    pub input: NodeId,
    pub results: NodeId,
    pub container: NodeId,
    pub toggle: NodeId,
    pub panel: NodeId,
}

/// Per-load search overlay controller.
pub struct SearchController {
    elements: SearchElements,
    documents: Vec<SearchDocument>,
    matcher: Box<dyn Matcher>,
    rewrite: Box<dyn Fn(&str) -> String>,
    open: bool,
    rendered: Option<usize>,
    query: String,
    input_focused: bool,
}

impl SearchController {
    /// Builds the controller over an already-loaded index and matcher.
    /// `rewrite` is applied to every result link before rendering.
    pub fn new(
        elements: SearchElements,
        documents: Vec<SearchDocument>,
        matcher: Box<dyn Matcher>,
        rewrite: Box<dyn Fn(&str) -> String>,
    ) -> Self {
        Self {
            elements,
            documents,
            matcher,
            rewrite,
            open: false,
            rendered: None,
            query: String::new(),
            input_focused: false,
        }
    }

    pub fn state(&self) -> PanelState {
        if !self.open {
            PanelState::Closed
        } else if self.rendered.is_some() {
            PanelState::OpenResults
        } else {
            PanelState::OpenEmpty
        }
    }

    /// Result count of the last render; `Some(0)` means the empty-result
    /// placeholder is showing.
    pub fn rendered_results(&self) -> Option<usize> {
        self.rendered
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn input_focused(&self) -> bool {
        self.input_focused
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// True when this click lands on the search toggle, whose handler stops
    /// propagation before document-level listeners run.
    pub fn consumes_click(&self, doc: &Document, target: NodeId) -> bool {
        doc.contains(self.elements.toggle, target)
    }

    /// Routes a page click. The toggle consumes its clicks; any click
    /// outside the search container closes the panel and clears rendered
    /// results while keeping the cached index and query text.
    pub fn on_click(&mut self, doc: &mut Document, target: Option<NodeId>) -> ClickOutcome {
        if let Some(target) = target {
            if doc.contains(self.elements.toggle, target) {
                self.set_open(doc, !self.open);
                return ClickOutcome::Consumed;
            }
            if doc.contains(self.elements.container, target) {
                return ClickOutcome::Propagated;
            }
        }

        self.clear_results(doc);
        self.set_open(doc, false);
        ClickOutcome::Propagated
    }

    /// Escape closes the panel, clears results, and drops input focus.
    pub fn on_escape(&mut self, doc: &mut Document) {
        self.clear_results(doc);
        self.set_open(doc, false);
        self.input_focused = false;
    }

    /// Incremental input handling. Not debounced: every input event runs a
    /// fresh match pass against the cached index.
    pub fn on_input(&mut self, doc: &mut Document, target: NodeId, value: &str) {
        if target != self.elements.input {
            return;
        }

        self.query = value.to_owned();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            // An empty query clears the list but moves the panel neither
            // open nor closed.
            self.clear_results(doc);
            return;
        }

        self.set_open(doc, true);

        let hits = self.matcher.search(trimmed, RESULT_LIMIT);
        let markup = self.results_markup(&hits);
        let count = hits.len().min(RESULT_LIMIT);
        doc.set_inner_html(self.elements.results, &markup);
        doc.add_class(self.elements.results, "open");
        self.rendered = Some(count);
    }

    fn results_markup(&self, hits: &[RankedMatch]) -> String {
        if hits.is_empty() {
            return EMPTY_RESULTS_MARKUP.to_owned();
        }

        hits.iter()
            .take(RESULT_LIMIT)
            .filter_map(|hit| self.documents.get(hit.index))
            .map(|document| {
                format!(
                    "<a class=\"search-result-item\" href=\"{}\">{}</a>",
                    (self.rewrite)(&document.url),
                    document.title
                )
            })
            .collect::<Vec<_>>()
            .join("")
    }

    fn clear_results(&mut self, doc: &mut Document) {
        doc.set_inner_html(self.elements.results, "");
        doc.remove_class(self.elements.results, "open");
        self.rendered = None;
    }

    fn set_open(&mut self, doc: &mut Document, open: bool) {
        self.open = open;
        doc.set_attr(self.elements.container, "data-open", bool_attr(open));
        doc.set_attr(self.elements.toggle, "aria-expanded", bool_attr(open));
        if open {
            self.input_focused = true;
        }
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::BuiltinMatcherProvider;
    use super::ClickOutcome;
    use super::Matcher;
    use super::MatcherConfig;
    use super::MatcherProvider;
    use super::PanelState;
    use super::RankedMatch;
    use super::SearchController;
    use super::SearchDocument;
    use super::SearchElements;
    use super::parse_index;
    use ch_dom::Document;
    use ch_dom::NodeId;

    const SEARCH_PAGE: &str = r#"
        <div class="site-search">
          <button class="search-toggle" aria-expanded="false">search</button>
          <div id="site-search-panel">
            <input id="site-search-input">
            <div id="site-search-results"></div>
          </div>
        </div>
        <main><p id="outside">content</p></main>
    "#;

    fn index() -> Vec<SearchDocument> {
        vec![
            SearchDocument {
                title: "Getting Started".to_owned(),
                url: "/guides/start/".to_owned(),
                content: "install and configure".to_owned(),
            },
            SearchDocument {
                title: "Deployment".to_owned(),
                url: "/guides/deploy/".to_owned(),
                content: "ship the site".to_owned(),
            },
        ]
    }

    fn elements(doc: &Document) -> SearchElements {
        let find_id = |value: &str| match doc.element_by_id(value) {
            Some(id) => id,
            None => panic!("missing #{value}"),
        };
        let find_class = |value: &str| match doc.first_element_by_class(value) {
            Some(id) => id,
            None => panic!("missing .{value}"),
        };
        SearchElements {
            input: find_id("site-search-input"),
            results: find_id("site-search-results"),
            container: find_class("site-search"),
            toggle: find_class("search-toggle"),
            panel: find_id("site-search-panel"),
        }
    }

    fn controller(doc: &Document, documents: Vec<SearchDocument>) -> SearchController {
        let matcher = match BuiltinMatcherProvider.load(&documents, &MatcherConfig::default()) {
            Ok(matcher) => matcher,
            Err(error) => panic!("builtin matcher should load: {error}"),
        };
        SearchController::new(
            elements(doc),
            documents,
            matcher,
            Box::new(|href| format!("/site{href}")),
        )
    }

    fn input_node(doc: &Document) -> NodeId {
        match doc.element_by_id("site-search-input") {
            Some(id) => id,
            None => panic!("input should parse"),
        }
    }

    #[test]
    fn parse_index_accepts_documents_and_rejects_garbage() {
        let parsed = parse_index(r#"[{"title":"A","url":"/a/","content":"x","extra":1}]"#);
        assert!(parsed.as_deref().is_ok_and(|docs| docs.len() == 1));

        let failed = parse_index("{not json");
        assert!(failed.is_err_and(|error| error.code == "search.index.parse_failed"));
    }

    #[test]
    fn empty_query_never_opens_a_closed_panel() {
        let mut doc = Document::parse(SEARCH_PAGE);
        let mut search = controller(&doc, index());

        let input = input_node(&doc);
        search.on_input(&mut doc, input, "   ");
        assert_eq!(search.state(), PanelState::Closed);
    }

    #[test]
    fn empty_query_clears_results_without_closing_an_open_panel() {
        let mut doc = Document::parse(SEARCH_PAGE);
        let mut search = controller(&doc, index());

        let input = input_node(&doc);
        search.on_input(&mut doc, input, "deploy");
        assert_eq!(search.state(), PanelState::OpenResults);

        search.on_input(&mut doc, input, "");
        assert_eq!(search.state(), PanelState::OpenEmpty);
        assert_eq!(search.rendered_results(), None);
    }

    #[test]
    fn zero_matches_render_the_placeholder_and_open_the_panel() {
        let mut doc = Document::parse(SEARCH_PAGE);
        let mut search = controller(&doc, index());

        let input = input_node(&doc);
        search.on_input(&mut doc, input, "qqqzzz");
        assert_eq!(search.state(), PanelState::OpenResults);
        assert_eq!(search.rendered_results(), Some(0));

        let results = match doc.element_by_id("site-search-results") {
            Some(id) => id,
            None => panic!("results box should parse"),
        };
        assert!(doc.text_content(results).contains("No results found."));
        assert!(doc.first_element_by_class("search-result-empty").is_some());
    }

    #[test]
    fn results_render_as_rewritten_links() {
        let mut doc = Document::parse(SEARCH_PAGE);
        let mut search = controller(&doc, index());

        let input = input_node(&doc);
        search.on_input(&mut doc, input, "deploy");
        let link = match doc.first_element_by_class("search-result-item") {
            Some(id) => id,
            None => panic!("result link should render"),
        };
        assert_eq!(doc.attr(link, "href"), Some("/site/guides/deploy/"));
        assert_eq!(doc.text_content(link), "Deployment");
    }

    struct FloodMatcher;

    impl Matcher for FloodMatcher {
        fn search(&self, _query: &str, _limit: usize) -> Vec<RankedMatch> {
            (0..50).map(|index| RankedMatch { index, score: 0.0 }).collect()
        }
    }

    #[test]
    fn rendered_results_are_capped_regardless_of_match_count() {
        let mut doc = Document::parse(SEARCH_PAGE);
        let documents: Vec<_> = (0..50)
            .map(|n| SearchDocument {
                title: format!("Page {n}"),
                url: format!("/p{n}/"),
                content: String::new(),
            })
            .collect();
        let mut search = SearchController::new(
            elements(&doc),
            documents,
            Box::new(FloodMatcher),
            Box::new(|href| href.to_owned()),
        );

        let input = input_node(&doc);
        search.on_input(&mut doc, input, "page");
        assert_eq!(search.rendered_results(), Some(8));
        assert_eq!(doc.elements_by_tag("a").len(), 8);
    }

    #[test]
    fn toggle_click_is_consumed_and_moves_focus_on_open() {
        let mut doc = Document::parse(SEARCH_PAGE);
        let mut search = controller(&doc, index());
        let toggle = match doc.first_element_by_class("search-toggle") {
            Some(id) => id,
            None => panic!("toggle should parse"),
        };

        let outcome = search.on_click(&mut doc, Some(toggle));
        assert_eq!(outcome, ClickOutcome::Consumed);
        assert_eq!(search.state(), PanelState::OpenEmpty);
        assert!(search.input_focused());
        assert_eq!(doc.attr(toggle, "aria-expanded"), Some("true"));

        let outcome = search.on_click(&mut doc, Some(toggle));
        assert_eq!(outcome, ClickOutcome::Consumed);
        assert_eq!(search.state(), PanelState::Closed);
    }

    #[test]
    fn outside_click_closes_and_clears_but_keeps_the_query() {
        let mut doc = Document::parse(SEARCH_PAGE);
        let mut search = controller(&doc, index());

        let input = input_node(&doc);
        search.on_input(&mut doc, input, "deploy");
        let outside = match doc.element_by_id("outside") {
            Some(id) => id,
            None => panic!("outside node should parse"),
        };
        let outcome = search.on_click(&mut doc, Some(outside));
        assert_eq!(outcome, ClickOutcome::Propagated);
        assert_eq!(search.state(), PanelState::Closed);
        assert_eq!(search.rendered_results(), None);
        assert_eq!(search.query(), "deploy");
        assert!(doc.first_element_by_class("search-result-item").is_none());
    }

    #[test]
    fn click_inside_the_container_changes_nothing() {
        let mut doc = Document::parse(SEARCH_PAGE);
        let mut search = controller(&doc, index());

        let input = input_node(&doc);
        search.on_input(&mut doc, input, "deploy");
        search.on_click(&mut doc, Some(input));
        assert_eq!(search.state(), PanelState::OpenResults);
    }

    #[test]
    fn escape_closes_clears_and_blurs() {
        let mut doc = Document::parse(SEARCH_PAGE);
        let mut search = controller(&doc, index());

        let input = input_node(&doc);
        search.on_input(&mut doc, input, "deploy");
        assert!(search.input_focused());

        search.on_escape(&mut doc);
        assert_eq!(search.state(), PanelState::Closed);
        assert_eq!(search.rendered_results(), None);
        assert!(!search.input_focused());
    }

    #[test]
    fn input_events_for_other_elements_are_ignored() {
        let mut doc = Document::parse(SEARCH_PAGE);
        let mut search = controller(&doc, index());
        let outside = match doc.element_by_id("outside") {
            Some(id) => id,
            None => panic!("outside node should parse"),
        };

        search.on_input(&mut doc, outside, "deploy");
        assert_eq!(search.state(), PanelState::Closed);
    }
}
