//! Navigation state machine.
//!
//! Owns the submenu open/close states, the mobile drawer, and the
//! active-link marking for the injected navigation. The DOM attributes
//! (`data-open`, `aria-expanded`, `aria-current`, `data-active-parent`) are
//! presentation mirrors of the controller state and are rewritten on every
//! transition.

use ch_core::Viewport;
use ch_dom::Document;
use ch_dom::NodeId;

mod active;

pub use active::mark_active_link;
pub use active::normalize_path;

/// Open state of one submenu-bearing menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Closed,
    Open,
}

/// Collapsed state of the mobile nav container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerState {
    Collapsed,
    Expanded,
}

/// Whether a click was consumed by a control that stops propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Consumed,
    Propagated,
}

#[derive(Debug)]
struct SubmenuItem {
    container: NodeId,
    toggle: Option<NodeId>,
    state: MenuState,
}

/// Per-load navigation controller.
#[derive(Debug)]
pub struct NavController {
    nav: NodeId,
    drawer_toggle: Option<NodeId>,
    items: Vec<SubmenuItem>,
    drawer: DrawerState,
    breakpoint: u32,
}

impl NavController {
    /// Discovers the submenu structure under `nav`. The drawer toggle lives
    /// outside the container, so it is looked up document-wide.
    pub fn new(doc: &Document, nav: NodeId, breakpoint: u32) -> Self {
        let items = doc
            .elements_by_class_in(nav, "menu-item")
            .into_iter()
            .filter(|&id| doc.has_class(id, "has-submenu"))
            .map(|container| SubmenuItem {
                container,
                toggle: doc
                    .elements_by_class_in(container, "submenu-toggle")
                    .first()
                    .copied(),
                state: MenuState::Closed,
            })
            .collect();

        Self {
            nav,
            drawer_toggle: doc.first_element_by_class("nav-toggle"),
            items,
            drawer: DrawerState::Collapsed,
            breakpoint,
        }
    }

    pub fn drawer(&self) -> DrawerState {
        self.drawer
    }

    pub fn open_submenu_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.state == MenuState::Open)
            .count()
    }

    /// True when this click would be swallowed by a submenu toggle, whose
    /// handler stops propagation before document-level listeners run.
    pub fn consumes_click(&self, doc: &Document, target: NodeId) -> bool {
        self.item_for_toggle(doc, target).is_some()
    }

    /// Routes a page click through the nav's listeners in bubbling order:
    /// submenu toggles consume the event outright, everything else falls
    /// through to the container and document-level rules.
    pub fn on_click(
        &mut self,
        doc: &mut Document,
        target: Option<NodeId>,
        viewport: Viewport,
    ) -> ClickOutcome {
        if let Some(target) = target {
            if let Some(index) = self.item_for_toggle(doc, target) {
                self.flip_item(doc, index, viewport);
                return ClickOutcome::Consumed;
            }

            if self.is_drawer_toggle(doc, target) {
                self.flip_drawer(doc);
                // The drawer toggle sits outside the container, so the
                // submenu outside-click rule still fires for this event.
                self.close_all_submenus(doc);
                return ClickOutcome::Propagated;
            }

            if doc.contains(self.nav, target) {
                let on_anchor = doc
                    .closest(target, |doc, id| doc.tag(id) == Some("a"))
                    .is_some();
                if on_anchor && viewport.is_narrow(self.breakpoint) {
                    self.collapse_drawer(doc);
                }
                return ClickOutcome::Propagated;
            }
        }

        self.close_all_submenus(doc);
        if viewport.is_narrow(self.breakpoint) && self.drawer == DrawerState::Expanded {
            self.collapse_drawer(doc);
        }
        ClickOutcome::Propagated
    }

    /// Escape closes every submenu regardless of focus location.
    pub fn on_escape(&mut self, doc: &mut Document) {
        self.close_all_submenus(doc);
    }

    /// Crossing back above the breakpoint force-collapses the drawer.
    pub fn on_resize(&mut self, doc: &mut Document, viewport: Viewport) {
        if !viewport.is_narrow(self.breakpoint) {
            self.collapse_drawer(doc);
        }
    }

    fn item_for_toggle(&self, doc: &Document, target: NodeId) -> Option<usize> {
        let toggle = doc.closest_with_class(target, "submenu-toggle")?;
        self.items
            .iter()
            .position(|item| item.toggle == Some(toggle))
    }

    fn is_drawer_toggle(&self, doc: &Document, target: NodeId) -> bool {
        self.drawer_toggle
            .is_some_and(|toggle| doc.contains(toggle, target))
    }

    fn flip_item(&mut self, doc: &mut Document, index: usize, viewport: Viewport) {
        let next = match self.items.get(index).map(|item| item.state) {
            Some(MenuState::Open) => MenuState::Closed,
            Some(MenuState::Closed) => MenuState::Open,
            None => return,
        };

        // Narrow viewports keep at most one submenu open.
        if viewport.is_narrow(self.breakpoint) {
            self.close_all_submenus(doc);
        }
        self.set_item(doc, index, next);
    }

    fn set_item(&mut self, doc: &mut Document, index: usize, state: MenuState) {
        let Some(item) = self.items.get_mut(index) else {
            return;
        };
        item.state = state;

        let open = state == MenuState::Open;
        doc.set_attr(item.container, "data-open", bool_attr(open));
        if let Some(toggle) = item.toggle {
            doc.set_attr(toggle, "aria-expanded", bool_attr(open));
        }
    }

    fn close_all_submenus(&mut self, doc: &mut Document) {
        for index in 0..self.items.len() {
            self.set_item(doc, index, MenuState::Closed);
        }
    }

    fn flip_drawer(&mut self, doc: &mut Document) {
        match self.drawer {
            DrawerState::Expanded => self.collapse_drawer(doc),
            DrawerState::Collapsed => {
                self.drawer = DrawerState::Expanded;
                doc.set_attr(self.nav, "data-open", "true");
                if let Some(toggle) = self.drawer_toggle {
                    doc.set_attr(toggle, "aria-expanded", "true");
                }
            }
        }
    }

    /// Collapsing also force-closes the submenus and resets their toggles.
    fn collapse_drawer(&mut self, doc: &mut Document) {
        self.drawer = DrawerState::Collapsed;
        doc.set_attr(self.nav, "data-open", "false");
        if let Some(toggle) = self.drawer_toggle {
            doc.set_attr(toggle, "aria-expanded", "false");
        }
        self.close_all_submenus(doc);
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::ClickOutcome;
    use super::DrawerState;
    use super::NavController;
    use ch_core::MOBILE_BREAKPOINT;
    use ch_core::Viewport;
    use ch_dom::Document;
    use ch_dom::NodeId;

    const NAV_PAGE: &str = r#"
        <button class="nav-toggle" aria-expanded="false">menu</button>
        <nav id="site-nav">
          <ul>
            <li id="item-a" class="menu-item has-submenu" data-open="false">
              <a href="/a/">A</a>
              <button id="toggle-a" class="submenu-toggle" aria-expanded="false"><span id="toggle-a-glyph">v</span></button>
              <ul class="submenu"><li><a id="link-a1" href="/a/one/">A1</a></li></ul>
            </li>
            <li id="item-b" class="menu-item has-submenu" data-open="false">
              <a href="/b/">B</a>
              <button id="toggle-b" class="submenu-toggle" aria-expanded="false">v</button>
              <ul class="submenu"><li><a href="/b/one/">B1</a></li></ul>
            </li>
          </ul>
        </nav>
        <main id="content"><p id="outside">body</p></main>
    "#;

    fn narrow() -> Viewport {
        Viewport::new(420)
    }

    fn wide() -> Viewport {
        Viewport::new(1280)
    }

    fn setup() -> (Document, NavController) {
        let doc = Document::parse(NAV_PAGE);
        let nav = match doc.element_by_id("site-nav") {
            Some(id) => id,
            None => panic!("nav should parse"),
        };
        let controller = NavController::new(&doc, nav, MOBILE_BREAKPOINT);
        (doc, controller)
    }

    fn by_id(doc: &Document, id: &str) -> NodeId {
        match doc.element_by_id(id) {
            Some(node) => node,
            None => panic!("missing #{id}"),
        }
    }

    #[test]
    fn submenu_toggle_click_is_consumed_and_flips_state() {
        let (mut doc, mut nav) = setup();
        let toggle = by_id(&doc, "toggle-a");

        let outcome = nav.on_click(&mut doc, Some(toggle), narrow());
        assert_eq!(outcome, ClickOutcome::Consumed);
        assert_eq!(nav.open_submenu_count(), 1);
        assert_eq!(doc.attr(by_id(&doc, "item-a"), "data-open"), Some("true"));
        assert_eq!(doc.attr(toggle, "aria-expanded"), Some("true"));

        nav.on_click(&mut doc, Some(toggle), narrow());
        assert_eq!(nav.open_submenu_count(), 0);
        assert_eq!(doc.attr(by_id(&doc, "item-a"), "data-open"), Some("false"));
    }

    #[test]
    fn toggle_click_targets_resolve_through_descendants() {
        let (mut doc, mut nav) = setup();
        let glyph = by_id(&doc, "toggle-a-glyph");
        let outcome = nav.on_click(&mut doc, Some(glyph), narrow());
        assert_eq!(outcome, ClickOutcome::Consumed);
        assert_eq!(nav.open_submenu_count(), 1);
    }

    #[test]
    fn narrow_viewport_keeps_one_submenu_open() {
        let (mut doc, mut nav) = setup();
        let toggle_a = by_id(&doc, "toggle-a");
        nav.on_click(&mut doc, Some(toggle_a), narrow());
        let toggle_b = by_id(&doc, "toggle-b");
        nav.on_click(&mut doc, Some(toggle_b), narrow());

        assert_eq!(nav.open_submenu_count(), 1);
        assert_eq!(doc.attr(by_id(&doc, "item-a"), "data-open"), Some("false"));
        assert_eq!(doc.attr(by_id(&doc, "item-b"), "data-open"), Some("true"));
        assert_eq!(
            doc.attr(by_id(&doc, "toggle-a"), "aria-expanded"),
            Some("false")
        );
    }

    #[test]
    fn wide_viewport_allows_multiple_open_submenus() {
        let (mut doc, mut nav) = setup();
        let toggle_a = by_id(&doc, "toggle-a");
        nav.on_click(&mut doc, Some(toggle_a), wide());
        let toggle_b = by_id(&doc, "toggle-b");
        nav.on_click(&mut doc, Some(toggle_b), wide());
        assert_eq!(nav.open_submenu_count(), 2);
    }

    #[test]
    fn outside_click_closes_all_submenus() {
        let (mut doc, mut nav) = setup();
        let toggle_a = by_id(&doc, "toggle-a");
        nav.on_click(&mut doc, Some(toggle_a), wide());
        assert_eq!(nav.open_submenu_count(), 1);

        let outside = by_id(&doc, "outside");
        let outcome = nav.on_click(&mut doc, Some(outside), wide());
        assert_eq!(outcome, ClickOutcome::Propagated);
        assert_eq!(nav.open_submenu_count(), 0);
    }

    #[test]
    fn click_inside_nav_leaves_submenus_alone() {
        let (mut doc, mut nav) = setup();
        let toggle_a = by_id(&doc, "toggle-a");
        nav.on_click(&mut doc, Some(toggle_a), wide());

        // A non-anchor click inside the container is not an outside click.
        let item = by_id(&doc, "item-b");
        nav.on_click(&mut doc, Some(item), wide());
        assert_eq!(nav.open_submenu_count(), 1);
    }

    #[test]
    fn escape_closes_submenus_but_not_the_drawer() {
        let (mut doc, mut nav) = setup();
        let toggle = match doc.first_element_by_class("nav-toggle") {
            Some(id) => id,
            None => panic!("drawer toggle should parse"),
        };
        nav.on_click(&mut doc, Some(toggle), narrow());
        let toggle_a = by_id(&doc, "toggle-a");
        nav.on_click(&mut doc, Some(toggle_a), narrow());

        nav.on_escape(&mut doc);
        assert_eq!(nav.open_submenu_count(), 0);
        assert_eq!(nav.drawer(), DrawerState::Expanded);
    }

    #[test]
    fn drawer_toggle_expands_and_collapses() {
        let (mut doc, mut nav) = setup();
        let toggle = match doc.first_element_by_class("nav-toggle") {
            Some(id) => id,
            None => panic!("drawer toggle should parse"),
        };
        let nav_el = by_id(&doc, "site-nav");

        nav.on_click(&mut doc, Some(toggle), narrow());
        assert_eq!(nav.drawer(), DrawerState::Expanded);
        assert_eq!(doc.attr(nav_el, "data-open"), Some("true"));
        assert_eq!(doc.attr(toggle, "aria-expanded"), Some("true"));

        nav.on_click(&mut doc, Some(toggle), narrow());
        assert_eq!(nav.drawer(), DrawerState::Collapsed);
        assert_eq!(doc.attr(nav_el, "data-open"), Some("false"));
    }

    #[test]
    fn collapsing_the_drawer_resets_open_submenus() {
        let (mut doc, mut nav) = setup();
        let toggle = match doc.first_element_by_class("nav-toggle") {
            Some(id) => id,
            None => panic!("drawer toggle should parse"),
        };

        nav.on_click(&mut doc, Some(toggle), narrow());
        let toggle_a = by_id(&doc, "toggle-a");
        nav.on_click(&mut doc, Some(toggle_a), narrow());
        assert_eq!(nav.open_submenu_count(), 1);

        nav.on_click(&mut doc, Some(toggle), narrow());
        assert_eq!(nav.open_submenu_count(), 0);
        assert_eq!(
            doc.attr(by_id(&doc, "toggle-a"), "aria-expanded"),
            Some("false")
        );
    }

    #[test]
    fn anchor_click_on_narrow_viewport_collapses_the_drawer() {
        let (mut doc, mut nav) = setup();
        let toggle = match doc.first_element_by_class("nav-toggle") {
            Some(id) => id,
            None => panic!("drawer toggle should parse"),
        };
        nav.on_click(&mut doc, Some(toggle), narrow());
        assert_eq!(nav.drawer(), DrawerState::Expanded);

        let link_a1 = by_id(&doc, "link-a1");
        nav.on_click(&mut doc, Some(link_a1), narrow());
        assert_eq!(nav.drawer(), DrawerState::Collapsed);
    }

    #[test]
    fn anchor_click_on_wide_viewport_keeps_the_drawer() {
        let (mut doc, mut nav) = setup();
        let toggle = match doc.first_element_by_class("nav-toggle") {
            Some(id) => id,
            None => panic!("drawer toggle should parse"),
        };
        nav.on_click(&mut doc, Some(toggle), narrow());
        let link_a1 = by_id(&doc, "link-a1");
        nav.on_click(&mut doc, Some(link_a1), wide());
        assert_eq!(nav.drawer(), DrawerState::Expanded);
    }

    #[test]
    fn outside_click_on_narrow_viewport_collapses_expanded_drawer() {
        let (mut doc, mut nav) = setup();
        let toggle = match doc.first_element_by_class("nav-toggle") {
            Some(id) => id,
            None => panic!("drawer toggle should parse"),
        };
        nav.on_click(&mut doc, Some(toggle), narrow());

        let outside = by_id(&doc, "outside");
        nav.on_click(&mut doc, Some(outside), narrow());
        assert_eq!(nav.drawer(), DrawerState::Collapsed);
    }

    #[test]
    fn resize_above_breakpoint_force_collapses() {
        let (mut doc, mut nav) = setup();
        let toggle = match doc.first_element_by_class("nav-toggle") {
            Some(id) => id,
            None => panic!("drawer toggle should parse"),
        };
        nav.on_click(&mut doc, Some(toggle), narrow());
        assert_eq!(nav.drawer(), DrawerState::Expanded);

        nav.on_resize(&mut doc, wide());
        assert_eq!(nav.drawer(), DrawerState::Collapsed);

        nav.on_click(&mut doc, Some(toggle), narrow());
        nav.on_resize(&mut doc, narrow());
        assert_eq!(nav.drawer(), DrawerState::Expanded);
    }
}
