//! Page event dispatch.
//!
//! The host feeds page events in arrival order; the dispatcher reproduces
//! the propagation rules the controllers were written against. Clicks on
//! the submenu and search toggles stop propagation, so document-level
//! outside-click handling in the *other* controllers must not observe them.
//! Checking who consumes the click happens before any handler mutates the
//! document.

use ch_core::Viewport;
use ch_dom::NodeId;

use crate::bootstrap::ChromeRuntime;

/// Keyboard keys the chrome reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// One page event, as observed by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// A click; `None` targets mean the click landed outside any element
    /// the chrome tracks.
    Click { target: Option<NodeId> },
    Keydown { key: Key },
    Input { target: NodeId, value: String },
    /// A scroll event. At most one frame evaluation is pending at a time;
    /// scrolls arriving while one is pending coalesce into it.
    Scroll { y: f64 },
    /// An animation frame, carrying the scroll offset at frame time.
    Frame { y: f64 },
    Resize { width: u32 },
}

impl ChromeRuntime {
    /// Feeds one event through every interested controller.
    pub fn dispatch(&mut self, event: PageEvent) {
        match event {
            PageEvent::Click { target } => self.dispatch_click(target),
            PageEvent::Keydown { key: Key::Escape } => {
                if let Some(nav) = self.nav.as_mut() {
                    nav.on_escape(&mut self.doc);
                }
                if let Some(search) = self.search.as_mut() {
                    search.on_escape(&mut self.doc);
                }
            }
            PageEvent::Keydown { .. } => {}
            PageEvent::Input { target, value } => {
                if let Some(search) = self.search.as_mut() {
                    search.on_input(&mut self.doc, target, &value);
                }
            }
            PageEvent::Scroll { y: _ } => {
                if let Some(scroll) = self.scroll.as_mut() {
                    scroll.on_scroll();
                }
            }
            PageEvent::Frame { y } => {
                if let Some(scroll) = self.scroll.as_mut() {
                    scroll.on_frame(&mut self.doc, y);
                }
            }
            PageEvent::Resize { width } => {
                self.viewport = Viewport::new(width);
                let viewport = self.viewport;
                if let Some(nav) = self.nav.as_mut() {
                    nav.on_resize(&mut self.doc, viewport);
                }
            }
        }
    }

    fn dispatch_click(&mut self, target: Option<NodeId>) {
        let nav_consumes = target.is_some_and(|target| {
            self.nav
                .as_ref()
                .is_some_and(|nav| nav.consumes_click(&self.doc, target))
        });
        let search_consumes = target.is_some_and(|target| {
            self.search
                .as_ref()
                .is_some_and(|search| search.consumes_click(&self.doc, target))
        });

        let viewport = self.viewport;
        if nav_consumes {
            if let Some(nav) = self.nav.as_mut() {
                nav.on_click(&mut self.doc, target, viewport);
            }
            return;
        }
        if search_consumes {
            if let Some(search) = self.search.as_mut() {
                search.on_click(&mut self.doc, target);
            }
            return;
        }

        if let Some(nav) = self.nav.as_mut() {
            nav.on_click(&mut self.doc, target, viewport);
        }
        if let Some(search) = self.search.as_mut() {
            search.on_click(&mut self.doc, target);
        }
    }
}
