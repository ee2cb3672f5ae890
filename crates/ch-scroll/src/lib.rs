//! Scroll-reveal header controller.
//!
//! Hides the site header while the reader scrolls down past a threshold and
//! reveals it promptly on upward movement or near the top of the page. The
//! hysteresis accumulators keep small jitters and single direction flips
//! from flickering the header.

use ch_dom::Document;
use ch_dom::NodeId;

const VISIBLE_CLASS: &str = "header-visible";
const HIDDEN_CLASS: &str = "header-hidden";

/// Scroll offsets at or below the top lock always show the header.
const TOP_LOCK: f64 = 8.0;

/// Hysteresis thresholds, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealParams {
    /// Minimum per-event scroll change that counts as movement.
    pub min_delta: f64,
    /// Offset from the top before hiding is permitted at all.
    pub hide_after: f64,
    /// Accumulated same-direction movement required to flip state.
    pub reveal_after: f64,
    /// Zone near the top in which the header is forced visible.
    pub near_top: f64,
}

impl Default for RevealParams {
    fn default() -> Self {
        Self {
            min_delta: 2.0,
            hide_after: 120.0,
            reveal_after: 10.0,
            near_top: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderVisibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollDirection {
    Up,
    Down,
}

/// Per-load scroll state. Mutated only through [`HeaderRevealController`].
#[derive(Debug, Clone, Copy)]
struct RevealState {
    last_y: f64,
    last_direction: ScrollDirection,
    up_accumulated: f64,
    down_accumulated: f64,
    frame_scheduled: bool,
}

/// Drives the `header-visible`/`header-hidden` classes on the site header.
#[derive(Debug)]
pub struct HeaderRevealController {
    header: NodeId,
    params: RevealParams,
    state: RevealState,
    visibility: HeaderVisibility,
}

impl HeaderRevealController {
    /// Sets up the controller against an existing header element. The header
    /// starts visible at the given scroll offset, matching first paint.
    pub fn new(doc: &mut Document, header: NodeId, params: RevealParams, initial_y: f64) -> Self {
        let controller = Self {
            header,
            params,
            state: RevealState {
                last_y: initial_y,
                last_direction: ScrollDirection::Down,
                up_accumulated: 0.0,
                down_accumulated: 0.0,
                frame_scheduled: false,
            },
            visibility: HeaderVisibility::Visible,
        };
        controller.apply(doc);
        controller
    }

    pub fn visibility(&self) -> HeaderVisibility {
        self.visibility
    }

    /// Called on every scroll event. Returns `true` when a frame evaluation
    /// should be scheduled; events arriving while one is pending coalesce.
    pub fn on_scroll(&mut self) -> bool {
        if self.state.frame_scheduled {
            return false;
        }
        self.state.frame_scheduled = true;
        true
    }

    /// Runs the pending frame evaluation at the current scroll offset. A
    /// frame with nothing scheduled is a no-op.
    pub fn on_frame(&mut self, doc: &mut Document, current_y: f64) {
        if !self.state.frame_scheduled {
            return;
        }
        self.state.frame_scheduled = false;
        self.evaluate(current_y);
        self.apply(doc);
    }

    fn evaluate(&mut self, current_y: f64) {
        let state = &mut self.state;

        if current_y <= TOP_LOCK {
            self.visibility = HeaderVisibility::Visible;
            state.up_accumulated = 0.0;
            state.down_accumulated = 0.0;
            state.last_y = current_y;
            return;
        }

        let delta = current_y - state.last_y;
        if delta.abs() < self.params.min_delta {
            // Deliberately leaves last_y untouched: sub-threshold jitters
            // keep accumulating against the last meaningful position.
            return;
        }

        let direction = if delta > 0.0 {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        };
        if direction != state.last_direction {
            state.up_accumulated = 0.0;
            state.down_accumulated = 0.0;
            state.last_direction = direction;
        }

        match direction {
            ScrollDirection::Down => {
                state.down_accumulated += delta;
                if current_y > self.params.hide_after
                    && state.down_accumulated > self.params.reveal_after
                {
                    self.visibility = HeaderVisibility::Hidden;
                }
            }
            ScrollDirection::Up => {
                state.up_accumulated += delta.abs();
                if state.up_accumulated > self.params.reveal_after
                    || current_y < self.params.near_top
                {
                    self.visibility = HeaderVisibility::Visible;
                }
            }
        }

        state.last_y = current_y;
    }

    fn apply(&self, doc: &mut Document) {
        match self.visibility {
            HeaderVisibility::Visible => {
                doc.remove_class(self.header, HIDDEN_CLASS);
                doc.add_class(self.header, VISIBLE_CLASS);
            }
            HeaderVisibility::Hidden => {
                doc.remove_class(self.header, VISIBLE_CLASS);
                doc.add_class(self.header, HIDDEN_CLASS);
            }
        }
    }
}
