//! Scripted event replay.
//!
//! Events are newline-delimited, one per line:
//!
//! ```text
//! click <element-id>|outside
//! key escape
//! input <element-id> <text>
//! scroll <y>
//! frame <y>
//! resize <width>
//! ```
//!
//! Blank lines and `#` comments are skipped.

use std::fs;
use std::path::Path;

use ch_chrome::ChromeRuntime;
use ch_chrome::Key;
use ch_chrome::PageEvent;
use ch_core::ChromeError;
use ch_core::ChromeResult;

pub(crate) fn replay_file(runtime: &mut ChromeRuntime, path: &Path) -> ChromeResult<()> {
    let text = fs::read_to_string(path).map_err(|error| {
        ChromeError::new(
            "shell.events.read_failed",
            format!("failed to read {}: {error}", path.display()),
        )
    })?;

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event = parse_event(runtime, line).ok_or_else(|| {
            ChromeError::new(
                "shell.events.parse_failed",
                format!("line {}: unrecognized event `{line}`", number + 1),
            )
        })?;
        runtime.dispatch(event);
    }

    Ok(())
}

/// Feeds a one-off search query, as if typed into the search input.
pub(crate) fn run_query(runtime: &mut ChromeRuntime, query: &str) {
    let Some(input) = runtime.doc().element_by_id("site-search-input") else {
        return;
    };
    runtime.dispatch(PageEvent::Input {
        target: input,
        value: query.to_owned(),
    });
}

fn parse_event(runtime: &ChromeRuntime, line: &str) -> Option<PageEvent> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "click" => {
            let target = parts.next()?;
            if target == "outside" {
                Some(PageEvent::Click { target: None })
            } else {
                let node = runtime.doc().element_by_id(target)?;
                Some(PageEvent::Click {
                    target: Some(node),
                })
            }
        }
        "key" => {
            let key = match parts.next()? {
                "escape" => Key::Escape,
                _ => Key::Other,
            };
            Some(PageEvent::Keydown { key })
        }
        "input" => {
            let id = parts.next()?;
            let target = runtime.doc().element_by_id(id)?;
            let value = parts.collect::<Vec<_>>().join(" ");
            Some(PageEvent::Input { target, value })
        }
        "scroll" => {
            let y = parts.next()?.parse().ok()?;
            Some(PageEvent::Scroll { y })
        }
        "frame" => {
            let y = parts.next()?.parse().ok()?;
            Some(PageEvent::Frame { y })
        }
        "resize" => {
            let width = parts.next()?.parse().ok()?;
            Some(PageEvent::Resize { width })
        }
        _ => None,
    }
}
