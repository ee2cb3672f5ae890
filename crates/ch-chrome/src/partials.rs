//! Shared partial injection.
//!
//! Fetches the header and footer fragments and inserts them into their slot
//! elements. The two fetches run on worker threads and are joined before
//! the bootstrap proceeds: everything after this step may query elements
//! that only exist once injection has completed.

use std::thread;

use ch_core::ChromeError;
use ch_core::ChromeResult;
use ch_dom::Document;

use crate::links::LinkRewriter;
use crate::loader::FetchMode;
use crate::loader::ResourceLoader;

/// Which slots received a fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectReport {
    pub header: bool,
    pub footer: bool,
}

/// Injects both partials. A missing slot silently skips that partial; a
/// failed fetch aborts with the first error.
pub fn inject(
    doc: &mut Document,
    loader: &dyn ResourceLoader,
    rewriter: &LinkRewriter,
    header_path: &str,
    footer_path: &str,
) -> ChromeResult<InjectReport> {
    let header_slot = doc.element_by_id("site-header");
    let footer_slot = doc.element_by_id("site-footer");

    let header_path = header_slot.map(|_| rewriter.rewrite(header_path));
    let footer_path = footer_slot.map(|_| rewriter.rewrite(footer_path));

    let (header_html, footer_html) = thread::scope(|scope| {
        let header_job = header_path
            .as_deref()
            .map(|path| scope.spawn(move || fetch_fragment(loader, path)));
        let footer_job = footer_path
            .as_deref()
            .map(|path| scope.spawn(move || fetch_fragment(loader, path)));

        (header_job.map(join_fetch), footer_job.map(join_fetch))
    });

    let mut report = InjectReport::default();

    if let (Some(slot), Some(fetched)) = (header_slot, header_html) {
        doc.set_inner_html(slot, &fetched?);
        report.header = true;
    }
    if let (Some(slot), Some(fetched)) = (footer_slot, footer_html) {
        doc.set_inner_html(slot, &fetched?);
        report.footer = true;
    }

    Ok(report)
}

fn fetch_fragment(loader: &dyn ResourceLoader, path: &str) -> ChromeResult<String> {
    loader.fetch_text(path, FetchMode::NoStore).map_err(|error| {
        ChromeError::new(
            "chrome.partials.fetch_failed",
            format!("failed to load {path}: {error}"),
        )
    })
}

fn join_fetch(handle: thread::ScopedJoinHandle<'_, ChromeResult<String>>) -> ChromeResult<String> {
    handle.join().unwrap_or_else(|_| {
        Err(ChromeError::new(
            "chrome.partials.worker_panicked",
            "partial fetch worker panicked",
        ))
    })
}
