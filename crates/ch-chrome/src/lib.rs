//! Chrome engine for static multi-page sites.
//!
//! Assembles the shared header/footer shell into a parsed page, keeps
//! navigation state consistent with the page URL, drives the scroll-reveal
//! header and the search overlay, and sequences the whole setup behind an
//! abort-on-first-failure bootstrap. Hosts construct a [`ChromeRuntime`]
//! per page load, bootstrap it against a [`ResourceLoader`], and then feed
//! it [`PageEvent`]s.

mod basepath;
mod bootstrap;
mod events;
mod links;
mod loader;
mod page;
mod partials;

pub use basepath::BasePrefix;
pub use basepath::SCRIPT_MARKER;
pub use bootstrap::BootstrapSummary;
pub use bootstrap::ChromeConfig;
pub use bootstrap::ChromeRuntime;
pub use events::Key;
pub use events::PageEvent;
pub use links::LinkRewriter;
pub use loader::FetchMode;
pub use loader::FixtureLoader;
pub use loader::ResourceLoader;
pub use partials::InjectReport;
