//! Headless driver for the chrome engine.
//!
//! Loads one page of a static site from disk, bootstraps the chrome
//! against the site directory, optionally replays a scripted event
//! sequence, and prints a report of the resulting chrome state.

use std::fs;
use std::path::PathBuf;

use ch_chrome::ChromeConfig;
use ch_chrome::ChromeRuntime;
use ch_core::ChromeError;
use ch_core::ChromeResult;
use ch_core::Viewport;
use ch_search::BuiltinMatcherProvider;
use url::Url;

use self::loader::DirectoryLoader;

mod loader;
mod report;
mod script;

const USAGE: &str = "usage: chromite-shell <site-root> <page-path> \
[--base-url URL] [--viewport WIDTH] [--query TEXT] [--events FILE]";

const DEFAULT_BASE_URL: &str = "https://localhost/";
const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

#[derive(Debug)]
struct Options {
    site_root: PathBuf,
    page: String,
    base_url: String,
    viewport: u32,
    query: Option<String>,
    events: Option<PathBuf>,
}

pub(crate) fn run() -> ChromeResult<()> {
    let options = parse_args(std::env::args().skip(1))?;

    let page_file = options
        .site_root
        .join(options.page.trim_start_matches('/'));
    let source = fs::read_to_string(&page_file).map_err(|error| {
        ChromeError::new(
            "shell.page.read_failed",
            format!("failed to read {}: {error}", page_file.display()),
        )
    })?;

    let page_url = page_url(&options)?;
    let loader = DirectoryLoader::new(options.site_root.clone());

    let mut runtime = ChromeRuntime::new(
        &source,
        page_url,
        Viewport::new(options.viewport),
        ChromeConfig::default(),
    );
    let summary = runtime.bootstrap(&loader, &BuiltinMatcherProvider)?;
    log::debug!("chrome bootstrap completed for {}", options.page);

    if let Some(events) = &options.events {
        script::replay_file(&mut runtime, events)?;
    }
    if let Some(query) = &options.query {
        script::run_query(&mut runtime, query);
    }

    report::print(&runtime, &summary, &options.page);
    Ok(())
}

fn page_url(options: &Options) -> ChromeResult<Url> {
    Url::parse(&options.base_url)
        .and_then(|base| base.join(&options.page))
        .map_err(|error| {
            ChromeError::new(
                "shell.page.url_invalid",
                format!(
                    "cannot form a page URL from `{}` and `{}`: {error}",
                    options.base_url, options.page
                ),
            )
        })
}

fn parse_args(args: impl Iterator<Item = String>) -> ChromeResult<Options> {
    let mut args = args;
    let mut positional = Vec::new();
    let mut base_url = DEFAULT_BASE_URL.to_owned();
    let mut viewport = DEFAULT_VIEWPORT_WIDTH;
    let mut query = None;
    let mut events = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--base-url" => base_url = flag_value(&mut args, "--base-url")?,
            "--viewport" => {
                let raw = flag_value(&mut args, "--viewport")?;
                viewport = raw.parse().map_err(|_| {
                    ChromeError::new(
                        "shell.args.invalid",
                        format!("--viewport expects a pixel width, got `{raw}`"),
                    )
                })?;
            }
            "--query" => query = Some(flag_value(&mut args, "--query")?),
            "--events" => events = Some(PathBuf::from(flag_value(&mut args, "--events")?)),
            other if other.starts_with("--") => {
                return Err(ChromeError::new(
                    "shell.args.invalid",
                    format!("unknown flag `{other}`\n{USAGE}"),
                ));
            }
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        return Err(ChromeError::new("shell.args.invalid", USAGE));
    }

    let page = positional.pop().unwrap_or_default();
    let site_root = positional.pop().unwrap_or_default();

    Ok(Options {
        site_root: PathBuf::from(site_root),
        page,
        base_url,
        viewport,
        query,
        events,
    })
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> ChromeResult<String> {
    args.next().ok_or_else(|| {
        ChromeError::new(
            "shell.args.invalid",
            format!("missing value after {flag}\n{USAGE}"),
        )
    })
}
