//! Chrome state report.

use ch_chrome::BootstrapSummary;
use ch_chrome::ChromeRuntime;
use ch_nav::DrawerState;
use ch_scroll::HeaderVisibility;
use ch_search::PanelState;

pub(crate) fn print(runtime: &ChromeRuntime, summary: &BootstrapSummary, page: &str) {
    println!("chrome report for {page}");

    if summary.prefix.is_empty() {
        println!("  base prefix: (root)");
    } else {
        println!("  base prefix: {}", summary.prefix);
    }

    println!(
        "  partials: header {}, footer {}",
        injected(summary.injected.header),
        injected(summary.injected.footer)
    );

    match runtime.active_link_href() {
        Some(href) => println!("  active link: {href}"),
        None => println!("  active link: none"),
    }

    match runtime.nav() {
        Some(nav) => println!(
            "  nav: drawer {}, open submenus {}",
            drawer(nav.drawer()),
            nav.open_submenu_count()
        ),
        None => println!("  nav: not present"),
    }

    match runtime.header_visibility() {
        Some(visibility) => println!("  header: {}", header(visibility)),
        None => println!("  header: not present"),
    }

    match runtime.search() {
        Some(search) => {
            println!(
                "  search: {}, {} documents indexed",
                panel(search.state()),
                search.document_count()
            );
            if !search.query().is_empty() {
                match search.rendered_results() {
                    Some(count) => {
                        println!("  search query: `{}` ({count} results)", search.query());
                    }
                    None => println!("  search query: `{}` (nothing rendered)", search.query()),
                }
            }
        }
        None => println!("  search: not present"),
    }
}

fn injected(done: bool) -> &'static str {
    if done { "injected" } else { "skipped" }
}

fn drawer(state: DrawerState) -> &'static str {
    match state {
        DrawerState::Collapsed => "collapsed",
        DrawerState::Expanded => "expanded",
    }
}

fn header(visibility: HeaderVisibility) -> &'static str {
    match visibility {
        HeaderVisibility::Visible => "visible",
        HeaderVisibility::Hidden => "hidden",
    }
}

fn panel(state: PanelState) -> &'static str {
    match state {
        PanelState::Closed => "closed",
        PanelState::OpenEmpty => "open, no query",
        PanelState::OpenResults => "open, results rendered",
    }
}
