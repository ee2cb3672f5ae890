//! Active-link computation.

use ch_dom::Document;
use ch_dom::NodeId;
use url::Url;

/// Canonical form of a site path: resolved against the site origin,
/// lower-cased, `index.html` suffix dropped, trailing slashes stripped.
/// Anything unresolvable canonicalizes to `/`.
pub fn normalize_path(value: &str, page_url: &Url) -> String {
    let candidate = if value.is_empty() { "/" } else { value };
    let mut pathname = page_url
        .join("/")
        .and_then(|origin| origin.join(candidate))
        .map(|resolved| resolved.path().to_owned())
        .unwrap_or_else(|_| "/".to_owned());

    pathname = pathname.to_lowercase();

    if let Some(stripped) = pathname.strip_suffix("/index.html") {
        pathname = if stripped.is_empty() {
            "/".to_owned()
        } else {
            stripped.to_owned()
        };
    }

    let trimmed = pathname.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// Recomputes the active-link mark across the nav. Exactly the anchor whose
/// normalized target equals the current page path carries
/// `aria-current="page"`; when that anchor sits in a submenu, the owning
/// toggle is flagged `data-active-parent`. Stale marks are always cleared.
pub fn mark_active_link(doc: &mut Document, nav: NodeId, page_url: &Url) {
    let current = normalize_path(page_url.path(), page_url);

    for toggle in doc.elements_by_class_in(nav, "submenu-toggle") {
        doc.remove_attr(toggle, "data-active-parent");
    }

    for link in doc.elements_by_tag_in(nav, "a") {
        let Some(href) = doc.attr(link, "href").map(ToOwned::to_owned) else {
            continue;
        };

        if normalize_path(&href, page_url) == current {
            doc.set_attr(link, "aria-current", "page");

            let in_submenu = doc.closest_with_class(link, "submenu").is_some();
            let menu_item = doc
                .closest_with_class(link, "menu-item")
                .filter(|&item| doc.has_class(item, "has-submenu"));
            if in_submenu {
                if let Some(item) = menu_item {
                    if let Some(toggle) = doc
                        .elements_by_class_in(item, "submenu-toggle")
                        .first()
                        .copied()
                    {
                        doc.set_attr(toggle, "data-active-parent", "true");
                    }
                }
            }
        } else {
            doc.remove_attr(link, "aria-current");
        }
    }
}
