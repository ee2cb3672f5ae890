//! Post-injection page fixups.
//!
//! Small one-shot passes that run right after the partials land: dropping
//! legacy footer markup that pages still carry inline, propagating the lead
//! heading's color to the header theme variable, and stamping the footer
//! year.

use ch_dom::Document;
use ch_dom::NodeId;

const TITLE_COLOR_PROPERTY: &str = "--site-title-color";

/// Removes pre-partial footer markup: social blocks and footers that are
/// not part of (or inside) the injected `#site-footer` slot.
pub fn cleanup_legacy_footer(doc: &mut Document) {
    let mut doomed = Vec::new();

    for section in doc.elements_by_class_in(doc.root(), "social-section") {
        if closest_footer_slot(doc, section).is_none() {
            doomed.push(section);
        }
    }

    for footer in doc.elements_by_tag("footer") {
        if doc.has_class(footer, "site-footer") || closest_footer_slot(doc, footer).is_some() {
            continue;
        }
        doomed.push(footer);
    }

    for id in doomed {
        doc.remove(id);
    }
}

fn closest_footer_slot(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.closest(id, |doc, candidate| {
        doc.attr(candidate, "id") == Some("site-footer")
    })
}

/// Samples the first heading's inline color and exposes it as the header
/// theme variable on the root element. Transparent colors are left alone.
pub fn apply_title_color(doc: &mut Document) {
    let heading = doc.descendant_elements(doc.root()).into_iter().find(|&id| {
        doc.tag(id)
            .is_some_and(|tag| matches!(tag, "h1" | "h2" | "h3"))
    });
    let Some(heading) = heading else {
        return;
    };

    let Some(color) = doc
        .attr(heading, "style")
        .and_then(|style| declaration_value(style, "color"))
    else {
        return;
    };

    let transparent = ["transparent", "rgba(0, 0, 0, 0)", "rgba(0,0,0,0)"];
    if transparent.contains(&color.trim().to_lowercase().as_str()) {
        return;
    }

    let target = doc
        .elements_by_tag("html")
        .first()
        .copied()
        .unwrap_or_else(|| doc.root());
    set_style_property(doc, target, TITLE_COLOR_PROPERTY, &color);
}

/// Stamps the current year into the `#year` placeholder, if present.
pub fn stamp_footer_year(doc: &mut Document, year: i16) {
    if let Some(slot) = doc.element_by_id("year") {
        doc.set_text(slot, &year.to_string());
    }
}

/// Last value of a declaration inside an inline style string.
fn declaration_value(style: &str, property: &str) -> Option<String> {
    let mut found = None;
    for declaration in style.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case(property) {
            let value = value.trim();
            if !value.is_empty() {
                found = Some(value.to_owned());
            }
        }
    }
    found
}

/// Sets or replaces one declaration in an element's inline style.
fn set_style_property(doc: &mut Document, id: NodeId, property: &str, value: &str) {
    let existing = doc.attr(id, "style").unwrap_or_default();
    let mut declarations: Vec<String> = existing
        .split(';')
        .filter_map(|declaration| {
            let trimmed = declaration.trim();
            if trimmed.is_empty() {
                return None;
            }
            let keep = trimmed
                .split_once(':')
                .is_none_or(|(name, _)| !name.trim().eq_ignore_ascii_case(property));
            keep.then(|| trimmed.to_owned())
        })
        .collect();
    declarations.push(format!("{property}: {value}"));
    doc.set_attr(id, "style", &declarations.join("; "));
}

#[cfg(test)]
mod tests {
    use super::apply_title_color;
    use super::cleanup_legacy_footer;
    use super::stamp_footer_year;
    use ch_dom::Document;

    #[test]
    fn cleanup_drops_legacy_footers_and_social_blocks() {
        let mut doc = Document::parse(
            r#"<div class="social-section" id="legacy-social"></div>
               <footer id="legacy-footer">old</footer>
               <div id="site-footer">
                 <footer class="site-footer">
                   <div class="social-section" id="kept-social"></div>
                 </footer>
               </div>"#,
        );

        cleanup_legacy_footer(&mut doc);

        assert!(doc.element_by_id("legacy-social").is_none());
        assert!(doc.element_by_id("legacy-footer").is_none());
        assert!(doc.element_by_id("kept-social").is_some());
        assert!(doc.first_element_by_class("site-footer").is_some());
    }

    #[test]
    fn standalone_site_footer_survives_cleanup() {
        let mut doc = Document::parse(r#"<footer class="site-footer">keep</footer>"#);
        cleanup_legacy_footer(&mut doc);
        assert!(doc.first_element_by_class("site-footer").is_some());
    }

    #[test]
    fn title_color_lands_on_the_html_element() {
        let mut doc = Document::parse(
            r#"<html><body>
                 <h2 style="margin: 0; color: rgb(20, 40, 60)">Title</h2>
               </body></html>"#,
        );
        apply_title_color(&mut doc);

        let html = match doc.elements_by_tag("html").first().copied() {
            Some(id) => id,
            None => panic!("html element should parse"),
        };
        let style = doc.attr(html, "style").unwrap_or_default();
        assert!(style.contains("--site-title-color: rgb(20, 40, 60)"));
    }

    #[test]
    fn transparent_title_color_is_ignored() {
        let mut doc = Document::parse(
            r#"<html><h1 style="color: rgba(0, 0, 0, 0)">Ghost</h1></html>"#,
        );
        apply_title_color(&mut doc);
        let html = match doc.elements_by_tag("html").first().copied() {
            Some(id) => id,
            None => panic!("html element should parse"),
        };
        assert_eq!(doc.attr(html, "style"), None);
    }

    #[test]
    fn heading_without_inline_color_is_ignored() {
        let mut doc = Document::parse("<html><h1>Plain</h1></html>");
        apply_title_color(&mut doc);
        let html = match doc.elements_by_tag("html").first().copied() {
            Some(id) => id,
            None => panic!("html element should parse"),
        };
        assert_eq!(doc.attr(html, "style"), None);
    }

    #[test]
    fn year_stamp_fills_the_placeholder() {
        let mut doc = Document::parse(r#"<span id="year"></span>"#);
        stamp_footer_year(&mut doc, 2026);
        let year = match doc.element_by_id("year") {
            Some(id) => id,
            None => panic!("year slot should parse"),
        };
        assert_eq!(doc.text_content(year), "2026");
    }

    #[test]
    fn missing_year_placeholder_is_skipped() {
        let mut doc = Document::parse("<main></main>");
        stamp_footer_year(&mut doc, 2026);
        assert!(doc.element_by_id("year").is_none());
    }
}
