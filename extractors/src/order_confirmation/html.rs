use scraper::{ElementRef, Html, Selector};

/// Inline-style declarations that identify the order-confirmation container.
/// The sending template does not guarantee whitespace or declaration order,
/// so each declaration is checked individually against a normalized copy of
/// the attribute instead of comparing the whole string.
const CONTAINER_STYLE_SIGNATURE: [&str; 6] = [
    "font-size:16px",
    "width:100%!important",
    "height:100%!important",
    "margin:0!important",
    "padding:0!important",
    "background:#f8f8f8",
];

/// Locates the order-confirmation container and returns its flattened text:
/// every text node under it, trimmed, empties dropped, joined by newlines.
/// Returns `None` when no element carries the style signature.
pub fn flatten_order_container(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("div[style]").ok()?;

    document
        .select(&selector)
        .find(|element| {
            element
                .value()
                .attr("style")
                .is_some_and(style_matches_signature)
        })
        .map(|element| flatten_text(&element))
}

fn style_matches_signature(style: &str) -> bool {
    let normalized: String = style
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    CONTAINER_STYLE_SIGNATURE
        .iter()
        .all(|declaration| normalized.contains(declaration))
}

fn flatten_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
