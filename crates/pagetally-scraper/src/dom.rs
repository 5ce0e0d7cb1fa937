//! Tree helpers over `scraper`'s parsed document.

use scraper::{ElementRef, Html, Selector};

use crate::error::ScraperError;

/// Compiles a CSS selector, keeping the parse error as text.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSelector`] if `css` does not parse.
pub fn parse_selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::InvalidSelector {
        selector: css.to_owned(),
        reason: e.to_string(),
    })
}

/// Concatenated text of every descendant text node, with no separator
/// inserted between nodes.
#[must_use]
pub fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Returns the deepest descendants of `root` satisfying `predicate`.
///
/// Traversal is post-order: once any descendant of a node matched, the node
/// itself is never tested, so wrappers around a match are discarded.
/// `root` itself is not a candidate. Matches come back in document order.
pub fn innermost_matches<'a, F>(root: ElementRef<'a>, predicate: F) -> Vec<ElementRef<'a>>
where
    F: Fn(ElementRef<'a>) -> bool,
{
    let mut found = Vec::new();
    for child in root.children().filter_map(ElementRef::wrap) {
        collect_innermost(child, &predicate, &mut found);
    }
    found
}

/// Returns `true` if `el` or anything below it matched.
fn collect_innermost<'a, F>(
    el: ElementRef<'a>,
    predicate: &F,
    found: &mut Vec<ElementRef<'a>>,
) -> bool
where
    F: Fn(ElementRef<'a>) -> bool,
{
    let mut below = false;
    for child in el.children().filter_map(ElementRef::wrap) {
        below |= collect_innermost(child, predicate, found);
    }
    if below {
        return true;
    }
    if predicate(el) {
        found.push(el);
        return true;
    }
    false
}

/// First element matching the first selector in `selectors` that matches
/// anything at all.
#[must_use]
pub fn select_first<'a>(doc: &'a Html, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors
        .iter()
        .find_map(|selector| doc.select(selector).next())
}

/// `true` if `el` or one of its descendants matches `selector`.
#[must_use]
pub fn self_or_descendant_matches(el: ElementRef<'_>, selector: &Selector) -> bool {
    selector.matches(&el) || el.select(selector).next().is_some()
}
