pub mod listing;
pub mod profile;

use scraper::ElementRef;

/// All descendant text, whitespace runs collapsed. `None` when blank.
pub fn text_of(el: ElementRef) -> Option<String> {
    non_blank(collapse(el.text()))
}

/// Only the element's own text nodes, ignoring nested elements.
pub fn own_text(el: ElementRef) -> Option<String> {
    let direct = el
        .children()
        .filter_map(|node| node.value().as_text().map(|t| &**t));
    non_blank(collapse(direct))
}

/// The `n`th (1-based) direct child element named `tag`, like XPath `./tag[n]`.
pub fn nth_child<'a>(el: ElementRef<'a>, tag: &str, n: usize) -> Option<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == tag)
        .nth(n.checked_sub(1)?)
}

fn collapse<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined: String = parts.collect();
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_blank(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
