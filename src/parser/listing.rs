use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{nth_child, text_of};

static CARD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article.course-thumbnail > div.description").unwrap());
static FIRST_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a:nth-of-type(1)").unwrap());
static SECOND_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a:nth-of-type(2)").unwrap());

/// One instructor card on a department listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSummary {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub detail_link: Option<String>,
}

/// Parse every instructor card on a listing page, in document order.
pub fn scan_cards(html: &str) -> Vec<CardSummary> {
    let doc = Html::parse_document(html);
    let cards: Vec<CardSummary> = doc.select(&CARD).map(read_card).collect();
    debug!(cards = cards.len(), "scanned listing page");
    cards
}

// Everything is read relative to `card`, never from the page-wide selection.
fn read_card(card: ElementRef) -> CardSummary {
    let name = card.select(&FIRST_ANCHOR).next().and_then(text_of);
    let designation = card.select(&SECOND_ANCHOR).next().and_then(text_of);
    let detail_link = nth_child(card, "div", 2).and_then(first_href);

    CardSummary {
        name,
        designation,
        detail_link,
    }
}

/// First non-empty `href` among the anchors directly under `div`.
fn first_href(div: ElementRef) -> Option<String> {
    div.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "a")
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .map(str::to_string)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn each_card_keeps_its_own_labels() {
        let cards = scan_cards(&fixture("listing"));
        assert_eq!(cards.len(), 3);

        assert_eq!(cards[0].name.as_deref(), Some("Dr. Jane Doe"));
        assert_eq!(cards[0].designation.as_deref(), Some("Associate Professor"));
        assert_eq!(cards[0].detail_link.as_deref(), Some("/faculty-profile/jane-doe"));

        assert_eq!(cards[1].name.as_deref(), Some("Ali Raza"));
        assert_eq!(cards[1].designation.as_deref(), Some("Lecturer"));
        assert_eq!(cards[1].detail_link.as_deref(), Some("/faculty-profile/ali-raza"));

        assert_eq!(cards[2].name.as_deref(), Some("Sana Memon"));
        assert_eq!(cards[2].designation.as_deref(), Some("Assistant Professor"));
        assert_eq!(cards[2].detail_link.as_deref(), Some("/faculty-profile/sana-memon"));
    }

    #[test]
    fn missing_pieces_are_none_not_errors() {
        let html = r#"
            <article class="course-thumbnail">
              <div class="description">
                <a href="/x">Only Name</a>
              </div>
            </article>
            <article class="course-thumbnail">
              <div class="description">
                <div></div>
                <div><a href="/faculty-profile/second">View</a></div>
              </div>
            </article>"#;
        let cards = scan_cards(html);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].name.as_deref(), Some("Only Name"));
        assert_eq!(cards[0].designation, None);
        assert_eq!(cards[0].detail_link, None);
        assert_eq!(cards[1].detail_link.as_deref(), Some("/faculty-profile/second"));
    }

    #[test]
    fn link_comes_from_first_anchor_with_href() {
        let html = r#"
            <article class="course-thumbnail">
              <div class="description">
                <div><a href="/faculty-profile/x">Name</a><a>Title</a></div>
                <div><a class="icon"><i></i></a><a href="">blank</a><a href="/faculty-profile/x">View</a></div>
              </div>
            </article>"#;
        let cards = scan_cards(html);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].detail_link.as_deref(), Some("/faculty-profile/x"));
    }

    #[test]
    fn page_without_cards_yields_nothing() {
        assert!(scan_cards("<html><body><p>Under maintenance</p></body></html>").is_empty());
    }

    #[test]
    fn articles_without_thumbnail_class_are_ignored() {
        let html = r#"
            <article class="news"><div class="description"><a>News</a></div></article>"#;
        assert!(scan_cards(html).is_empty());
    }
}
