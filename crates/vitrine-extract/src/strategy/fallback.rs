//! Strategy 6: the document's own heading or title, for the name only.

use std::sync::LazyLock;

use scraper::Selector;
use vitrine_core::Strategy;

use super::{ExtractionStrategy, PartialRecord};
use crate::error::ExtractionIssue;
use crate::page::Page;

static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

/// The first `<h1>` names the product; the `<title>` usually carries the
/// store name as well, so it is only used when there is no heading.
pub(crate) struct DocumentFallbackStrategy;

impl ExtractionStrategy for DocumentFallbackStrategy {
    fn kind(&self) -> Strategy {
        Strategy::DocumentFallback
    }

    fn try_extract(&self, page: &Page, _issues: &mut Vec<ExtractionIssue>) -> PartialRecord {
        PartialRecord {
            name: page.first_text(&HEADING).or_else(|| page.first_text(&TITLE)),
            ..PartialRecord::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_of(html: &str) -> Option<String> {
        DocumentFallbackStrategy
            .try_extract(&Page::parse(html), &mut Vec::new())
            .name
    }

    #[test]
    fn heading_wins_over_title() {
        let html = "<html><head><title>Panela Inox | Loja X</title></head>\
                    <body><h1> Panela Inox 24cm </h1></body></html>";
        assert_eq!(name_of(html).as_deref(), Some("Panela Inox 24cm"));
    }

    #[test]
    fn title_when_no_heading() {
        let html = "<html><head><title>Panela Inox | Loja X</title></head><body></body></html>";
        assert_eq!(name_of(html).as_deref(), Some("Panela Inox | Loja X"));
    }

    #[test]
    fn nothing_to_name() {
        assert!(name_of("<html><body><p>texto</p></body></html>").is_none());
    }

    #[test]
    fn only_the_name_is_produced() {
        let partial = DocumentFallbackStrategy.try_extract(
            &Page::parse("<h1>Mesa</h1><span class=\"price\">R$ 99,90</span>"),
            &mut Vec::new(),
        );
        assert!(partial.quote.is_none());
        assert!(partial.brand.is_none());
    }
}
