//! Parsed view of one product page, shared by every strategy.

use std::cell::OnceCell;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

use crate::strategy::hydration::{find_payloads, HydrationPayload};

/// Elements whose text is never rendered as page content.
const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid selector"));
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("valid selector"));

/// One HTML document, parsed once and queried by every strategy.
///
/// Parsing is tolerant: any text produces a (possibly empty) DOM.
pub struct Page {
    document: Html,
    visible_text: OnceCell<String>,
    hydration_payloads: OnceCell<Vec<HydrationPayload>>,
}

impl Page {
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
            visible_text: OnceCell::new(),
            hydration_payloads: OnceCell::new(),
        }
    }

    /// Every `<script>` element in document order.
    pub(crate) fn scripts(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.document.select(&SCRIPT)
    }

    /// Every element in document order.
    pub(crate) fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }

    /// `content` of the first `<meta>` whose `property` or `name` equals one
    /// of `keys`, trying the keys in order.
    pub(crate) fn meta_content(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| {
            self.document.select(&META).find_map(|meta| {
                let el = meta.value();
                let matches = [el.attr("property"), el.attr("name")]
                    .into_iter()
                    .flatten()
                    .any(|k| k.trim().eq_ignore_ascii_case(key));
                if !matches {
                    return None;
                }
                el.attr("content")
                    .map(collapse_whitespace)
                    .filter(|v| !v.is_empty())
            })
        })
    }

    /// Collapsed text of the first element matching `selector`, if non-empty.
    pub(crate) fn first_text(&self, selector: &Selector) -> Option<String> {
        self.document
            .select(selector)
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    }

    /// Embedded framework state blocks, found on first use.
    pub(crate) fn hydration_payloads(&self) -> &[HydrationPayload] {
        self.hydration_payloads.get_or_init(|| find_payloads(self))
    }

    /// All rendered text, whitespace-collapsed and joined with single spaces.
    ///
    /// Text inside `script`, `style`, `noscript`, `template` and `head` is
    /// excluded. Computed on first use.
    pub(crate) fn visible_text(&self) -> &str {
        self.visible_text.get_or_init(|| {
            let mut parts: Vec<&str> = Vec::new();
            for node in self.document.root_element().descendants() {
                let Node::Text(text) = node.value() else {
                    continue;
                };
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
                });
                if !hidden {
                    parts.extend(text.split_whitespace());
                }
            }
            parts.join(" ")
        })
    }
}

/// Whitespace-collapsed text content of `element`.
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Trims and collapses every whitespace run into one space.
pub(crate) fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
