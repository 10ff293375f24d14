use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The extraction strategy that produced a field, in priority order.
///
/// The derived `Ord` is the authoritative priority: a variant declared earlier
/// always beats a later one when both produce a value for the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `<script type="application/ld+json">` blocks declaring a `Product`.
    StructuredData,
    /// Framework state embedded for client hydration (`__NEXT_DATA__`,
    /// `__APOLLO_STATE__`, VTEX `__STATE__`, ...).
    Hydration,
    /// `og:*` / `product:*` head meta tags.
    MetaTags,
    /// Class/id/attribute-name fragments and microdata `itemprop`.
    Attributes,
    /// Currency-marker scan over visible text.
    RawText,
    /// `<h1>` / `<title>` fallback for the name only.
    DocumentFallback,
}

impl Strategy {
    /// Every strategy, highest priority first.
    pub const ALL: [Strategy; 6] = [
        Strategy::StructuredData,
        Strategy::Hydration,
        Strategy::MetaTags,
        Strategy::Attributes,
        Strategy::RawText,
        Strategy::DocumentFallback,
    ];

    /// Numeric rank; lower is higher priority.
    #[must_use]
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::StructuredData => write!(f, "structured_data"),
            Strategy::Hydration => write!(f, "hydration"),
            Strategy::MetaTags => write!(f, "meta_tags"),
            Strategy::Attributes => write!(f, "attributes"),
            Strategy::RawText => write!(f, "raw_text"),
            Strategy::DocumentFallback => write!(f, "document_fallback"),
        }
    }
}

/// A populated field of a [`ProductRecord`], used as the key of
/// [`ProductRecord::sources`].
///
/// `Price` covers the whole price group (`price`, `list_price`,
/// `selling_price`), which always comes from a single strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Brand,
    Price,
    Currency,
    Availability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    Unknown,
}

impl Availability {
    /// Interprets an availability label as found in schema.org offers, meta
    /// tags, or storefront state.
    ///
    /// Accepts full schema.org IRIs (`"https://schema.org/InStock"`), bare
    /// type names (`"OutOfStock"`), OpenGraph values (`"instock"`, `"oos"`)
    /// and the Portuguese labels used by Brazilian storefronts
    /// (`"esgotado"`, `"disponível"`). Anything else is [`Availability::Unknown`].
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let tail = label.rsplit('/').next().unwrap_or(label);
        let normalized: String = tail
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .map(|c| match c {
                'í' => 'i',
                'ç' => 'c',
                other => other,
            })
            .collect();

        match normalized.as_str() {
            "outofstock" | "oos" | "soldout" | "discontinued" | "esgotado" | "indisponivel"
            | "semestoque" | "false" => Availability::OutOfStock,
            "instock" | "limitedavailability" | "instoreonly" | "onlineonly" | "preorder"
            | "presale" | "backorder" | "disponivel" | "emestoque" | "true" => {
                Availability::InStock
            }
            _ => Availability::Unknown,
        }
    }
}

/// The price group of a product: what the shopper pays and, when a markdown
/// is displayed, the original price it was reduced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Option<Decimal>,
    pub list_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

impl PriceQuote {
    /// A single observed price, treated as the selling price.
    #[must_use]
    pub fn single(selling: Decimal) -> Self {
        Self {
            price: Some(selling),
            list_price: None,
            selling_price: Some(selling),
        }
    }

    /// A discount display: `list` is the crossed-out original price.
    #[must_use]
    pub fn discounted(list: Decimal, selling: Decimal) -> Self {
        Self {
            price: Some(selling),
            list_price: Some(list),
            selling_price: Some(selling),
        }
    }

    /// Returns `true` when no price of any kind is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.list_price.is_none() && self.selling_price.is_none()
    }

    /// Returns `true` when the selling price exceeds the list price.
    #[must_use]
    pub fn is_suspect(&self) -> bool {
        matches!(
            (self.list_price, self.selling_price),
            (Some(list), Some(selling)) if selling > list
        )
    }
}

/// The result of one extraction pass over a product page.
///
/// Every field is independently optional; an empty field means no strategy
/// found a value, which is an expected outcome rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// URL the page was fetched from, as supplied by the caller.
    pub source_url: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    /// Effective price; equals `selling_price` whenever that is known.
    pub price: Option<Decimal>,
    /// ISO 4217-style code, e.g. `"BRL"`.
    pub currency: Option<String>,
    /// Original (crossed-out) price when a markdown is displayed.
    pub list_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub availability: Option<Availability>,
    /// Set when `selling_price > list_price`. The values are kept as found.
    pub price_suspect: bool,
    /// Which strategy produced each populated field.
    pub sources: BTreeMap<Field, Strategy>,
}

impl ProductRecord {
    /// A record with every field empty.
    #[must_use]
    pub fn empty(source_url: &str) -> Self {
        Self {
            source_url: source_url.to_owned(),
            name: None,
            brand: None,
            price: None,
            currency: None,
            list_price: None,
            selling_price: None,
            availability: None,
            price_suspect: false,
            sources: BTreeMap::new(),
        }
    }

    /// Returns `true` if no field was populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The strategy that produced `field`, if it is populated.
    #[must_use]
    pub fn source_of(&self, field: Field) -> Option<Strategy> {
        self.sources.get(&field).copied()
    }

    /// The price group as a [`PriceQuote`].
    #[must_use]
    pub fn price_quote(&self) -> PriceQuote {
        PriceQuote {
            price: self.price,
            list_price: self.list_price,
            selling_price: self.selling_price,
        }
    }

    /// Amount taken off the list price, when a non-suspect markdown exists.
    #[must_use]
    pub fn discount(&self) -> Option<Decimal> {
        match (self.list_price, self.selling_price) {
            (Some(list), Some(selling)) if list > selling => Some(list - selling),
            _ => None,
        }
    }
}
