//! Order history extraction.
//!
//! An order card is the innermost element under the page container whose
//! text carries an `"N items for $P"` phrase and which holds a link into a
//! `/store` page. The card yields one [`OrderRecord`]; anything that fails to
//! parse is skipped and logged.

use std::str::FromStr;
use std::sync::LazyLock;

use pagetally_core::{AggregateResult, OrderRecord};
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};

use crate::dom::{
    innermost_matches, parse_selector, select_first, self_or_descendant_matches, text_content,
};
use crate::error::ScraperError;

/// `"3 items for $24.50"`, `"1 item for CA$ 1,204.00"`; captures count and price.
static ITEM_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s+items?\s+for\s+([^\d\s]*\s?\d[\d,]*(?:\.\d+)?)")
        .expect("valid item phrase regex")
});

/// Leading amount of a price segment, currency prefix skipped.
static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\d]*?(\d[\d,]*(?:\.\d+)?)").expect("valid price regex"));

pub const CONTAINER_NOT_FOUND: &str = "Could not find main element";
pub const NO_ORDERS_FOUND: &str = "No orders found on page";

/// Selectors and separators describing the order list markup.
#[derive(Debug, Clone)]
pub struct OrderSelectors {
    /// Tried in order; the first that matches is the list container.
    pub containers: Vec<String>,
    /// Matches the restaurant link inside an order card.
    pub store_link: String,
    /// Split points between the item/price segment and the date.
    pub delimiters: Vec<String>,
}

impl Default for OrderSelectors {
    fn default() -> Self {
        Self {
            containers: vec!["main".to_string(), r#"[role="main"]"#.to_string()],
            store_link: r#"a[href*="/store"]"#.to_string(),
            delimiters: vec!["•".to_string(), "·".to_string()],
        }
    }
}

/// Compiled form of [`OrderSelectors`].
#[derive(Debug)]
pub struct OrderExtractor {
    containers: Vec<Selector>,
    store_link: Selector,
    delimiters: Vec<String>,
}

impl OrderExtractor {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if any selector fails to
    /// compile.
    pub fn new(selectors: &OrderSelectors) -> Result<Self, ScraperError> {
        let containers = selectors
            .containers
            .iter()
            .map(|css| parse_selector(css))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            containers,
            store_link: parse_selector(&selectors.store_link)?,
            delimiters: selectors
                .delimiters
                .iter()
                .filter(|d| !d.is_empty())
                .cloned()
                .collect(),
        })
    }

    /// Parses every order card in `html` into a fresh [`AggregateResult`].
    ///
    /// Never fails: a missing container or an empty list produce an
    /// error-tagged result instead.
    #[must_use]
    pub fn extract(&self, html: &str) -> AggregateResult {
        let doc = Html::parse_document(html);

        let Some(container) = select_first(&doc, &self.containers) else {
            tracing::warn!("order list container not found");
            return AggregateResult::failed(CONTAINER_NOT_FOUND);
        };

        let cards = innermost_matches(container, |el| self.is_order_card(el));

        let mut result = AggregateResult::default();
        let mut skipped = 0usize;
        for card in &cards {
            match self.parse_card(*card) {
                Ok(order) => result.record(order),
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(error = %e, "skipping order card");
                }
            }
        }

        tracing::info!(
            candidates = cards.len(),
            parsed = result.order_count(),
            skipped,
            "order extraction finished"
        );

        if result.orders.is_empty() {
            result.error = Some(NO_ORDERS_FOUND.to_string());
        }
        result
    }

    fn is_order_card(&self, el: ElementRef<'_>) -> bool {
        ITEM_PHRASE.is_match(&text_content(el)) && self_or_descendant_matches(el, &self.store_link)
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Result<OrderRecord, ScraperError> {
        let restaurant = self.restaurant_name(card)?;

        let info = innermost_matches(card, |el| ITEM_PHRASE.is_match(&text_content(el)))
            .into_iter()
            .next()
            .unwrap_or(card);
        let (item_count, price, date) = self.parse_info_upward(card, info)?;

        Ok(OrderRecord {
            restaurant,
            item_count,
            price,
            date,
        })
    }

    /// Parses the info text of `info`, widening to its ancestors (up to and
    /// including `card`) while the date sits in a sibling element, as in
    /// `<span>2 items for $10.00</span><span> • Mar 4</span>`.
    fn parse_info_upward<'a>(
        &self,
        card: ElementRef<'a>,
        info: ElementRef<'a>,
    ) -> Result<(u32, Decimal, String), ScraperError> {
        let mut current = info;
        loop {
            let err = match parse_info_text(&text_content(current), &self.delimiters) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => e,
            };
            if current == card {
                return Err(err);
            }
            match current.parent().and_then(ElementRef::wrap) {
                Some(parent) => current = parent,
                None => return Err(err),
            }
        }
    }

    /// Text of the first store link below the card, or of the card itself
    /// when the card is the link.
    ///
    /// When the link wraps the whole card, its first text node that is not
    /// the item phrase is taken as the name.
    fn restaurant_name(&self, card: ElementRef<'_>) -> Result<String, ScraperError> {
        let link = card
            .select(&self.store_link)
            .next()
            .or_else(|| self.store_link.matches(&card).then_some(card))
            .ok_or_else(|| parse_failure("restaurant", "order card has no store link"))?;

        let full = text_content(link).trim().to_string();
        let name = if ITEM_PHRASE.is_match(&full) {
            link.text()
                .map(str::trim)
                .find(|t| !t.is_empty() && !ITEM_PHRASE.is_match(t))
                .unwrap_or_default()
                .to_string()
        } else {
            full
        };

        if name.is_empty() {
            return Err(parse_failure("restaurant", "store link has no name text"));
        }
        Ok(name)
    }
}

fn parse_failure(context: &str, reason: impl Into<String>) -> ScraperError {
    ScraperError::ParseFailure {
        context: context.to_owned(),
        reason: reason.into(),
    }
}

/// Splits `"3 items for $24.50 • Mar 4 at 7:12 PM"` into count, price and date.
///
/// The segment holding the item phrase and the one right after it are used;
/// any later segments (e.g. `"View receipt"`) are ignored.
///
/// # Errors
///
/// Returns [`ScraperError::ParseFailure`] if the phrase, count, price or date
/// is missing or malformed.
pub fn parse_info_text(
    text: &str,
    delimiters: &[String],
) -> Result<(u32, Decimal, String), ScraperError> {
    let segments = split_segments(text, delimiters);

    let phrase_at = segments
        .iter()
        .position(|s| ITEM_PHRASE.is_match(s))
        .ok_or_else(|| parse_failure("order info", format!("no item phrase in \"{text}\"")))?;

    let date = segments
        .get(phrase_at + 1)
        .map(|s| (*s).to_string())
        .ok_or_else(|| parse_failure("order date", format!("no date segment in \"{text}\"")))?;

    let caps = ITEM_PHRASE
        .captures(segments[phrase_at])
        .ok_or_else(|| parse_failure("order info", format!("no item phrase in \"{text}\"")))?;
    let (count_raw, price_raw) = (&caps[1], &caps[2]);

    let item_count = count_raw
        .parse::<u32>()
        .map_err(|e| parse_failure("item count", format!("\"{count_raw}\": {e}")))?;
    let price = parse_price(price_raw)?;

    Ok((item_count, price, date))
}

/// Parses `"$24.50"`, `"€ 1,204.00"` into a decimal, keeping its scale.
///
/// # Errors
///
/// Returns [`ScraperError::ParseFailure`] when no amount can be read.
pub fn parse_price(raw: &str) -> Result<Decimal, ScraperError> {
    let raw = raw.trim();
    let amount = PRICE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace(',', ""))
        .ok_or_else(|| parse_failure("price", format!("no amount in \"{raw}\"")))?;

    Decimal::from_str(&amount).map_err(|e| parse_failure("price", format!("\"{raw}\": {e}")))
}

/// Splits on every delimiter, trimming and dropping empty pieces.
fn split_segments<'t>(text: &'t str, delimiters: &[String]) -> Vec<&'t str> {
    let mut segments = vec![text];
    for delimiter in delimiters {
        segments = segments
            .into_iter()
            .flat_map(|s| s.split(delimiter.as_str()))
            .collect();
    }
    segments
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "orders_test.rs"]
mod tests;
