//! Order history records and their running aggregates.
//!
//! Field names on the wire follow the blob the order tracker has always
//! persisted (`total`, `visits`, `numOfItems`), so previously stored results
//! keep deserializing.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One completed order scraped from an order history page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub restaurant: String,
    #[serde(rename = "numOfItems", alias = "itemCount")]
    pub item_count: u32,
    /// Order price with the currency symbol stripped, scale preserved (`"24.50"`).
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// Date segment exactly as rendered, e.g. `"Mar 4 at 7:12 PM"`.
    pub date: String,
}

/// Running totals for a single restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantAggregate {
    #[serde(alias = "visitCount")]
    pub visits: u32,
    #[serde(with = "rust_decimal::serde::float", alias = "totalSpend")]
    pub total: Decimal,
}

/// Result of one order-history scrape.
///
/// Built once per scrape and swapped in wholesale; never merged with an
/// earlier result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    #[serde(with = "rust_decimal::serde::float", alias = "grandTotal")]
    pub total: Decimal,
    pub restaurants: BTreeMap<String, RestaurantAggregate>,
    pub orders: Vec<OrderRecord>,
    /// Set when the page structure was not found or no order could be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AggregateResult {
    /// An empty result tagged with `message`.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Folds `orders` into a fresh result, in iteration order.
    #[must_use]
    pub fn from_orders<I>(orders: I) -> Self
    where
        I: IntoIterator<Item = OrderRecord>,
    {
        let mut result = Self::default();
        for order in orders {
            result.record(order);
        }
        result
    }

    /// Accumulates one order into the grand total and its restaurant entry.
    pub fn record(&mut self, order: OrderRecord) {
        self.total += order.price;

        self.restaurants
            .entry(order.restaurant.clone())
            .and_modify(|agg| {
                agg.visits += 1;
                agg.total += order.price;
            })
            .or_insert(RestaurantAggregate {
                visits: 1,
                total: order.price,
            });

        self.orders.push(order);
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Restaurants sorted by descending spend, ties broken by name.
    #[must_use]
    pub fn restaurants_by_spend(&self) -> Vec<(&str, &RestaurantAggregate)> {
        let mut ranked: Vec<_> = self
            .restaurants
            .iter()
            .map(|(name, agg)| (name.as_str(), agg))
            .collect();
        ranked.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    /// Re-derives every total from `orders` and compares.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let rebuilt = Self::from_orders(self.orders.iter().cloned());
        rebuilt.total == self.total && rebuilt.restaurants == self.restaurants
    }
}
