//! Order-number extraction and lookup.
//!
//! Customers quote orders as `TR-12345`, `TR12345`, `#12345` or a bare
//! `12345`. The first 5-8 digit run wins. A token the order book does not
//! know still resolves, to a placeholder "processing" record.

use async_trait::async_trait;
use pitcrew_config::DemoOrderConfig;
use pitcrew_core::order::{OrderLookup, OrderRecord, OrderStatus};
use regex_lite::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

static ORDER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:TR-?|#)?(\d{5,8})").expect("Invalid order token regex")
});

/// Items listed on a placeholder record.
pub const PLACEHOLDER_ITEM: &str = "Track Racer Rig";
/// Delivery estimate on a placeholder record.
pub const PLACEHOLDER_DELIVERY: &str = "Within 5-7 business days";

/// The digits of the first order reference in `text`, if any.
pub fn extract_order_token(text: &str) -> Option<&str> {
    ORDER_TOKEN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The record reported for a token that is not in the order book.
pub fn placeholder_order(token: &str) -> OrderRecord {
    OrderRecord {
        order_id: format!("TR-{token}"),
        status: OrderStatus::Processing,
        tracking: None,
        items: vec![PLACEHOLDER_ITEM.to_string()],
        estimated_delivery: Some(PLACEHOLDER_DELIVERY.to_string()),
    }
}

/// A fixed, in-memory order table.
#[derive(Debug, Clone, Default)]
pub struct DemoOrderBook {
    orders: HashMap<String, OrderRecord>,
}

impl DemoOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(rows: &[DemoOrderConfig]) -> Self {
        rows.iter().fold(Self::new(), |book, row| {
            book.with_order(row.token.clone(), row.to_record())
        })
    }

    pub fn with_order(mut self, token: impl Into<String>, record: OrderRecord) -> Self {
        self.orders.insert(token.into(), record);
        self
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl OrderLookup for DemoOrderBook {
    async fn find(&self, token: &str) -> Option<OrderRecord> {
        self.orders.get(token).cloned()
    }
}

/// Turns free text into an order record.
#[derive(Clone)]
pub struct OrderResolver {
    lookup: Arc<dyn OrderLookup>,
}

impl OrderResolver {
    pub fn new(lookup: Arc<dyn OrderLookup>) -> Self {
        Self { lookup }
    }

    /// `None` only when `text` carries no order reference at all.
    pub async fn resolve(&self, text: &str) -> Option<OrderRecord> {
        let token = extract_order_token(text)?;

        match self.lookup.find(token).await {
            Some(record) => {
                debug!(token, order_id = %record.order_id, "Order found");
                Some(record)
            }
            None => {
                debug!(token, "Order not in book, using placeholder");
                Some(placeholder_order(token))
            }
        }
    }
}
