// Market Data Integration
//
// The engine never fetches prices. A feed (websocket push, REST poll, a test
// fixture) hands over {asset, price} pairs; they are collected into a PriceBook
// snapshot and applied to positions as a pure transform. The engine stays
// agnostic to where prices come from.

use crate::position::Position;
use crate::types::{Asset, Price, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A single mark price from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub asset: Asset,
    pub price: Decimal,
    pub timestamp: Timestamp,
}

impl PriceUpdate {
    pub fn new(asset: Asset, price: Decimal, timestamp: Timestamp) -> Self {
        Self { asset, price, timestamp }
    }
}

/// Latest known price per asset. Last write wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceBook {
    prices: BTreeMap<Asset, (Price, Timestamp)>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-positive and out-of-range prices are dropped; a bad tick must not
    /// zero out a mark.
    /// Returns whether the update was accepted.
    pub fn apply(&mut self, update: &PriceUpdate) -> bool {
        let Some(price) = Price::new(update.price) else {
            debug!(asset = %update.asset, price = %update.price, "dropping non-positive or out-of-range price");
            return false;
        };
        if let Some((_, seen_at)) = self.prices.get(&update.asset) {
            if *seen_at > update.timestamp {
                debug!(asset = %update.asset, "dropping out-of-order price");
                return false;
            }
        }
        self.prices.insert(update.asset.clone(), (price, update.timestamp));
        true
    }

    pub fn apply_all<'a>(&mut self, updates: impl IntoIterator<Item = &'a PriceUpdate>) -> usize {
        updates.into_iter().filter(|u| self.apply(u)).count()
    }

    pub fn price(&self, asset: &Asset) -> Option<Price> {
        self.prices.get(asset).map(|(p, _)| *p)
    }

    pub fn updated_at(&self, asset: &Asset) -> Option<Timestamp> {
        self.prices.get(asset).map(|(_, ts)| *ts)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Pull the latest batch from a source into the book.
    pub fn refresh_from(&mut self, source: &dyn PriceSource) -> usize {
        let updates = source.latest();
        let accepted = self.apply_all(&updates);
        debug!(source = source.name(), received = updates.len(), accepted, "price book refreshed");
        accepted
    }
}

/// Re-mark positions against the book. Assets without a price keep their mark.
pub fn apply_prices(positions: &[Position], book: &PriceBook) -> Vec<Position> {
    positions
        .iter()
        .map(|p| match book.price(&p.asset) {
            Some(price) => p.clone().with_current_price(price),
            None => p.clone(),
        })
        .collect()
}

/// Seam for market data collaborators. Implement this over a websocket
/// subscription, a REST poller, or a fixture.
pub trait PriceSource {
    fn name(&self) -> &str;

    /// Latest prices known to the source, any cadence.
    fn latest(&self) -> Vec<PriceUpdate>;
}

/// Fixed prices, for tests and the demo binary.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    updates: Vec<PriceUpdate>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, asset: &str, price: Decimal, timestamp: Timestamp) -> Self {
        self.updates.push(PriceUpdate::new(Asset::new(asset), price, timestamp));
        self
    }
}

impl PriceSource for StaticPriceSource {
    fn name(&self) -> &str {
        "static"
    }

    fn latest(&self) -> Vec<PriceUpdate> {
        self.updates.clone()
    }
}
