//! Raw position records from the account store or a user-entry form.
//!
//! Upstream feeds are inconsistent: camelCase or snake_case keys, fields that
//! are missing, a `type` tag on some records and a signed size on others.
//! This module is the single boundary where all of that becomes a
//! [`Position`] with signed size.
//!
//! Direction rule: an explicit `type` (`"Long"`/`"Short"`) decides the sign and
//! `size` is taken as a magnitude. Without one, the sign of `size` decides.
//!
//! Two entry points:
//! - [`PositionRecord::normalize`] is lenient. Missing numbers become zero,
//!   leverage is clamped to 1x, and the current price falls back to entry.
//! - [`PositionRecord::validate`] is strict and rejects anything a valid
//!   position cannot have.

use crate::position::{Position, PositionError};
use crate::types::{Asset, Leverage, Price, SignedSize, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default, alias = "venue")]
    pub exchange: Option<String>,
    #[serde(default, rename = "type", alias = "direction", alias = "side")]
    pub direction: Option<String>,
    #[serde(default)]
    pub size: Option<Decimal>,
    #[serde(default)]
    pub leverage: Option<Decimal>,
    #[serde(default, alias = "entry_price")]
    pub entry_price: Option<Decimal>,
    #[serde(default, alias = "current_price")]
    pub current_price: Option<Decimal>,
}

impl PositionRecord {
    pub fn asset(&self) -> Asset {
        match (&self.asset, &self.market) {
            (Some(asset), _) if !asset.trim().is_empty() => Asset::new(asset.trim()),
            (_, Some(market)) => Asset::from_market(market),
            _ => Asset::unknown(),
        }
    }

    fn venue(&self) -> String {
        self.exchange.clone().unwrap_or_default()
    }

    fn side(&self) -> Result<Option<Side>, PositionError> {
        match &self.direction {
            None => Ok(None),
            Some(label) => Side::parse(label)
                .map(Some)
                .ok_or_else(|| PositionError::UnknownDirection(label.clone())),
        }
    }

    fn signed_size(&self, side: Option<Side>) -> SignedSize {
        let raw = self.size.unwrap_or(Decimal::ZERO);
        if raw.abs() > SignedSize::MAX_ABS {
            warn!(asset = %self.asset(), size = %raw, "size out of range, treating as zero");
            return SignedSize::zero();
        }
        match side {
            Some(side) => SignedSize::from_side(side, raw),
            None => SignedSize::new(raw),
        }
    }

    /// Lenient conversion for partial data feeds. Never fails.
    pub fn normalize(&self) -> Position {
        let side = match self.side() {
            Ok(side) => side,
            Err(err) => {
                warn!(asset = %self.asset(), %err, "ignoring direction tag, falling back to size sign");
                None
            }
        };

        let entry = self.lenient_price(self.entry_price, "entryPrice");
        let current = match self.lenient_price(self.current_price, "currentPrice") {
            p if p.is_zero() => entry,
            p => p,
        };
        let leverage = Leverage::clamped(self.leverage.unwrap_or(Decimal::ONE));

        if self.entry_price.is_none() || self.size.is_none() {
            debug!(asset = %self.asset(), "record missing size or entry price, treating as zero");
        }

        Position {
            asset: self.asset(),
            venue: self.venue(),
            size: self.signed_size(side),
            leverage,
            entry_price: entry,
            current_price: current,
        }
    }

    // negative or missing -> 0, above Price::MAX -> 0 with a warning
    fn lenient_price(&self, raw: Option<Decimal>, field: &'static str) -> Price {
        let raw = raw.unwrap_or(Decimal::ZERO);
        if !Price::in_range(raw) {
            warn!(asset = %self.asset(), field, price = %raw, "price out of range, treating as zero");
            return Price::ZERO;
        }
        Price::or_zero(raw)
    }

    /// Strict conversion. Use where bad input should be surfaced to the user.
    pub fn validate(&self) -> Result<Position, PositionError> {
        let side = self.side()?;

        let size = self.size.ok_or(PositionError::MissingField("size"))?;
        if size.is_zero() {
            return Err(PositionError::ZeroSize);
        }
        if size.abs() > SignedSize::MAX_ABS {
            return Err(PositionError::OutOfRange { field: "size", value: size });
        }

        let raw_leverage = self.leverage.ok_or(PositionError::MissingField("leverage"))?;
        let leverage = Leverage::new(raw_leverage).ok_or(PositionError::InvalidLeverage(raw_leverage))?;

        let raw_entry = self.entry_price.ok_or(PositionError::MissingField("entryPrice"))?;
        if !Price::in_range(raw_entry) {
            return Err(PositionError::OutOfRange { field: "entryPrice", value: raw_entry });
        }
        let entry = Price::new(raw_entry).ok_or(PositionError::NonPositiveEntryPrice(raw_entry))?;

        let current = match self.current_price {
            Some(raw) if raw < Decimal::ZERO => return Err(PositionError::NegativeCurrentPrice(raw)),
            Some(raw) if !Price::in_range(raw) => {
                return Err(PositionError::OutOfRange { field: "currentPrice", value: raw })
            }
            Some(raw) if raw > Decimal::ZERO => Price::new_unchecked(raw),
            _ => entry,
        };

        Ok(Position {
            asset: self.asset(),
            venue: self.venue(),
            size: self.signed_size(side),
            leverage,
            entry_price: entry,
            current_price: current,
        })
    }
}

impl From<&Position> for PositionRecord {
    fn from(position: &Position) -> Self {
        Self {
            asset: Some(position.asset.to_string()),
            market: None,
            exchange: Some(position.venue.clone()),
            direction: position.side().map(|s| s.to_string()),
            size: Some(position.size.abs()),
            leverage: Some(position.leverage.value()),
            entry_price: Some(position.entry_price.value()),
            current_price: Some(position.current_price.value()),
        }
    }
}

/// Normalize a batch, keeping input order.
pub fn normalize_records(records: &[PositionRecord]) -> Vec<Position> {
    records.iter().map(PositionRecord::normalize).collect()
}

/// Validate a batch. Fails on the first bad record, reporting its index.
pub fn validate_records(records: &[PositionRecord]) -> Result<Vec<Position>, (usize, PositionError)> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| r.validate().map_err(|e| (i, e)))
        .collect()
}
