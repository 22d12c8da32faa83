// 4.0: open position valuation. pnl = size * (current - entry).
// positions are values: price updates and shocks hand back a new Position.

use crate::margin::calculate_required_margin;
use crate::types::{Asset, Leverage, Price, Quote, Side, SignedSize};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub asset: Asset,
    // display only, never used in math
    pub venue: String,
    pub size: SignedSize,
    pub leverage: Leverage,
    pub entry_price: Price,
    pub current_price: Price,
}

impl Position {
    // current price starts at entry until market data arrives
    pub fn new(
        asset: Asset,
        venue: impl Into<String>,
        size: SignedSize,
        leverage: Leverage,
        entry_price: Price,
    ) -> Self {
        Self {
            asset,
            venue: venue.into(),
            size,
            leverage,
            entry_price,
            current_price: entry_price,
        }
    }

    /// Strict constructor for form input. Rejects anything a valid position can't have.
    pub fn try_new(
        asset: Asset,
        venue: impl Into<String>,
        side: Side,
        abs_size: Decimal,
        leverage: Decimal,
        entry_price: Decimal,
    ) -> Result<Self, PositionError> {
        if abs_size.is_zero() {
            return Err(PositionError::ZeroSize);
        }
        if abs_size.abs() > SignedSize::MAX_ABS {
            return Err(PositionError::OutOfRange { field: "size", value: abs_size });
        }
        if !Price::in_range(entry_price) {
            return Err(PositionError::OutOfRange { field: "entryPrice", value: entry_price });
        }
        let leverage = Leverage::new(leverage).ok_or(PositionError::InvalidLeverage(leverage))?;
        let entry = Price::new(entry_price).ok_or(PositionError::NonPositiveEntryPrice(entry_price))?;

        Ok(Self::new(
            asset,
            venue,
            SignedSize::from_side(side, abs_size),
            leverage,
            entry,
        ))
    }

    pub fn with_current_price(mut self, price: Price) -> Self {
        self.current_price = price;
        self
    }

    pub fn side(&self) -> Option<Side> {
        self.size.side()
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_zero()
    }

    // zero size or zero entry: contributes nothing and has no liquidation price
    pub fn is_degenerate(&self) -> bool {
        self.size.is_zero() || self.entry_price.is_zero()
    }

    // 4.1: paper gains/losses at the current mark
    pub fn unrealized_pnl(&self) -> Quote {
        if self.is_degenerate() {
            return Quote::zero();
        }
        calculate_unrealized_pnl(self.size, self.entry_price, self.current_price)
    }

    pub fn notional_value(&self) -> Quote {
        Quote::new(self.size.abs() * self.current_price.value())
    }

    pub fn entry_value(&self) -> Quote {
        Quote::new(self.size.abs() * self.entry_price.value())
    }

    // signed: longs positive, shorts negative. feeds the hedging netting.
    pub fn signed_exposure(&self) -> Quote {
        Quote::new(self.size.value() * self.current_price.value())
    }

    // 4.2: notional / leverage
    pub fn required_margin(&self) -> Quote {
        if self.is_degenerate() {
            return Quote::zero();
        }
        calculate_required_margin(self.size, self.current_price, self.leverage)
    }

    // 4.3: uniform what-if move. original stays untouched.
    pub fn shocked(&self, percent_change: Decimal) -> Self {
        self.clone()
            .with_current_price(self.current_price.shocked(percent_change))
    }
}

// 4.4: the pnl formula. size * (current - entry). the sign of size carries direction,
// so for a short this is (entry - current) * |size|.
pub fn calculate_unrealized_pnl(size: SignedSize, entry_price: Price, current_price: Price) -> Quote {
    let pnl = size.value() * (current_price.value() - entry_price.value());
    Quote::new(pnl)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Entry price must be positive, got {0}")]
    NonPositiveEntryPrice(Decimal),

    #[error("Leverage must be at least 1x, got {0}")]
    InvalidLeverage(Decimal),

    #[error("Position size must be non-zero")]
    ZeroSize,

    #[error("Current price must not be negative, got {0}")]
    NegativeCurrentPrice(Decimal),

    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Unrecognised position type `{0}`")]
    UnknownDirection(String),

    #[error("`{field}` of {value} is outside the supported range")]
    OutOfRange { field: &'static str, value: Decimal },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc_long() -> Position {
        Position::new(
            Asset::new("BTC"),
            "Reya Perps",
            SignedSize::new(dec!(0.5)),
            Leverage::new(dec!(10)).unwrap(),
            Price::new_unchecked(dec!(45000)),
        )
        .with_current_price(Price::new_unchecked(dec!(46500)))
    }

    #[test]
    fn unrealized_pnl_long_profit() {
        let pos = btc_long();
        // (46500 - 45000) * 0.5
        assert_eq!(pos.unrealized_pnl().value(), dec!(750));
    }

    #[test]
    fn unrealized_pnl_long_loss() {
        let pos = btc_long().with_current_price(Price::new_unchecked(dec!(43000)));
        assert_eq!(pos.unrealized_pnl().value(), dec!(-1000));
    }

    #[test]
    fn unrealized_pnl_short_profit() {
        let pos = Position::new(
            Asset::new("ETH"),
            "Reya Options",
            SignedSize::new(dec!(-2)),
            Leverage::new(dec!(5)).unwrap(),
            Price::new_unchecked(dec!(2300)),
        )
        .with_current_price(Price::new_unchecked(dec!(2250)));

        // short profits when price drops: (2300 - 2250) * 2
        assert_eq!(pos.unrealized_pnl().value(), dec!(100));
    }

    #[test]
    fn new_position_marks_at_entry() {
        let pos = Position::new(
            Asset::new("SOL"),
            "Reya Spot",
            SignedSize::new(dec!(10)),
            Leverage::ONE,
            Price::new_unchecked(dec!(100)),
        );
        assert_eq!(pos.current_price, pos.entry_price);
        assert!(pos.unrealized_pnl().is_zero());
    }

    #[test]
    fn required_margin_and_notional() {
        let pos = btc_long();
        assert_eq!(pos.notional_value().value(), dec!(23250));
        assert_eq!(pos.required_margin().value(), dec!(2325));
        assert_eq!(pos.entry_value().value(), dec!(22500));
    }

    #[test]
    fn degenerate_positions_contribute_nothing() {
        let mut pos = btc_long();
        pos.size = SignedSize::zero();
        assert!(pos.unrealized_pnl().is_zero());
        assert!(pos.required_margin().is_zero());

        let mut pos = btc_long();
        pos.entry_price = Price::ZERO;
        assert!(pos.is_degenerate());
        assert!(pos.unrealized_pnl().is_zero());
    }

    #[test]
    fn shock_leaves_original_untouched() {
        let pos = btc_long();
        let shocked = pos.shocked(dec!(-10));

        assert_eq!(shocked.current_price.value(), dec!(41850));
        assert_eq!(pos.current_price.value(), dec!(46500));
        assert_eq!(shocked.unrealized_pnl().value(), dec!(-1575));
    }

    #[test]
    fn signed_exposure_follows_direction() {
        let long = btc_long();
        assert_eq!(long.signed_exposure().value(), dec!(23250));

        let mut short = btc_long();
        short.size = SignedSize::new(dec!(-0.5));
        assert_eq!(short.signed_exposure().value(), dec!(-23250));
    }

    #[test]
    fn try_new_validates_input() {
        let ok = Position::try_new(Asset::new("BTC"), "Reya Perps", Side::Short, dec!(1), dec!(10), dec!(43000)).unwrap();
        assert!(ok.size.is_short());

        let zero_lev = Position::try_new(Asset::new("BTC"), "x", Side::Long, dec!(1), dec!(0), dec!(43000));
        assert_eq!(zero_lev, Err(PositionError::InvalidLeverage(dec!(0))));

        let bad_entry = Position::try_new(Asset::new("BTC"), "x", Side::Long, dec!(1), dec!(5), dec!(0));
        assert_eq!(bad_entry, Err(PositionError::NonPositiveEntryPrice(dec!(0))));

        let zero_size = Position::try_new(Asset::new("BTC"), "x", Side::Long, dec!(0), dec!(5), dec!(100));
        assert_eq!(zero_size, Err(PositionError::ZeroSize));

        let huge = Position::try_new(Asset::new("BTC"), "x", Side::Long, dec!(100_000_000_000_000_000_000), dec!(1), dec!(100));
        assert_eq!(huge, Err(PositionError::OutOfRange { field: "size", value: dec!(100_000_000_000_000_000_000) }));

        let huge_entry = Position::try_new(Asset::new("BTC"), "x", Side::Long, dec!(1), dec!(1), dec!(100_000_000_000_000_000_000));
        assert!(matches!(huge_entry, Err(PositionError::OutOfRange { field: "entryPrice", .. })));
    }
}
