//! Liquidation price estimates.
//!
//! Under cross margin a position's liquidation price depends on the whole
//! account: the free collateral cushion (total collateral minus margin used by
//! every position, this one included) is what the price can eat through before
//! maintenance is breached. Callers must pass a `used_margin` snapshot taken
//! together with the collateral, and recompute whenever either changes.
//!
//! A returned price of zero means "no price level": either the position is
//! empty or has no entry price, or the level falls at or below zero. The second
//! case is ambiguous for shorts, whose level only drops below zero once the
//! account is already underwater, so [`is_liquidatable`] reports breaches
//! separately from the price.

use crate::margin::{maintenance_margin_at_entry, MarginMode, MAINTENANCE_MARGIN_RATIO};
use crate::position::Position;
use crate::types::{Price, Quote, Side};
use rust_decimal::Decimal;

/// Cross-margin liquidation price from the account-wide buffer.
pub fn calculate_liquidation_price(position: &Position, total_collateral: Quote, used_margin: Quote) -> Price {
    if position.is_degenerate() {
        return Price::ZERO;
    }
    price_at(level_after_move(position, cross_move(position, total_collateral, used_margin)))
}

/// Isolated-margin variant: the position's own initial margin at entry minus
/// its maintenance margin at entry is the only buffer.
pub fn isolated_liquidation_price(position: &Position) -> Price {
    if position.is_degenerate() {
        return Price::ZERO;
    }
    price_at(level_after_move(position, isolated_move(position)))
}

pub fn liquidation_price_for_mode(
    mode: MarginMode,
    position: &Position,
    total_collateral: Quote,
    used_margin: Quote,
) -> Price {
    match mode {
        MarginMode::Cross => calculate_liquidation_price(position, total_collateral, used_margin),
        MarginMode::Isolated => isolated_liquidation_price(position),
    }
}

/// True when the current mark is already at or past the liquidation level.
///
/// Uses the unfloored level, so a short whose level went negative (the
/// account is underwater) is reported as breached rather than as "no level".
/// Degenerate positions are never liquidatable.
pub fn is_liquidatable(mode: MarginMode, position: &Position, total_collateral: Quote, used_margin: Quote) -> bool {
    if position.is_degenerate() {
        return false;
    }
    let price_move = match mode {
        MarginMode::Cross => cross_move(position, total_collateral, used_margin),
        MarginMode::Isolated => isolated_move(position),
    };
    let current = position.current_price.value();
    match (position.side(), level_after_move(position, price_move)) {
        (Some(Side::Long), Some(level)) => current <= level,
        (Some(Side::Short), Some(level)) => current >= level,
        _ => false,
    }
}

// callers rule out degenerate positions, so |size| is non-zero here
fn cross_move(position: &Position, total_collateral: Quote, used_margin: Quote) -> Decimal {
    let buffer = total_collateral.sub(used_margin);
    buffer.value() * (Decimal::ONE - MAINTENANCE_MARGIN_RATIO) / position.size.abs()
}

fn isolated_move(position: &Position) -> Decimal {
    let initial = position.entry_value().mul(position.leverage.initial_margin_fraction());
    let maintenance = maintenance_margin_at_entry(position.size, position.entry_price);
    initial.sub(maintenance).value() / position.size.abs()
}

// longs liquidate below entry, shorts above. a negative buffer moves the
// level past entry, and for shorts can push it below zero.
fn level_after_move(position: &Position, price_move: Decimal) -> Option<Decimal> {
    let entry = position.entry_price.value();
    match position.side()? {
        Side::Long => Some(entry - price_move),
        Side::Short => Some(entry + price_move),
    }
}

fn price_at(level: Option<Decimal>) -> Price {
    level.map(Price::or_zero).unwrap_or(Price::ZERO)
}

/// Distance from the current mark to the liquidation level, as % of the mark.
/// `None` when either price is the zero sentinel.
pub fn distance_to_liquidation(position: &Position, liquidation_price: Price) -> Option<Decimal> {
    if liquidation_price.is_zero() || position.current_price.is_zero() {
        return None;
    }
    let current = position.current_price.value();
    Some((current - liquidation_price.value()).abs() / current * Decimal::from(100))
}
