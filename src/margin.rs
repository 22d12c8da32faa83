//! Margin calculation and account-level aggregation.
//!
//! Required margin is notional value divided by leverage. In a cross-margin
//! account every position draws from the same collateral pool, so utilization
//! and available margin are computed once for the whole account.
//!
//! Utilization is returned uncapped. Values above 100% mean the account is
//! already under-collateralized, and alerting still needs to see them.
//! Clamping to 100 is a display concern, see [`display_utilization`].

use crate::position::Position;
use crate::types::{Leverage, Price, Quote, SignedSize};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Maintenance margin as a fraction of notional at entry.
pub const MAINTENANCE_MARGIN_RATIO: Decimal = dec!(0.03);

/// Cross shares one collateral pool; Isolated gives each position its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginMode {
    #[default]
    Cross,
    Isolated,
}

pub fn notional_value(size: SignedSize, price: Price) -> Quote {
    Quote::new(size.abs() * price.value())
}

pub fn calculate_required_margin(size: SignedSize, current_price: Price, leverage: Leverage) -> Quote {
    let notional = notional_value(size, current_price);
    Quote::new(notional.value() * leverage.initial_margin_fraction())
}

pub fn maintenance_margin_at_entry(size: SignedSize, entry_price: Price) -> Quote {
    Quote::new(notional_value(size, entry_price).value() * MAINTENANCE_MARGIN_RATIO)
}

pub fn total_unrealized_pnl(positions: &[Position]) -> Quote {
    positions.iter().map(Position::unrealized_pnl).sum()
}

pub fn total_used_margin(positions: &[Position]) -> Quote {
    positions.iter().map(Position::required_margin).sum()
}

/// collateral + unrealized pnl
pub fn account_value(collateral: Quote, positions: &[Position]) -> Quote {
    collateral.add(total_unrealized_pnl(positions))
}

/// used / value * 100. zero when the account has no positive value.
pub fn utilization(used_margin: Quote, account_value: Quote) -> Decimal {
    if account_value.value() <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    used_margin.value() / account_value.value() * dec!(100)
}

pub fn available_margin(account_value: Quote, used_margin: Quote) -> Quote {
    account_value.sub(used_margin).max_zero()
}

pub fn display_utilization(utilization: Decimal) -> Decimal {
    utilization.max(Decimal::ZERO).min(dec!(100))
}
