//! Cross-margin portfolio: one collateral pool, many positions.
//!
//! `Portfolio` is a snapshot value. Every calculation reads collateral and all
//! positions from the same snapshot, which is what keeps cross-margin
//! liquidation prices coherent. Updates (`with_collateral`, `with_prices`,
//! `with_position`) return a new portfolio.

use crate::hedging::{calculate_hedging_benefit, HedgingReport};
use crate::liquidation::{distance_to_liquidation, is_liquidatable, liquidation_price_for_mode};
use crate::margin::{
    account_value, available_margin, total_unrealized_pnl, total_used_margin, utilization, MarginMode,
};
use crate::position::Position;
use crate::price_feed::{apply_prices, PriceBook};
use crate::risk::{assess_risk, RiskAssessment};
use crate::types::{Asset, Price, Quote, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub collateral: Quote,
    /// display order only
    pub positions: Vec<Position>,
}

/// Account-level numbers for a dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub total_pnl: Quote,
    pub used_margin: Quote,
    pub account_value: Quote,
    pub available_margin: Quote,
    /// uncapped, can exceed 100
    pub utilization: Decimal,
    pub risk: RiskAssessment,
    pub position_count: usize,
}

impl PortfolioStats {
    pub fn is_empty(&self) -> bool {
        self.position_count == 0
    }
}

/// Per-position row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub asset: Asset,
    pub venue: String,
    pub side: Option<Side>,
    pub pnl: Quote,
    pub notional: Quote,
    pub required_margin: Quote,
    /// `None` when there is no positive price level
    pub liquidation_price: Option<Price>,
    /// % move from the current mark to liquidation
    pub liquidation_distance: Option<Decimal>,
    /// mark already at or past the level, including shorts whose level fell below zero
    pub liquidatable: bool,
}

impl Portfolio {
    pub fn new(collateral: Quote, positions: Vec<Position>) -> Self {
        Self { collateral, positions }
    }

    pub fn empty(collateral: Quote) -> Self {
        Self::new(collateral, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn with_collateral(&self, collateral: Quote) -> Self {
        Self::new(collateral, self.positions.clone())
    }

    pub fn with_position(&self, position: Position) -> Self {
        let mut positions = self.positions.clone();
        positions.push(position);
        Self::new(self.collateral, positions)
    }

    pub fn with_prices(&self, book: &PriceBook) -> Self {
        Self::new(self.collateral, apply_prices(&self.positions, book))
    }

    pub fn total_pnl(&self) -> Quote {
        total_unrealized_pnl(&self.positions)
    }

    pub fn used_margin(&self) -> Quote {
        total_used_margin(&self.positions)
    }

    pub fn account_value(&self) -> Quote {
        account_value(self.collateral, &self.positions)
    }

    pub fn stats(&self) -> PortfolioStats {
        let total_pnl = self.total_pnl();
        let used_margin = self.used_margin();
        let account_value = self.collateral.add(total_pnl);
        let utilization = utilization(used_margin, account_value);

        PortfolioStats {
            total_pnl,
            used_margin,
            account_value,
            available_margin: available_margin(account_value, used_margin),
            utilization,
            risk: assess_risk(utilization),
            position_count: self.positions.len(),
        }
    }

    /// Cross-margin liquidation price for one position, using this snapshot's
    /// collateral and account-wide used margin.
    pub fn liquidation_price(&self, position: &Position) -> Price {
        liquidation_price_for_mode(MarginMode::Cross, position, self.collateral, self.used_margin())
    }

    pub fn position_reports(&self, mode: MarginMode) -> Vec<PositionReport> {
        let used_margin = self.used_margin();
        self.positions
            .iter()
            .map(|p| {
                let liq = liquidation_price_for_mode(mode, p, self.collateral, used_margin);
                let liquidation_price = (!liq.is_zero()).then_some(liq);
                PositionReport {
                    asset: p.asset.clone(),
                    venue: p.venue.clone(),
                    side: p.side(),
                    pnl: p.unrealized_pnl(),
                    notional: p.notional_value(),
                    required_margin: p.required_margin(),
                    liquidation_price,
                    liquidation_distance: liquidation_price.and_then(|l| distance_to_liquidation(p, l)),
                    liquidatable: is_liquidatable(mode, p, self.collateral, used_margin),
                }
            })
            .collect()
    }

    pub fn hedging(&self) -> HedgingReport {
        calculate_hedging_benefit(&self.positions)
    }
}
