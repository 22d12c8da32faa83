//! What-if simulation: re-run the margin math on shocked prices.
//!
//! A uniform percentage shock is applied to every position's current price,
//! then pnl, margin, utilization and risk are recomputed on the shocked copy.
//! Nothing is mutated; callers get a projected snapshot back.
//!
//! An empty book is reported as [`SimulationOutcome::NoPositions`] rather than
//! an error: there is simply nothing to simulate.

use crate::margin::{available_margin, total_unrealized_pnl, total_used_margin, utilization};
use crate::portfolio::Portfolio;
use crate::position::Position;
use crate::risk::{assess_risk, RiskAssessment, RiskLevel};
use crate::types::{Asset, Quote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Projected account state under a price shock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Shock applied, in percent (e.g. -10 for a 10% drop).
    pub percent_change: Decimal,
    pub total_pnl: Quote,
    pub account_value: Quote,
    pub used_margin: Quote,
    pub available_margin: Quote,
    pub utilization: Decimal,
    pub risk: RiskAssessment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationOutcome {
    /// Nothing to simulate.
    NoPositions,
    Projected(SimulationResult),
}

impl SimulationResult {
    /// Solvent with margin to spare and risk below High. Needed on top of the
    /// risk level since utilization reads 0 once account value goes negative.
    pub fn is_tolerated(&self) -> bool {
        self.account_value.value() > Decimal::ZERO
            && !self.available_margin.is_zero()
            && self.risk.level < RiskLevel::High
    }
}

impl SimulationOutcome {
    pub fn projected(&self) -> Option<&SimulationResult> {
        match self {
            SimulationOutcome::Projected(result) => Some(result),
            SimulationOutcome::NoPositions => None,
        }
    }
}

/// Shock every position by the same percentage.
pub fn shock_positions(positions: &[Position], percent_change: Decimal) -> Vec<Position> {
    positions.iter().map(|p| p.shocked(percent_change)).collect()
}

/// Shock per asset. Assets not in the map are left at their current price.
pub fn shock_positions_by_asset(positions: &[Position], shocks: &BTreeMap<Asset, Decimal>) -> Vec<Position> {
    positions
        .iter()
        .map(|p| match shocks.get(&p.asset) {
            Some(pct) => p.shocked(*pct),
            None => p.clone(),
        })
        .collect()
}

/// Uniform what-if over the whole book.
pub fn simulate(positions: &[Position], collateral: Quote, percent_change: Decimal) -> SimulationOutcome {
    if positions.is_empty() {
        debug!(%percent_change, "simulation requested on empty portfolio");
        return SimulationOutcome::NoPositions;
    }

    let shocked = shock_positions(positions, percent_change);
    let result = project(&shocked, collateral, percent_change);

    debug!(
        %percent_change,
        pnl = %result.total_pnl,
        utilization = %result.utilization,
        risk = %result.risk.level,
        "what-if projected"
    );

    SimulationOutcome::Projected(result)
}

/// Per-asset what-if. `percent_change` on the result is zero since no single
/// shock applies.
pub fn simulate_by_asset(
    positions: &[Position],
    collateral: Quote,
    shocks: &BTreeMap<Asset, Decimal>,
) -> SimulationOutcome {
    if positions.is_empty() {
        return SimulationOutcome::NoPositions;
    }
    let shocked = shock_positions_by_asset(positions, shocks);
    SimulationOutcome::Projected(project(&shocked, collateral, Decimal::ZERO))
}

/// Run a ladder of uniform shocks, e.g. -20, -10, 0, 10, 20.
pub fn stress_ladder(positions: &[Position], collateral: Quote, shocks: &[Decimal]) -> Vec<SimulationOutcome> {
    shocks
        .iter()
        .map(|pct| simulate(positions, collateral, *pct))
        .collect()
}

/// Most negative shock in `shocks` the account survives, see
/// [`SimulationResult::is_tolerated`]. `None` when no candidate is tolerated.
pub fn worst_tolerated_shock(positions: &[Position], collateral: Quote, shocks: &[Decimal]) -> Option<Decimal> {
    shocks
        .iter()
        .filter(|pct| {
            simulate(positions, collateral, **pct)
                .projected()
                .is_some_and(SimulationResult::is_tolerated)
        })
        .min()
        .copied()
}

impl Portfolio {
    pub fn simulate(&self, percent_change: Decimal) -> SimulationOutcome {
        simulate(&self.positions, self.collateral, percent_change)
    }
}

fn project(shocked: &[Position], collateral: Quote, percent_change: Decimal) -> SimulationResult {
    let total_pnl = total_unrealized_pnl(shocked);
    let used_margin = total_used_margin(shocked);
    let account_value = collateral.add(total_pnl);
    let utilization = utilization(used_margin, account_value);

    SimulationResult {
        percent_change,
        total_pnl,
        account_value,
        used_margin,
        available_margin: available_margin(account_value, used_margin),
        utilization,
        risk: assess_risk(utilization),
    }
}
