// 5.0: cross-margin hedging benefit. how much gross exposure nets away when
// offsetting positions share one collateral pool.
//
// netting happens at two levels:
//   - inside an asset: longs and shorts on the same asset cancel in the signed sum
//   - across assets: net exposure sums the per-asset figures before taking abs
// the gap between gross (sum of |per-asset|) and net (|sum|) is the benefit.

use crate::position::Position;
use crate::types::{Asset, Quote};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgingReport {
    /// sum of |exposure| per asset
    pub total_exposure: Quote,
    /// |sum of signed exposure| over all assets
    pub net_exposure: Quote,
    pub hedging_benefit: Quote,
    /// benefit as % of total exposure, 2dp
    pub benefit_percent: Decimal,
    pub exposure_by_asset: BTreeMap<Asset, Quote>,
}

// 5.1: signed size * current price, grouped by asset
pub fn exposure_by_asset(positions: &[Position]) -> BTreeMap<Asset, Quote> {
    let mut by_asset: BTreeMap<Asset, Quote> = BTreeMap::new();
    for position in positions {
        let entry = by_asset.entry(position.asset.clone()).or_insert_with(Quote::zero);
        *entry = entry.add(position.signed_exposure());
    }
    by_asset
}

pub fn calculate_hedging_benefit(positions: &[Position]) -> HedgingReport {
    let exposure_by_asset = exposure_by_asset(positions);

    let total_exposure: Quote = exposure_by_asset.values().map(Quote::abs).sum();
    let net_exposure = exposure_by_asset.values().sum::<Quote>().abs();
    let hedging_benefit = total_exposure.sub(net_exposure);

    let benefit_percent = if total_exposure.is_zero() {
        Decimal::ZERO
    } else {
        (hedging_benefit.value() / total_exposure.value() * dec!(100))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    HedgingReport {
        total_exposure,
        net_exposure,
        hedging_benefit,
        benefit_percent,
        exposure_by_asset,
    }
}
