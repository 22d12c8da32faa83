// xmargin-core: cross-margin portfolio engine.
// one collateral pool, many leveraged positions. computes pnl, margin, liquidation
// levels, utilization, risk, hedging benefit and what-if shocks.
// every calculation is a pure function of its inputs with no I/O.
//
// file map:
//   1.x  types.rs: primitives: Asset, Side, SignedSize, Price, Quote, Leverage
//   2.x  record.rs: raw account-store records -> validated positions
//   3.x  margin.rs: required margin, utilization, available margin
//   4.x  position.rs: position struct, pnl, notional, shocks
//   5.x  hedging.rs: exposure netting and hedging benefit
//   6.x  liquidation.rs: cross and isolated liquidation prices
//   6.3  risk.rs: Low/Medium/High classification
//   7.x  config.rs: alert thresholds, margin mode, stress ladder, presets
//   8.x  portfolio.rs: account snapshot, stats, per-position reports
//   8.1  simulation.rs: what-if price shocks
//   9.x  price_feed.rs: price book, applying marks (collaborator seam)
//   10.x alerts.rs: edge-triggered utilization alerts

// core valuation modules
pub mod hedging;
pub mod liquidation;
pub mod margin;
pub mod portfolio;
pub mod position;
pub mod types;

// scenario and monitoring modules
pub mod alerts;
pub mod risk;
pub mod simulation;

// integration modules
pub mod config;
pub mod price_feed;
pub mod record;

// re exports for convenience
pub use alerts::*;
pub use hedging::*;
pub use liquidation::*;
pub use margin::*;
pub use portfolio::*;
pub use position::*;
pub use risk::*;
pub use simulation::*;
pub use types::*;
pub use config::{ConfigError, EngineConfig, Environment};
pub use price_feed::{apply_prices, PriceBook, PriceSource, PriceUpdate, StaticPriceSource};
pub use record::{normalize_records, validate_records, PositionRecord};
