//! Cross-margin engine simulation.
//!
//! Walks a demo account through the dashboard numbers, a what-if ladder,
//! hedging benefit and utilization alerts.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xmargin_core::*;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xmargin_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("Cross-Margin Portfolio Engine Simulation");
    println!("Shared collateral, multi-asset, pure calculations\n");

    let config = EngineConfig::default();
    if let Err(err) = config.validate() {
        eprintln!("invalid config: {err}");
        std::process::exit(1);
    }

    let portfolio = demo_portfolio();

    scenario_1_dashboard(&portfolio, &config);
    scenario_2_market_update(&portfolio);
    scenario_3_what_if(&portfolio, &config);
    scenario_4_hedging(&portfolio);
    scenario_5_alerts(&portfolio, &config);
    scenario_6_bad_records();

    println!("\nAll simulations completed successfully.");
}

fn demo_portfolio() -> Portfolio {
    let records = [
        PositionRecord {
            asset: Some("BTC".into()),
            exchange: Some("Reya Perps".into()),
            direction: Some("Long".into()),
            size: Some(dec!(0.5)),
            leverage: Some(dec!(10)),
            entry_price: Some(dec!(43000)),
            current_price: Some(dec!(44500)),
            ..Default::default()
        },
        PositionRecord {
            asset: Some("ETH".into()),
            exchange: Some("Reya Options".into()),
            direction: Some("Short".into()),
            size: Some(dec!(2)),
            leverage: Some(dec!(5)),
            entry_price: Some(dec!(2300)),
            current_price: Some(dec!(2250)),
            ..Default::default()
        },
    ];

    Portfolio::new(Quote::new(dec!(50000)), normalize_records(&records))
}

/// Account overview and per-position rows.
fn scenario_1_dashboard(portfolio: &Portfolio, config: &EngineConfig) {
    println!("Scenario 1: Dashboard\n");

    print_stats(&portfolio.stats());

    for report in portfolio.position_reports(config.margin_mode) {
        let side = report.side.map(|s| s.to_string()).unwrap_or_else(|| "Flat".into());
        let liq = match (report.liquidatable, report.liquidation_price) {
            (true, _) => "LIQUIDATABLE".to_string(),
            (false, Some(p)) => format!("${}", p.value().round_dp(2)),
            (false, None) => "n/a".to_string(),
        };
        println!(
            "    {} {} on {}: pnl ${}, margin ${}, liq {}",
            side, report.asset, report.venue, report.pnl, report.required_margin, liq
        );
    }
    println!();
}

/// Fresh marks from a price source.
fn scenario_2_market_update(portfolio: &Portfolio) {
    println!("Scenario 2: Market Update\n");

    let source = StaticPriceSource::new()
        .with_price("BTC", dec!(46500), Timestamp::now())
        .with_price("ETH", dec!(2400), Timestamp::now());

    let mut book = PriceBook::new();
    let accepted = book.refresh_from(&source);
    println!("  Applied {} price updates", accepted);

    print_stats(&portfolio.with_prices(&book).stats());
    println!();
}

/// Uniform shocks across the whole book.
fn scenario_3_what_if(portfolio: &Portfolio, config: &EngineConfig) {
    println!("Scenario 3: What-If Ladder\n");

    for outcome in stress_ladder(&portfolio.positions, portfolio.collateral, &config.stress_shocks) {
        match outcome {
            SimulationOutcome::Projected(r) => println!(
                "  {:>4}%: pnl ${}, value ${}, util {}%, risk {}",
                r.percent_change,
                r.total_pnl.value().round_dp(2),
                r.account_value.value().round_dp(2),
                r.utilization.round_dp(1),
                r.risk.level
            ),
            SimulationOutcome::NoPositions => println!("  No positions to simulate"),
        }
    }

    let empty = Portfolio::empty(portfolio.collateral);
    if empty.simulate(dec!(-10)) == SimulationOutcome::NoPositions {
        println!("  Empty account: nothing to simulate");
    }
    println!();
}

/// Gross vs net exposure.
fn scenario_4_hedging(portfolio: &Portfolio) {
    println!("Scenario 4: Hedging Benefit\n");

    let report = portfolio.hedging();
    for (asset, exposure) in &report.exposure_by_asset {
        println!("  {} exposure: ${}", asset, exposure);
    }
    println!("  Gross ${}, net ${}", report.total_exposure, report.net_exposure);
    println!("  Benefit ${} ({}%)\n", report.hedging_benefit, report.benefit_percent);
}

/// Utilization drifts up as BTC sells off.
fn scenario_5_alerts(portfolio: &Portfolio, config: &EngineConfig) {
    println!("Scenario 5: Utilization Alerts\n");

    let mut monitor = AlertMonitor::new(config.alerts.clone());
    // thin the collateral so the selloff matters
    let thin = portfolio.with_collateral(Quote::new(dec!(4000)));

    let mut clock = 0i64;
    for shock in [dec!(0), dec!(-2), dec!(-4), dec!(-6), dec!(-8)] {
        clock += 90_000;
        let Some(r) = thin.simulate(shock).projected().cloned() else {
            continue;
        };
        let fired = monitor.observe(r.utilization, r.available_margin, Timestamp::from_millis(clock));
        match fired {
            Some(alert) => println!("  {:>3}%: {} | {}", shock, alert.title, alert.message),
            None => println!("  {:>3}%: util {}%, no alert", shock, r.utilization.round_dp(1)),
        }
    }
    println!();
}

/// Strict vs lenient record handling.
fn scenario_6_bad_records() {
    println!("Scenario 6: Record Validation\n");

    let partial = PositionRecord {
        market: Some("SOL-PERP".into()),
        size: Some(dec!(10)),
        leverage: Some(Decimal::ZERO),
        ..Default::default()
    };

    match partial.validate() {
        Ok(_) => println!("  unexpectedly valid"),
        Err(err) => println!("  strict: rejected ({err})"),
    }

    let lenient = partial.normalize();
    println!(
        "  lenient: {} size {} at {} -> pnl ${}, margin ${}",
        lenient.asset,
        lenient.size,
        lenient.leverage,
        lenient.unrealized_pnl(),
        lenient.required_margin()
    );
}

fn print_stats(stats: &PortfolioStats) {
    println!("  Positions: {}", stats.position_count);
    println!("  Unrealized PnL: ${}", stats.total_pnl);
    println!("  Account value: ${}", stats.account_value);
    println!("  Used margin: ${}", stats.used_margin);
    println!("  Available margin: ${}", stats.available_margin);
    println!(
        "  Utilization: {}% ({} displayed), risk {} - {}",
        stats.utilization.round_dp(2),
        display_utilization(stats.utilization).round_dp(2),
        stats.risk.level,
        stats.risk.message
    );
}
