//! Account-level scenario tests.
//!
//! Known accounts walked end to end through the public API: records in,
//! dashboard numbers, what-if projections and alerts out.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use xmargin_core::*;

fn btc_long() -> Position {
    Position::new(
        Asset::new("BTC"),
        "Reya Perps",
        SignedSize::from_side(Side::Long, dec!(0.5)),
        Leverage::new(dec!(10)).unwrap(),
        Price::new_unchecked(dec!(45000)),
    )
    .with_current_price(Price::new_unchecked(dec!(46500)))
}

fn btc_account() -> Portfolio {
    Portfolio::new(Quote::new(dec!(10000)), vec![btc_long()])
}

fn book_at(price: Decimal, ms: i64) -> PriceBook {
    let mut book = PriceBook::new();
    book.apply(&PriceUpdate::new(Asset::new("BTC"), price, Timestamp::from_millis(ms)));
    book
}

#[test]
fn btc_dashboard_numbers() {
    let stats = btc_account().stats();

    assert_eq!(stats.total_pnl.value(), dec!(750));
    assert_eq!(stats.used_margin.value(), dec!(2325));
    assert_eq!(stats.account_value.value(), dec!(10750));
    assert_eq!(stats.available_margin.value(), dec!(8425));
    assert_eq!(stats.utilization.round_dp(2), dec!(21.63));
    assert_eq!(stats.risk.level, RiskLevel::Low);
    assert_eq!(stats.position_count, 1);
}

#[test]
fn btc_minus_ten_matches_direct_computation() {
    let account = btc_account();
    let outcome = account.simulate(dec!(-10));
    let sim = outcome.projected().unwrap();

    let shocked = btc_long().shocked(dec!(-10));
    assert_eq!(shocked.current_price.value(), dec!(41850));

    assert_eq!(sim.total_pnl.value(), dec!(-1575));
    assert_eq!(sim.account_value.value(), dec!(8425));
    assert_eq!(sim.used_margin.value(), dec!(2092.5));
    assert_eq!(sim.available_margin.value(), dec!(6332.5));
    assert_eq!(sim.risk.level, RiskLevel::Low);

    // same numbers as marking the account at 41850 directly
    let direct = account.with_prices(&book_at(dec!(41850), 0)).stats();
    assert_eq!(direct.total_pnl, sim.total_pnl);
    assert_eq!(direct.account_value, sim.account_value);
    assert_eq!(direct.utilization, sim.utilization);

    // input untouched
    assert_eq!(account.positions[0].current_price.value(), dec!(46500));
}

#[test]
fn btc_liquidation_report() {
    let account = btc_account();
    let reports = account.position_reports(MarginMode::Cross);
    assert_eq!(reports.len(), 1);

    // buffer 10000 - 2325 = 7675, move 7675 * 0.97 / 0.5 = 14889.5
    let report = &reports[0];
    assert_eq!(report.side, Some(Side::Long));
    assert_eq!(report.liquidation_price.map(|p| p.value()), Some(dec!(30110.5)));
    assert_eq!(account.liquidation_price(&account.positions[0]).value(), dec!(30110.5));
    assert!(report.liquidation_distance.unwrap() > dec!(35));
}

#[test]
fn empty_account_has_nothing_to_simulate() {
    let account = Portfolio::empty(Quote::new(dec!(5000)));
    let stats = account.stats();

    assert!(stats.is_empty());
    assert_eq!(stats.account_value.value(), dec!(5000));
    assert_eq!(stats.utilization, Decimal::ZERO);
    assert_eq!(stats.risk.level, RiskLevel::Low);
    assert_eq!(account.simulate(dec!(-50)), SimulationOutcome::NoPositions);
}

#[test]
fn underwater_account_reports_zero_utilization() {
    // value goes negative: utilization is guarded to 0 and risk reads Low
    let account = btc_account()
        .with_collateral(Quote::new(dec!(100)))
        .with_prices(&book_at(dec!(40000), 0));
    let stats = account.stats();

    assert!(stats.account_value.is_negative());
    assert_eq!(stats.utilization, Decimal::ZERO);
    assert!(stats.available_margin.is_zero());
    assert_eq!(stats.risk.level, RiskLevel::Low);
}

#[test]
fn hedged_book_from_json_records() {
    let json = r#"[
        {"asset": "BTC", "exchange": "Reya Perps", "type": "Long", "size": 1, "leverage": 10, "entryPrice": 50000, "currentPrice": 50000},
        {"asset": "BTC", "exchange": "Reya Options", "type": "Short", "size": 0.5, "leverage": 5, "entryPrice": 50000, "currentPrice": 50000},
        {"market": "ETH-PERP", "venue": "Reya Perps", "size": -10, "leverage": 5, "entry_price": 2500, "current_price": 2500}
    ]"#;
    let records: Vec<PositionRecord> = serde_json::from_str(json).unwrap();
    let positions = validate_records(&records).unwrap();

    assert_eq!(positions.len(), 3);
    assert_eq!(positions[1].side(), Some(Side::Short));
    assert_eq!(positions[2].asset, Asset::new("ETH"));
    assert_eq!(positions[2].size.value(), dec!(-10));

    // BTC nets to +25000, ETH is -25000: gross 50000, net 0
    let report = Portfolio::new(Quote::new(dec!(20000)), positions).hedging();
    assert_eq!(report.exposure_by_asset[&Asset::new("BTC")].value(), dec!(25000));
    assert_eq!(report.total_exposure.value(), dec!(50000));
    assert!(report.net_exposure.is_zero());
    assert_eq!(report.benefit_percent, dec!(100));
}

#[test]
fn strict_and_lenient_disagree_on_partial_records() {
    let json = r#"{"market": "SOL-PERP", "type": "Long", "size": 10, "leverage": 0}"#;
    let record: PositionRecord = serde_json::from_str(json).unwrap();

    assert!(record.validate().is_err());
    assert_eq!(validate_records(std::slice::from_ref(&record)).unwrap_err().0, 0);

    let position = record.normalize();
    assert_eq!(position.asset, Asset::new("SOL"));
    assert_eq!(position.leverage, Leverage::ONE);
    assert!(position.unrealized_pnl().is_zero());
    assert!(position.required_margin().is_zero());
}

#[test]
fn alerts_follow_a_selloff() {
    // thin collateral: util = 5P / (0.5P - 19500) * 100 at BTC price P
    let account = btc_account().with_collateral(Quote::new(dec!(3000)));
    let mut monitor = AlertMonitor::new(AlertConfig::default());

    let mut observe = |price: Decimal, ms: i64| {
        let stats = account.with_prices(&book_at(price, ms)).stats();
        monitor.observe(stats.utilization, stats.available_margin, Timestamp::from_millis(ms))
    };

    // 62% seeds
    assert!(observe(dec!(46500), 0).is_none());

    // 75% exactly: warning
    let warning = observe(dec!(45000), 1_000).unwrap();
    assert_eq!(warning.severity, AlertSeverity::Warning);
    assert_eq!(warning.message, "Margin utilization reached 75.0%. Available: $750.00");

    // 96.7% inside the cooldown window: swallowed
    assert!(observe(dec!(43500), 2_000).is_none());

    // back down, then straight through both thresholds after the window
    assert!(observe(dec!(46500), 70_000).is_none());
    let critical = observe(dec!(43500), 140_000).unwrap();
    assert_eq!(critical.severity, AlertSeverity::Critical);
    assert_eq!(critical.message, "Margin utilization at 96.7%! Available: $75.00. Risk of liquidation.");
}

#[test]
fn market_update_through_price_source() {
    let source = StaticPriceSource::new()
        .with_price("BTC", dec!(46500), Timestamp::from_millis(10))
        .with_price("ETH", dec!(-1), Timestamp::from_millis(10));

    let mut book = PriceBook::new();
    assert_eq!(book.refresh_from(&source), 1);

    let marked = Portfolio::new(
        Quote::new(dec!(10000)),
        vec![btc_long().with_current_price(Price::new_unchecked(dec!(45000)))],
    )
    .with_prices(&book);

    assert_eq!(marked.stats().total_pnl.value(), dec!(750));
}

#[test]
fn isolated_reports_ignore_shared_collateral() {
    let lean = btc_account().with_collateral(Quote::new(dec!(2500)));
    let rich = btc_account().with_collateral(Quote::new(dec!(20000)));

    let lean_liq = lean.position_reports(MarginMode::Isolated)[0].liquidation_price;
    let rich_liq = rich.position_reports(MarginMode::Isolated)[0].liquidation_price;
    assert_eq!(lean_liq, rich_liq);

    let lean_cross = lean.position_reports(MarginMode::Cross)[0].liquidation_price;
    let rich_cross = rich.position_reports(MarginMode::Cross)[0].liquidation_price;
    assert!(rich_cross.unwrap() < lean_cross.unwrap());
}

#[test]
fn environment_presets_drive_the_ladder() {
    let config = Environment::Conservative.config();
    let outcomes = stress_ladder(&btc_account().positions, Quote::new(dec!(10000)), &config.stress_shocks);

    assert_eq!(outcomes.len(), config.stress_shocks.len());
    assert!(outcomes.iter().all(|o| o.projected().is_some()));
}

#[test]
fn oversized_record_never_reaches_the_math() {
    let json = r#"{"asset": "BTC", "size": "1e20", "leverage": 1, "entryPrice": "1e20"}"#;
    let record: PositionRecord = serde_json::from_str(json).unwrap();

    assert!(matches!(record.validate(), Err(PositionError::OutOfRange { .. })));

    // lenient path zeroes the bad fields and the account still aggregates
    let account = Portfolio::new(Quote::new(dec!(10000)), vec![record.normalize(), btc_long()]);
    let stats = account.stats();
    assert_eq!(stats.total_pnl.value(), dec!(750));
    assert_eq!(stats.used_margin.value(), dec!(2325));
}

#[test]
fn underwater_short_shows_as_liquidatable() {
    let short = Position::new(
        Asset::new("SOL"),
        "Reya Perps",
        SignedSize::from_side(Side::Short, dec!(1)),
        Leverage::new(dec!(10)).unwrap(),
        Price::new_unchecked(dec!(100)),
    );
    // no collateral, 1000 of margin used elsewhere: level 100 - 970 is below zero
    assert!(calculate_liquidation_price(&short, Quote::zero(), Quote::new(dec!(1000))).is_zero());
    assert!(is_liquidatable(MarginMode::Cross, &short, Quote::zero(), Quote::new(dec!(1000))));

    let report = &Portfolio::new(Quote::new(dec!(-1000)), vec![short]).position_reports(MarginMode::Cross)[0];
    assert!(report.liquidation_price.is_none());
    assert!(report.liquidatable);
}
