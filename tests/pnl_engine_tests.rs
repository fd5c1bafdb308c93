mod test_utils;

use approx::assert_relative_eq;
use chrono::NaiveDate;
use vega_pnl::{
    create_pnl_engine, default_configs, scenario_pnl, scenario_summary, EngineConfig, ExpiryKey,
    Grid, ModelParameters, PnlEngine, PnlError, ScenarioSet, VegaGridCollection,
};

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn constant_book() -> VegaGridCollection {
    [("atm", test_utils::constant_grid(reference_date(), 1000.0))]
        .into_iter()
        .collect()
}

fn fixture_engine() -> PnlEngine {
    let grids = test_utils::load_vega_grids(test_utils::DATA_DIR).unwrap();
    PnlEngine::new(
        grids,
        ScenarioSet::default(),
        test_utils::fixture_reference_date(),
    )
    .unwrap()
}

#[test]
fn test_end_to_end_down_25() {
    test_utils::init_tracing();
    let engine = create_pnl_engine(constant_book(), None, Some(reference_date())).unwrap();
    let result = engine.calculate_pnl("down_25", &ModelParameters::default(), 100.0);

    assert_eq!(result.scenario, "down_25");
    assert_eq!(result.spot_change, -0.025);

    let day_30 = ExpiryKey::Date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    let atm_iv = result.iv_change_grid.value_at(1.0, &day_30).unwrap();
    let put_iv = result.iv_change_grid.value_at(0.9, &day_30).unwrap();
    assert_relative_eq!(atm_iv, 7.5, epsilon = 1e-12);
    assert!(put_iv.abs() > atm_iv.abs());

    // Vega P&L at the ATM 30-day cell: 1000 * 7.5
    assert_relative_eq!(
        result.vega_pnl_grid.value_at(1.0, &day_30).unwrap(),
        7500.0,
        epsilon = 1e-9
    );

    // Only the ATM grid exists, so vanna and its P&L are zero
    assert!(result.vanna_pnl_grid.values().iter().all(|&v| v == 0.0));
    assert_eq!(result.vanna_pnl, 0.0);

    // Volga P&L: 0.5 * (1000 * 0.01 * 0.5) * iv^2 at moneyness 0.9
    assert_relative_eq!(
        result.volga_pnl_grid.value_at(0.9, &day_30).unwrap(),
        0.5 * 5.0 * put_iv * put_iv,
        epsilon = 1e-9
    );
    assert_eq!(result.volga_pnl_grid.value_at(1.0, &day_30), Some(0.0));

    assert_relative_eq!(
        result.total_pnl,
        result.vega_pnl + result.vanna_pnl + result.volga_pnl,
        epsilon = 1e-9
    );
    assert!(result.total_pnl > 0.0);
}

#[test]
fn test_atm_scenario_has_zero_pnl() {
    let engine = fixture_engine();
    for params in [
        default_configs::default_params(),
        default_configs::crash_regime(),
        default_configs::flat_surface(),
    ] {
        let result = engine.calculate_pnl("atm", &params, 5800.0);
        assert_eq!(result.total_pnl, 0.0);
        assert_eq!(result.vega_pnl, 0.0);
        assert_eq!(result.vanna_pnl, 0.0);
        assert_eq!(result.volga_pnl, 0.0);
    }
}

#[test]
fn test_summary_sorted_by_spot_change() {
    let engine = fixture_engine();
    let summary = engine.get_scenario_summary(&ModelParameters::default(), 100.0);

    let labels: Vec<&str> = summary.iter().map(|row| row.scenario.as_str()).collect();
    assert_eq!(
        labels,
        vec!["down_75", "down_50", "down_25", "atm", "up_25", "up_50", "up_75"]
    );
    assert!(summary
        .windows(2)
        .all(|pair| pair[0].spot_change < pair[1].spot_change));

    // Long vega book with negative beta: selloffs gain, rallies lose
    assert!(summary[0].total_pnl > 0.0);
    assert!(summary[6].total_pnl < 0.0);
}

#[test]
fn test_engine_requires_atm_grid() {
    let grids = test_utils::fixture_grids(&["up_25", "down_25"]);
    let err = PnlEngine::new(grids.clone(), ScenarioSet::default(), reference_date()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "ATM vega grid missing: no entry for key 'atm'"
    );

    let err = create_pnl_engine(grids, None, None).unwrap_err();
    assert!(matches!(err, PnlError::MissingAtmGrid { .. }));
}

#[test]
fn test_all_scenarios_cover_every_label() {
    let engine = fixture_engine();
    let results = engine.calculate_all_scenarios(&ModelParameters::default(), 100.0);

    assert_eq!(results.len(), 7);
    for (label, change) in ScenarioSet::default().iter() {
        let result = &results[label];
        assert_eq!(result.scenario, label);
        assert_eq!(result.spot_change, change);
    }
}

#[test]
fn test_scenario_without_grid_uses_atm_vega() {
    let engine = fixture_engine();
    let result = engine.calculate_pnl("down_75", &ModelParameters::default(), 100.0);

    let expected = engine.atm_grid() * &result.iv_change_grid;
    assert_eq!(result.vega_pnl_grid, expected);

    // down_25 has its own grid
    let result = engine.calculate_pnl("down_25", &ModelParameters::default(), 100.0);
    let own = engine.vega_grids().get("down_25").unwrap();
    assert_eq!(result.vega_pnl_grid, own * &result.iv_change_grid);
}

#[test]
fn test_vanna_pnl_uses_scenario_spot_move() {
    let engine = fixture_engine();
    let params = ModelParameters::default();
    let result = engine.calculate_pnl("up_50", &params, 100.0);

    // Central difference over up_25/down_25: (1000 - 1450) / 10 at 0.90, first column
    let vanna = -45.0;
    let iv = result.iv_change_grid.get(0, 0).unwrap();
    assert_relative_eq!(
        result.vanna_pnl_grid.get(0, 0).unwrap(),
        vanna * (0.05 * 100.0) * iv,
        epsilon = 1e-9
    );
}

#[test]
fn test_breakdown_tables_reconcile() {
    let engine = fixture_engine();
    let result = engine.calculate_pnl("down_50", &default_configs::crash_regime(), 100.0);

    assert_eq!(result.pnl_by_expiry.len(), 3);
    assert_eq!(result.pnl_by_moneyness.len(), 5);
    assert_eq!(result.pnl_by_moneyness[0].key, 0.90);
    assert_eq!(result.pnl_by_expiry[2].key, ExpiryKey::parse("2025-03-21"));

    let expiry_total: f64 = result.pnl_by_expiry.iter().map(|row| row.total_pnl).sum();
    let moneyness_vega: f64 = result.pnl_by_moneyness.iter().map(|row| row.vega_pnl).sum();
    assert_relative_eq!(expiry_total, result.total_pnl, max_relative = 1e-12);
    assert_relative_eq!(moneyness_vega, result.vega_pnl, max_relative = 1e-12);

    for row in &result.pnl_by_expiry {
        assert_relative_eq!(
            row.total_pnl,
            row.vega_pnl + row.vanna_pnl + row.volga_pnl,
            max_relative = 1e-12
        );
    }
}

#[test]
fn test_unknown_scenario_is_flat() {
    let engine = fixture_engine();
    let result = engine.calculate_pnl("sideways", &ModelParameters::default(), 100.0);
    assert_eq!(result.spot_change, 0.0);
    assert_eq!(result.total_pnl, 0.0);
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = fixture_engine();
    let params = [
        default_configs::default_params(),
        default_configs::crash_regime(),
    ];

    let shared = &engine;
    let totals: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = params
            .iter()
            .map(|p| scope.spawn(move || shared.calculate_pnl("down_25", p, 100.0).total_pnl))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(totals[0], engine.calculate_pnl("down_25", &params[0], 100.0).total_pnl);
    assert_eq!(totals[1], engine.calculate_pnl("down_25", &params[1], 100.0).total_pnl);
    assert!(totals[1] > totals[0]);
}

#[test]
fn test_scenario_summary_from_toml_config() {
    let grids = test_utils::load_vega_grids(test_utils::DATA_DIR).unwrap();
    let config = EngineConfig::from_toml_str(
        r#"
        current_spot = 100.0
        reference_date = "2025-01-02"

        [params]
        spot_vol_beta = -4.0

        [[scenarios]]
        label = "up_25"
        spot_change = 0.025

        [[scenarios]]
        label = "atm"
        spot_change = 0.0

        [[scenarios]]
        label = "down_25"
        spot_change = -0.025
        "#,
    )
    .unwrap();

    let rows = scenario_summary(grids.clone(), &config).unwrap();
    let labels: Vec<&str> = rows.iter().map(|row| row.scenario.as_str()).collect();
    assert_eq!(labels, vec!["down_25", "atm", "up_25"]);

    let down = scenario_pnl(grids, "down_25", &config).unwrap();
    assert_eq!(down.total_pnl, rows[0].total_pnl);
}

#[test]
fn test_scenario_summary_reports_missing_atm() {
    let grids = test_utils::fixture_grids(&["up_25"]);
    let err = scenario_summary(grids, &EngineConfig::default()).unwrap_err();
    assert!(err.to_string().contains("ATM vega grid missing"));
}

#[test]
fn test_misaligned_scenario_grid_propagates_nan() {
    let day_30 = ExpiryKey::Date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
    let atm = Grid::from_rows(
        vec![0.9, 1.0],
        vec![day_30.clone()],
        vec![vec![1000.0], vec![1000.0]],
    )
    .unwrap();
    // down_25 has no row at moneyness 1.0
    let down = Grid::from_rows(vec![0.9], vec![day_30.clone()], vec![vec![1000.0]]).unwrap();
    let grids: VegaGridCollection = [("atm", atm.clone()), ("down_25", down)]
        .into_iter()
        .collect();

    let engine = PnlEngine::new(grids, ScenarioSet::default(), reference_date()).unwrap();
    let result = engine.calculate_pnl("down_25", &ModelParameters::default(), 100.0);

    assert!(result.vega_pnl.is_nan());
    assert!(result.total_pnl.is_nan());
    assert!(result.vega_pnl_grid.value_at(1.0, &day_30).unwrap().is_nan());
    assert!(!result.vega_pnl_grid.value_at(0.9, &day_30).unwrap().is_nan());

    for grid in [
        &result.vega_pnl_grid,
        &result.vanna_pnl_grid,
        &result.volga_pnl_grid,
        &result.total_pnl_grid,
        &result.iv_change_grid,
    ] {
        assert!(grid.same_axes(&atm));
    }
    assert_eq!(result.pnl_by_moneyness.len(), 2);
}

#[test]
fn test_all_scenarios_match_single_scenario_runs() {
    // No symmetric pair: vanna comes from the one-sided fallback
    let grids = test_utils::fixture_grids(&["atm", "up_25"]);
    let engine = PnlEngine::new(
        grids,
        ScenarioSet::default(),
        test_utils::fixture_reference_date(),
    )
    .unwrap();
    let params = default_configs::crash_regime();

    let results = engine.calculate_all_scenarios(&params, 100.0);
    for label in engine.spot_scenarios().labels() {
        assert_eq!(results[label], engine.calculate_pnl(label, &params, 100.0));
    }
}

#[test]
fn test_summary_ties_keep_scenario_order() {
    let scenarios = ScenarioSet::from_pairs([
        ("atm", 0.0),
        ("zeta", -0.025),
        ("alpha", -0.025),
        ("mid", 0.0),
    ]);
    let engine = PnlEngine::new(constant_book(), scenarios, reference_date()).unwrap();
    let summary = engine.get_scenario_summary(&ModelParameters::default(), 100.0);

    let labels: Vec<&str> = summary.iter().map(|row| row.scenario.as_str()).collect();
    assert_eq!(labels, vec!["zeta", "alpha", "atm", "mid"]);
}
