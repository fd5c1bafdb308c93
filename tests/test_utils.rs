#![allow(dead_code)] // Each test binary uses a different subset

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use vega_pnl::{ExpiryKey, Grid, VegaGridCollection};

/// Directory holding the vega grid fixtures
pub const DATA_DIR: &str = "tests/data";

/// Scenario label -> fixture file name
const FIXTURE_FILES: [(&str, &str); 3] = [
    ("atm", "SPX_atm.csv"),
    ("up_25", "SPX_up_25.csv"),
    ("down_25", "SPX_down_25.csv"),
];

/// Valuation date the fixtures were exported on
pub fn fixture_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
}

/// Load one vega grid CSV export.
///
/// The first column holds moneyness, the header row holds expirations. A
/// `TOTAL` column and the blank-index summary row are dropped; cells that do
/// not parse as numbers become NaN.
pub fn load_vega_grid(file_path: impl AsRef<Path>) -> Result<Grid> {
    let path = file_path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let value_columns: Vec<usize> = (1..headers.len())
        .filter(|&i| headers[i].trim() != "TOTAL")
        .collect();
    let expiries: Vec<ExpiryKey> = value_columns
        .iter()
        .map(|&i| ExpiryKey::parse(&headers[i]))
        .collect();

    let mut moneyness = Vec::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let index = record.get(0).unwrap_or("").trim();
        if index.is_empty() {
            continue;
        }
        moneyness.push(
            index
                .parse::<f64>()
                .map_err(|e| anyhow!("Bad moneyness '{}' in {}: {}", index, path.display(), e))?,
        );
        rows.push(
            value_columns
                .iter()
                .map(|&i| {
                    record
                        .get(i)
                        .and_then(|v| v.trim().parse::<f64>().ok())
                        .unwrap_or(f64::NAN)
                })
                .collect(),
        );
    }

    Ok(Grid::from_rows(moneyness, expiries, rows)?)
}

/// Load every fixture grid present in `data_dir`, keyed by scenario.
pub fn load_vega_grids(data_dir: impl AsRef<Path>) -> Result<VegaGridCollection> {
    let dir = data_dir.as_ref();
    let mut grids = VegaGridCollection::new();
    for (scenario, file) in FIXTURE_FILES {
        let path = dir.join(file);
        if path.exists() {
            grids.insert(scenario, load_vega_grid(&path)?);
        }
    }
    Ok(grids)
}

/// Fixture collection restricted to the given scenarios.
pub fn fixture_grids(scenarios: &[&str]) -> VegaGridCollection {
    let all = load_vega_grids(DATA_DIR).expect("Failed to load fixtures");
    all.iter()
        .filter(|(scenario, _)| scenarios.contains(scenario))
        .map(|(scenario, grid)| (scenario, grid.clone()))
        .collect()
}

/// 2×2 grid (0.9, 1.0) × (30d, 60d after `reference`) of constant `value`.
pub fn constant_grid(reference: NaiveDate, value: f64) -> Grid {
    Grid::filled(
        vec![0.9, 1.0],
        vec![
            ExpiryKey::Date(reference + chrono::Days::new(30)),
            ExpiryKey::Date(reference + chrono::Days::new(60)),
        ],
        value,
    )
    .unwrap()
}

/// Install a test subscriber so `RUST_LOG=vega_pnl=debug` shows engine logs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
