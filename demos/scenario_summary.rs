//! Scenario P&L summary for a synthetic SPX-style vega book.
//!
//! ```text
//! cargo run --example scenario_summary [config.toml]
//! RUST_LOG=vega_pnl=debug cargo run --example scenario_summary
//! ```

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vega_pnl::{
    create_pnl_engine, EngineConfig, ExpiryKey, Grid, VegaGrid, VegaGridCollection,
};

const MONEYNESS: [f64; 7] = [0.85, 0.9, 0.95, 1.0, 1.05, 1.1, 1.15];
const TENORS_DAYS: [u64; 4] = [9, 30, 65, 155];

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Vega peaking at the money and growing with sqrt(tenor); `shift` moves the
/// peak to mimic the book after a spot move.
fn synthetic_grid(reference: NaiveDate, shift: f64) -> Result<VegaGrid> {
    let expiries: Vec<ExpiryKey> = TENORS_DAYS
        .iter()
        .map(|&d| ExpiryKey::Date(reference + Days::new(d)))
        .collect();
    let rows = MONEYNESS
        .iter()
        .map(|&m| {
            TENORS_DAYS
                .iter()
                .map(|&d| {
                    let width = 0.05 * (d as f64 / 30.0).sqrt();
                    let z = (m - 1.0 - shift) / width;
                    25_000.0 * (d as f64 / 30.0).sqrt() * (-0.5 * z * z).exp()
                })
                .collect()
        })
        .collect();
    Ok(Grid::from_rows(MONEYNESS.to_vec(), expiries, rows)?)
}

fn main() -> Result<()> {
    init_tracing("info");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path))?;
            EngineConfig::from_toml_str(&source)?
        }
        None => EngineConfig::default(),
    };
    let reference = config
        .reference_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut grids = VegaGridCollection::new();
    for (label, change) in config.scenarios.iter() {
        if change.abs() <= 0.05 {
            grids.insert(label, synthetic_grid(reference, -change)?);
        }
    }

    let engine = create_pnl_engine(grids, Some(config.scenarios.clone()), Some(reference))?;
    let summary = engine.get_scenario_summary(&config.params, config.current_spot);

    println!(
        "Book vega: {:.0} $/vol  |  spot {:.2}  |  as of {}",
        engine.atm_grid().sum(),
        config.current_spot,
        reference
    );
    println!(
        "{:>8} {:>14} {:>14} {:>14} {:>14}",
        "Move", "Vega P&L", "Vanna P&L", "Volga P&L", "Total"
    );
    for row in &summary {
        println!(
            "{:>8} {:>14.0} {:>14.0} {:>14.0} {:>14.0}",
            config.scenarios.display_label(&row.scenario),
            row.vega_pnl,
            row.vanna_pnl,
            row.volga_pnl,
            row.total_pnl
        );
    }

    let worst = summary
        .iter()
        .min_by(|a, b| a.total_pnl.total_cmp(&b.total_pnl))
        .context("No scenarios configured")?;
    println!(
        "\nWorst scenario: {} ({:.0})",
        config.scenarios.display_label(&worst.scenario),
        worst.total_pnl
    );

    Ok(())
}
