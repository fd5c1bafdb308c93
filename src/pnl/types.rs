//! Result records produced by the P&L engine.

use serde::{Deserialize, Serialize};

use crate::grid::{ExpiryKey, Grid};

/// The four P&L components aggregated under one key (an expiry or a
/// moneyness level).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlBreakdown<K> {
    pub key: K,
    pub vega_pnl: f64,
    pub vanna_pnl: f64,
    pub volga_pnl: f64,
    pub total_pnl: f64,
}

/// P&L attribution of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlResult {
    /// Scenario label the result was computed for
    pub scenario: String,
    /// Spot change used (0 when the label was unknown)
    pub spot_change: f64,

    pub vega_pnl: f64,
    pub vanna_pnl: f64,
    pub volga_pnl: f64,
    pub total_pnl: f64,

    pub vega_pnl_grid: Grid,
    pub vanna_pnl_grid: Grid,
    pub volga_pnl_grid: Grid,
    pub total_pnl_grid: Grid,
    /// IV change (vol points) per cell
    pub iv_change_grid: Grid,

    /// Component totals per expiry column
    pub pnl_by_expiry: Vec<PnlBreakdown<ExpiryKey>>,
    /// Component totals per moneyness row
    pub pnl_by_moneyness: Vec<PnlBreakdown<f64>>,
}

impl PnlResult {
    /// Headline numbers of this result.
    pub fn summary_row(&self) -> ScenarioSummaryRow {
        ScenarioSummaryRow {
            scenario: self.scenario.clone(),
            spot_change: self.spot_change,
            vega_pnl: self.vega_pnl,
            vanna_pnl: self.vanna_pnl,
            volga_pnl: self.volga_pnl,
            total_pnl: self.total_pnl,
        }
    }
}

/// One row of the cross-scenario summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummaryRow {
    pub scenario: String,
    pub spot_change: f64,
    pub vega_pnl: f64,
    pub vanna_pnl: f64,
    pub volga_pnl: f64,
    pub total_pnl: f64,
}

/// Zip per-key component totals into breakdown rows.
///
/// All four inputs must list the same keys in the same order.
pub(crate) fn breakdown<K>(
    vega: Vec<(K, f64)>,
    vanna: Vec<(K, f64)>,
    volga: Vec<(K, f64)>,
    total: Vec<(K, f64)>,
) -> Vec<PnlBreakdown<K>> {
    vega.into_iter()
        .zip(vanna)
        .zip(volga)
        .zip(total)
        .map(|((((key, vega_pnl), (_, vanna_pnl)), (_, volga_pnl)), (_, total_pnl))| {
            PnlBreakdown {
                key,
                vega_pnl,
                vanna_pnl,
                volga_pnl,
                total_pnl,
            }
        })
        .collect()
}
