//! Second-order Greeks (vanna, volga) from vega grids
//!
//! Neither Greek is observed directly. Vanna (∂Vega/∂Spot) is a finite
//! difference across spot-scenario vega grids; volga (∂Vega/∂IV) is either a
//! moneyness-based proxy or, when IV changes per scenario are available, a
//! ratio of vega change to IV change.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PnlError, ATM_KEY};
use crate::grid::{Grid, VegaGrid};
use crate::scenarios::{ScenarioSet, VegaGridCollection};

/// Symmetric scenario pairs for central differences, widest first.
///
/// The third element is the full up-minus-down spot distance as a fraction.
pub const SYMMETRIC_SCENARIO_PAIRS: [(&str, &str, f64); 3] = [
    ("up_75", "down_75", 0.15),
    ("up_50", "down_50", 0.10),
    ("up_25", "down_25", 0.05),
];

/// How a vanna grid is obtained from the available vega grids.
///
/// Candidates are evaluated in declaration order; the first one whose inputs
/// are present wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VannaMethod {
    /// `(vega[up] - vega[down]) / (2 * delta_spot_pct * spot)`
    CentralDifference {
        up: String,
        down: String,
        delta_spot_pct: f64,
    },
    /// `(vega[scenario] - vega[atm]) / (spot_change * spot)`
    OneSided { scenario: String, spot_change: f64 },
    /// No usable scenario: all-zero vanna
    Zero,
}

impl VannaMethod {
    /// Pick the estimation method for the given grids and scenarios.
    pub fn select(vega_grids: &VegaGridCollection, spot_scenarios: &ScenarioSet) -> Self {
        let central = SYMMETRIC_SCENARIO_PAIRS
            .iter()
            .find(|(up, down, _)| vega_grids.contains(up) && vega_grids.contains(down))
            .map(|&(up, down, delta_spot_pct)| VannaMethod::CentralDifference {
                up: up.to_string(),
                down: down.to_string(),
                delta_spot_pct,
            });
        if let Some(method) = central {
            return method;
        }

        spot_scenarios
            .iter()
            .find(|(label, _)| *label != ATM_KEY && vega_grids.contains(label))
            .map(|(label, spot_change)| VannaMethod::OneSided {
                scenario: label.to_string(),
                spot_change,
            })
            .unwrap_or(VannaMethod::Zero)
    }
}

/// Vanna and volga estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreeksCalculator {
    /// Scaling factor of the volga proxy
    pub volga_scalar: f64,
}

impl Default for GreeksCalculator {
    fn default() -> Self {
        Self { volga_scalar: 0.5 }
    }
}

impl GreeksCalculator {
    pub fn new(volga_scalar: f64) -> Self {
        Self { volga_scalar }
    }

    /// Method [`estimate_vanna_from_grids`](Self::estimate_vanna_from_grids)
    /// would use for these inputs.
    pub fn select_vanna_method(
        &self,
        vega_grids: &VegaGridCollection,
        spot_scenarios: &ScenarioSet,
    ) -> VannaMethod {
        VannaMethod::select(vega_grids, spot_scenarios)
    }

    /// Estimate a vanna grid from vega grids across spot scenarios.
    ///
    /// Prefers a central difference over the widest available symmetric pair,
    /// then a one-sided difference against ATM, then a zero grid. Only the first
    /// usable candidate is evaluated; pairs are never averaged.
    ///
    /// # Errors
    ///
    /// [`PnlError::MissingAtmGrid`] when `vega_grids` has no `"atm"` entry.
    pub fn estimate_vanna_from_grids(
        &self,
        vega_grids: &VegaGridCollection,
        spot_scenarios: &ScenarioSet,
        current_spot: f64,
    ) -> Result<Grid, PnlError> {
        let atm = vega_grids.atm()?;
        Ok(self.vanna_with_atm(atm, vega_grids, spot_scenarios, current_spot))
    }

    /// Vanna once the ATM grid is known to exist.
    pub(crate) fn vanna_with_atm(
        &self,
        atm: &VegaGrid,
        vega_grids: &VegaGridCollection,
        spot_scenarios: &ScenarioSet,
        current_spot: f64,
    ) -> Grid {
        let method = VannaMethod::select(vega_grids, spot_scenarios);
        debug!(?method, current_spot, "estimating vanna");

        match &method {
            VannaMethod::CentralDifference {
                up,
                down,
                delta_spot_pct,
            } => match (vega_grids.get(up), vega_grids.get(down)) {
                (Some(up_grid), Some(down_grid)) => {
                    let delta_spot = delta_spot_pct * current_spot;
                    // Reindex so the result is always on the ATM axes
                    (&(up_grid - down_grid) / (2.0 * delta_spot)).reindex_like(atm)
                }
                _ => atm.zeros_like(),
            },
            VannaMethod::OneSided {
                scenario,
                spot_change,
            } => {
                warn!(
                    scenario = scenario.as_str(),
                    "no symmetric scenario pair, using one-sided vanna"
                );
                let delta_spot = spot_change * current_spot;
                match vega_grids.get(scenario) {
                    Some(grid) if delta_spot != 0.0 => {
                        (&(grid - atm) / delta_spot).reindex_like(atm)
                    }
                    _ => atm.zeros_like(),
                }
            }
            VannaMethod::Zero => {
                warn!("no non-ATM vega grid available, vanna set to zero");
                atm.zeros_like()
            }
        }
    }

    /// Volga proxy: `vega * (moneyness - 1)^2 * volga_scalar`.
    ///
    /// Volga grows quadratically with distance from ATM and vanishes at
    /// moneyness 1.
    pub fn estimate_volga(&self, vega_grid: &VegaGrid) -> Grid {
        let volga_scalar = self.volga_scalar;
        vega_grid.map_with_moneyness(|moneyness, vega| {
            let wing_factor = (moneyness - 1.0).powi(2);
            vega * wing_factor * volga_scalar
        })
    }

    /// Volga from vega changes across scenarios with known IV changes.
    ///
    /// For each non-ATM scenario present in `iv_changes`, estimates
    /// `(vega[s] - vega[atm]) / iv_change[s]`, with zero IV changes treated as
    /// NaN. Estimates are averaged cell by cell, ignoring NaN. Falls back to
    /// [`estimate_volga`](Self::estimate_volga) on the ATM grid when no
    /// scenario qualifies.
    ///
    /// # Errors
    ///
    /// [`PnlError::MissingAtmGrid`] when `vega_grids` has no `"atm"` entry.
    pub fn estimate_volga_from_grids(
        &self,
        vega_grids: &VegaGridCollection,
        iv_changes: &HashMap<String, Grid>,
    ) -> Result<Grid, PnlError> {
        let atm = vega_grids.atm()?;

        let estimates: Vec<Grid> = vega_grids
            .iter()
            .filter(|(scenario, _)| *scenario != ATM_KEY)
            .filter_map(|(scenario, grid)| {
                let iv_change = iv_changes.get(scenario)?;
                let safe_iv_change = iv_change.map(|v| if v == 0.0 { f64::NAN } else { v });
                Some(&(grid - atm) / &safe_iv_change)
            })
            .collect();

        if estimates.is_empty() {
            debug!("no scenario IV changes supplied, using volga proxy");
            return Ok(self.estimate_volga(atm));
        }

        Ok(Grid::nan_mean(&estimates, atm))
    }
}

/// Vanna and volga in one call. Volga uses the proxy on the ATM grid.
///
/// # Errors
///
/// [`PnlError::MissingAtmGrid`] when `vega_grids` has no `"atm"` entry.
pub fn calculate_greeks(
    vega_grids: &VegaGridCollection,
    spot_scenarios: &ScenarioSet,
    volga_scalar: f64,
    current_spot: f64,
) -> Result<(Grid, Grid), PnlError> {
    let calc = GreeksCalculator::new(volga_scalar);
    let vanna = calc.estimate_vanna_from_grids(vega_grids, spot_scenarios, current_spot)?;
    let volga = calc.estimate_volga(vega_grids.atm()?);
    Ok((vanna, volga))
}
