//! Scenario P&L attribution.
//!
//! For each spot scenario the engine estimates an IV-change grid, pairs it
//! with vega, vanna and volga grids and attributes P&L cell by cell:
//!
//! * vega:  `vega * ΔIV`
//! * vanna: `vanna * ΔS * ΔIV`
//! * volga: `0.5 * volga * ΔIV²`

use std::collections::BTreeMap;

use chrono::NaiveDate;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

use super::types::{breakdown, PnlBreakdown, PnlResult, ScenarioSummaryRow};
use crate::error::PnlError;
use crate::grid::{Grid, VegaGrid};
use crate::model_params::{ModelParameters, ParamRanges};
use crate::models::greeks::GreeksCalculator;
use crate::models::iv_model::IvModel;
use crate::models::traits::IvChangeModel;
use crate::scenarios::{ScenarioSet, VegaGridCollection};

/// Computes P&L for a book of vega grids under spot scenarios.
///
/// The engine holds no mutable state; every computation takes its
/// [`ModelParameters`] explicitly, so one engine can be shared across threads.
#[derive(Debug, Clone)]
pub struct PnlEngine {
    vega_grids: VegaGridCollection,
    spot_scenarios: ScenarioSet,
    reference_date: NaiveDate,
    atm_grid: VegaGrid,
}

impl PnlEngine {
    /// Build an engine.
    ///
    /// # Errors
    ///
    /// [`PnlError::MissingAtmGrid`] when `vega_grids` has no `"atm"` entry.
    pub fn new(
        vega_grids: VegaGridCollection,
        spot_scenarios: ScenarioSet,
        reference_date: NaiveDate,
    ) -> Result<Self, PnlError> {
        let atm_grid = vega_grids.atm()?.clone();
        if !spot_scenarios.has_atm_anchor() {
            warn!("scenario set has no zero-change 'atm' anchor");
        }
        debug!(
            grids = vega_grids.len(),
            scenarios = spot_scenarios.len(),
            %reference_date,
            "P&L engine ready"
        );

        Ok(Self {
            vega_grids,
            spot_scenarios,
            reference_date,
            atm_grid,
        })
    }

    pub fn vega_grids(&self) -> &VegaGridCollection {
        &self.vega_grids
    }

    pub fn spot_scenarios(&self) -> &ScenarioSet {
        &self.spot_scenarios
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// The ATM vega grid. Its axes define the IV-change grid.
    pub fn atm_grid(&self) -> &VegaGrid {
        &self.atm_grid
    }

    /// Full P&L breakdown of one scenario.
    ///
    /// An unknown scenario label is treated as a zero spot change, and a
    /// scenario without its own vega grid uses the ATM grid.
    pub fn calculate_pnl(
        &self,
        scenario: &str,
        params: &ModelParameters,
        current_spot: f64,
    ) -> PnlResult {
        warn_out_of_range(params);
        let inputs = self.prepare(params, current_spot);
        self.evaluate(scenario, &inputs, current_spot)
    }

    /// P&L of every configured scenario, keyed by label.
    pub fn calculate_all_scenarios(
        &self,
        params: &ModelParameters,
        current_spot: f64,
    ) -> BTreeMap<String, PnlResult> {
        self.evaluate_all(params, current_spot)
            .into_iter()
            .map(|result| (result.scenario.clone(), result))
            .collect()
    }

    /// Headline P&L per scenario, sorted by ascending spot change.
    ///
    /// Scenarios with equal spot changes keep their configured order.
    pub fn get_scenario_summary(
        &self,
        params: &ModelParameters,
        current_spot: f64,
    ) -> Vec<ScenarioSummaryRow> {
        let mut rows: Vec<ScenarioSummaryRow> = self
            .evaluate_all(params, current_spot)
            .iter()
            .map(PnlResult::summary_row)
            .collect();
        rows.sort_by(|a, b| a.spot_change.total_cmp(&b.spot_change));
        rows
    }

    /// Every configured scenario, in scenario-set order.
    fn evaluate_all(&self, params: &ModelParameters, current_spot: f64) -> Vec<PnlResult> {
        warn_out_of_range(params);
        let inputs = self.prepare(params, current_spot);
        let labels: Vec<&str> = self.spot_scenarios.labels().collect();

        #[cfg(feature = "parallel")]
        let results = labels
            .par_iter()
            .map(|&label| self.evaluate(label, &inputs, current_spot))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let results = labels
            .iter()
            .map(|&label| self.evaluate(label, &inputs, current_spot))
            .collect();

        results
    }

    fn prepare(&self, params: &ModelParameters, current_spot: f64) -> ScenarioInputs {
        let greeks = GreeksCalculator::new(params.volga_scalar);
        ScenarioInputs {
            iv_model: IvModel::from_params(params),
            vanna: greeks.vanna_with_atm(
                &self.atm_grid,
                &self.vega_grids,
                &self.spot_scenarios,
                current_spot,
            ),
            volga: greeks.estimate_volga(&self.atm_grid),
        }
    }

    fn evaluate(&self, scenario: &str, inputs: &ScenarioInputs, current_spot: f64) -> PnlResult {
        let spot_change = self.spot_scenarios.get(scenario).unwrap_or_else(|| {
            warn!(scenario, "unknown scenario, assuming zero spot change");
            0.0
        });

        // Every grid below lives on the ATM axes; cells the scenario grid lacks are NaN
        let vega_grid = match self.vega_grids.get(scenario) {
            Some(grid) => grid.reindex_like(&self.atm_grid),
            None => {
                debug!(scenario, "no vega grid for scenario, using ATM grid");
                self.atm_grid.clone()
            }
        };

        let iv_changes = inputs.iv_model.estimate_iv_changes_grid(
            spot_change,
            self.atm_grid.moneyness(),
            self.atm_grid.expiries(),
            self.reference_date,
        );

        let delta_spot = spot_change * current_spot;
        let vega_pnl_grid = &vega_grid * &iv_changes;
        let vanna_pnl_grid = &inputs.vanna.scale(delta_spot) * &iv_changes;
        let volga_pnl_grid = &inputs.volga.scale(0.5) * &iv_changes.powi(2);
        let total_pnl_grid = &(&vega_pnl_grid + &vanna_pnl_grid) + &volga_pnl_grid;

        let result = PnlResult {
            scenario: scenario.to_string(),
            spot_change,
            vega_pnl: vega_pnl_grid.sum(),
            vanna_pnl: vanna_pnl_grid.sum(),
            volga_pnl: volga_pnl_grid.sum(),
            total_pnl: total_pnl_grid.sum(),
            pnl_by_expiry: aggregate(
                [&vega_pnl_grid, &vanna_pnl_grid, &volga_pnl_grid],
                &total_pnl_grid,
                Grid::sum_by_expiry,
            ),
            pnl_by_moneyness: aggregate(
                [&vega_pnl_grid, &vanna_pnl_grid, &volga_pnl_grid],
                &total_pnl_grid,
                Grid::sum_by_moneyness,
            ),
            vega_pnl_grid,
            vanna_pnl_grid,
            volga_pnl_grid,
            total_pnl_grid,
            iv_change_grid: iv_changes,
        };

        debug!(
            scenario,
            spot_change,
            total_pnl = result.total_pnl,
            "scenario P&L computed"
        );
        result
    }
}

/// Scenario-independent pieces of one run: the IV model and the Greeks.
struct ScenarioInputs {
    iv_model: IvModel,
    vanna: Grid,
    volga: Grid,
}

/// Per-key component totals, with every component read on the total grid's axes.
fn aggregate<K>(
    components: [&Grid; 3],
    total: &Grid,
    reduce: impl Fn(&Grid) -> Vec<(K, f64)>,
) -> Vec<PnlBreakdown<K>> {
    let [vega, vanna, volga] = components.map(|g| reduce(&g.reindex_like(total)));
    breakdown(vega, vanna, volga, reduce(total))
}

fn warn_out_of_range(params: &ModelParameters) {
    let fields = params.out_of_range_fields(&ParamRanges::default());
    if !fields.is_empty() {
        warn!(?fields, "model parameters outside recognized ranges");
    }
}

/// Build an engine with the default seven-scenario ladder and today's local
/// date where not supplied.
///
/// # Errors
///
/// [`PnlError::MissingAtmGrid`] when `vega_grids` has no `"atm"` entry.
pub fn create_pnl_engine(
    vega_grids: VegaGridCollection,
    spot_scenarios: Option<ScenarioSet>,
    reference_date: Option<NaiveDate>,
) -> Result<PnlEngine, PnlError> {
    PnlEngine::new(
        vega_grids,
        spot_scenarios.unwrap_or_default(),
        reference_date.unwrap_or_else(|| chrono::Local::now().date_naive()),
    )
}
