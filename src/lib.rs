//! # Vega-PnL: Scenario P&L Projection for Option Vega Books
//!
//! `vega-pnl` projects the profit and loss of an options book under hypothetical
//! spot moves. The book is described by vega exposure grids (moneyness × expiry),
//! one per spot scenario; the library estimates how implied volatility reacts to
//! each move and attributes the resulting P&L to first- and second-order Greeks.
//!
//! ## Core Features
//!
//! - **IV Model**: Spot/vol beta with term-structure and skew adjustments
//! - **Greeks**: Vanna from finite differences across scenario grids, volga from a
//!   moneyness-based proxy
//! - **P&L Attribution**: Vega, vanna and volga P&L per cell, per expiry, per
//!   moneyness and in total
//! - **Aligned Grids**: Label-aligned arithmetic over moneyness/expiry axes
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use vega_pnl::{create_pnl_engine, default_configs, ExpiryKey, Grid, VegaGridCollection};
//!
//! let expiry = ExpiryKey::Date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
//! let atm = Grid::from_rows(
//!     vec![0.9, 1.0, 1.1],
//!     vec![expiry],
//!     vec![vec![4_000.0], vec![10_000.0], vec![3_000.0]],
//! )?;
//! let grids: VegaGridCollection = [("atm", atm)].into_iter().collect();
//!
//! let engine = create_pnl_engine(grids, None, NaiveDate::from_ymd_opt(2025, 1, 1))?;
//! let summary = engine.get_scenario_summary(&default_configs::default_params(), 100.0);
//!
//! // Rows come back sorted from the largest selloff to the largest rally
//! assert_eq!(summary.first().map(|row| row.scenario.as_str()), Some("down_75"));
//! assert_eq!(summary.last().map(|row| row.scenario.as_str()), Some("up_75"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## P&L Components
//!
//! For a spot change `ΔS` and an IV change `ΔIV` (vol points) per cell:
//! - vega P&L = `vega × ΔIV`
//! - vanna P&L = `vanna × ΔS × ΔIV`
//! - volga P&L = `0.5 × volga × ΔIV²`
//!
//! ## Configuration Presets
//!
//! [`default_configs`] provides parameter presets:
//! - `default_params()`: Typical equity-index dynamics
//! - `flat_surface()`: Parallel IV shifts with no term structure
//! - `crash_regime()`: Strong spot/vol coupling and skew steepening

// ================================================================================================
// MODULES
// ================================================================================================

pub mod config;
pub mod error;
pub mod grid;
pub mod model_params;
pub mod models;
pub mod pnl;
pub mod scenarios;

// ================================================================================================
// IMPORTS
// ================================================================================================

use anyhow::Result;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Grid container and axis keys
pub use grid::{days_to_expiry, ExpiryKey, Grid, GridSummary, VegaGrid};

// Errors
pub use error::{PnlError, ATM_KEY};

// Models
pub use models::{
    greeks::{calculate_greeks, GreeksCalculator, VannaMethod},
    iv_model::IvModel,
    traits::IvChangeModel,
};

// Engine and results
pub use pnl::{
    create_pnl_engine, PnlBreakdown, PnlEngine, PnlResult, ScenarioSummaryRow,
};

// Parameters, scenarios and configuration
pub use config::EngineConfig;
pub use model_params::{ModelParameters, ParamRange, ParamRanges};
pub use scenarios::{ScenarioSet, VegaGridCollection, DEFAULT_SPOT_SCENARIOS};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured model parameters and scenario sets.
///
/// # Available Presets
///
/// - [`default_params()`](default_configs::default_params): Typical index dynamics
/// - [`default_scenarios()`](default_configs::default_scenarios): ±2.5/5/7.5% ladder
/// - [`flat_surface()`](default_configs::flat_surface): Parallel shift, flat term structure
/// - [`crash_regime()`](default_configs::crash_regime): Stressed selloff dynamics
pub mod default_configs {
    use crate::model_params::ModelParameters;
    use crate::scenarios::ScenarioSet;

    /// Default parameters.
    ///
    /// **Characteristics:**
    /// - Spot/vol beta: -3 vol points per 1% spot move
    /// - Skew factor 1, term slope 1 (square-root term decay)
    /// - Volga scalar 0.5, reference tenor 30 days
    ///
    /// # Example
    ///
    /// ```rust
    /// use vega_pnl::default_configs;
    ///
    /// let params = default_configs::default_params();
    /// assert_eq!(params.spot_vol_beta, -3.0);
    /// ```
    pub fn default_params() -> ModelParameters {
        ModelParameters::default()
    }

    /// The seven-scenario ladder from -7.5% to +7.5% around `"atm"`.
    pub fn default_scenarios() -> ScenarioSet {
        ScenarioSet::default()
    }

    /// Parallel IV shift: no skew dynamics, every tenor moves like the
    /// reference tenor.
    ///
    /// The zero term slope sits below the recognized slider range, so engines
    /// log a range warning for this preset.
    pub fn flat_surface() -> ModelParameters {
        ModelParameters {
            skew_factor: 0.0,
            term_structure_slope: 0.0,
            ..ModelParameters::default()
        }
    }

    /// Stressed regime at the edge of the recognized ranges.
    ///
    /// **Characteristics:**
    /// - Spot/vol beta: -5 (largest recognized coupling)
    /// - Skew factor 2: OTM puts reprice sharply on selloffs
    /// - Term slope 2: front month dominates
    /// - Volga scalar 1
    pub fn crash_regime() -> ModelParameters {
        ModelParameters {
            spot_vol_beta: -5.0,
            skew_factor: 2.0,
            term_structure_slope: 2.0,
            volga_scalar: 1.0,
            ..ModelParameters::default()
        }
    }
}

// ================================================================================================
// TOP-LEVEL API
// ================================================================================================

/// Run every configured scenario and return the sorted summary table.
///
/// Builds a [`PnlEngine`] from `vega_grids` and `config`, using today's date
/// when `config.reference_date` is unset.
///
/// # Errors
///
/// * `anyhow::Error` if `config` fails validation
/// * `anyhow::Error` wrapping [`PnlError::MissingAtmGrid`] if `vega_grids` has no `"atm"` grid
///
/// # Example
///
/// ```rust
/// use vega_pnl::{scenario_summary, EngineConfig, ExpiryKey, Grid, VegaGridCollection};
///
/// let atm = Grid::filled(vec![0.95, 1.0, 1.05], vec![ExpiryKey::parse("2025-03-21")], 1_000.0)?;
/// let grids: VegaGridCollection = [("atm", atm)].into_iter().collect();
///
/// let config = EngineConfig::from_toml_str("reference_date = \"2025-02-19\"")?;
/// let rows = scenario_summary(grids, &config)?;
/// assert_eq!(rows.len(), 7);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn scenario_summary(
    vega_grids: VegaGridCollection,
    config: &EngineConfig,
) -> Result<Vec<ScenarioSummaryRow>> {
    config.validate()?;
    let engine = create_pnl_engine(
        vega_grids,
        Some(config.scenarios.clone()),
        config.reference_date,
    )?;
    Ok(engine.get_scenario_summary(&config.params, config.current_spot))
}

/// Full P&L breakdown of one scenario for a book.
///
/// # Errors
///
/// * `anyhow::Error` if `config` fails validation
/// * `anyhow::Error` wrapping [`PnlError::MissingAtmGrid`] if `vega_grids` has no `"atm"` grid
pub fn scenario_pnl(
    vega_grids: VegaGridCollection,
    scenario: &str,
    config: &EngineConfig,
) -> Result<PnlResult> {
    config.validate()?;
    let engine = create_pnl_engine(
        vega_grids,
        Some(config.scenarios.clone()),
        config.reference_date,
    )?;
    Ok(engine.calculate_pnl(scenario, &config.params, config.current_spot))
}
