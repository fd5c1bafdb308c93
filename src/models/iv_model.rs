//! Implied-volatility change model
//!
//! Translates a hypothetical spot move into an IV change (vol points) at any
//! (moneyness, tenor) point. Three effects are layered:
//!
//! 1. **Level**: `base = spot_vol_beta * spot_change * 100`. With a negative beta,
//!    IV rises when spot falls.
//! 2. **Term structure**: `(reference_tenor / dte)^(0.5 * slope)`, clamped to
//!    `[0.3, 3.0]`, so short tenors move more than long ones.
//! 3. **Skew**: `1 + skew_factor * (-sign(spot_change)) * (1 - moneyness)`,
//!    clamped to `[0.2, 3.0]`. On a selloff OTM puts (moneyness < 1) are
//!    amplified and OTM calls dampened; a rally reverses both.

use serde::{Deserialize, Serialize};

use super::traits::IvChangeModel;
use super::utils::sign;
use crate::model_params::ModelParameters;

/// Bounds of the term-structure multiplier.
pub const TERM_ADJUSTMENT_BOUNDS: (f64, f64) = (0.3, 3.0);

/// Bounds of the skew multiplier.
pub const SKEW_MULTIPLIER_BOUNDS: (f64, f64) = (0.2, 3.0);

/// Days-to-expiry floor applied before the term adjustment.
const MIN_DAYS_TO_EXPIRY: f64 = 1.0;

/// Spot/vol model producing IV changes from spot shocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvModel {
    /// Vol points per 1% spot move (typical SPX: -2 to -5)
    pub spot_vol_beta: f64,
    /// Skew steepening on directional moves (0 = parallel shift)
    pub skew_factor: f64,
    /// Term-structure exponent (>1: front month moves more)
    pub term_structure_slope: f64,
    /// Tenor at which the term adjustment is 1
    pub reference_tenor_days: f64,
}

impl Default for IvModel {
    fn default() -> Self {
        Self::from_params(&ModelParameters::default())
    }
}

impl IvModel {
    pub fn new(
        spot_vol_beta: f64,
        skew_factor: f64,
        term_structure_slope: f64,
        reference_tenor_days: f64,
    ) -> Self {
        Self {
            spot_vol_beta,
            skew_factor,
            term_structure_slope,
            reference_tenor_days,
        }
    }

    /// Build the model from the IV-related fields of `params`.
    pub fn from_params(params: &ModelParameters) -> Self {
        Self::new(
            params.spot_vol_beta,
            params.skew_factor,
            params.term_structure_slope,
            params.reference_tenor_days,
        )
    }

    /// Term-structure multiplier for a tenor, after the 1-day floor and clamping.
    pub fn term_adjustment(&self, days_to_expiry: f64) -> f64 {
        let dte = days_to_expiry.max(MIN_DAYS_TO_EXPIRY);
        let raw = (self.reference_tenor_days / dte).powf(0.5 * self.term_structure_slope);
        raw.clamp(TERM_ADJUSTMENT_BOUNDS.0, TERM_ADJUSTMENT_BOUNDS.1)
    }

    /// Skew multiplier for a strike given the direction of the spot move.
    ///
    /// A zero spot change yields exactly 1.
    pub fn skew_multiplier(&self, spot_change_pct: f64, moneyness: f64) -> f64 {
        let direction = sign(spot_change_pct);
        let raw = 1.0 + self.skew_factor * (-direction) * (1.0 - moneyness);
        raw.clamp(SKEW_MULTIPLIER_BOUNDS.0, SKEW_MULTIPLIER_BOUNDS.1)
    }

    /// ATM IV change (vol points) for a spot move at a given tenor.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vega_pnl::IvModel;
    ///
    /// let model = IvModel::default();
    /// // -2.5% spot at the 30-day reference tenor: -3.0 * -0.025 * 100
    /// assert!((model.estimate_atm_iv_change(-0.025, 30.0) - 7.5).abs() < 1e-12);
    /// ```
    pub fn estimate_atm_iv_change(&self, spot_change_pct: f64, days_to_expiry: f64) -> f64 {
        let base_iv_change = self.spot_vol_beta * spot_change_pct * 100.0;
        base_iv_change * self.term_adjustment(days_to_expiry)
    }
}

impl IvChangeModel for IvModel {
    fn estimate_iv_change(&self, spot_change_pct: f64, moneyness: f64, days_to_expiry: f64) -> f64 {
        self.estimate_atm_iv_change(spot_change_pct, days_to_expiry)
            * self.skew_multiplier(spot_change_pct, moneyness)
    }
}
