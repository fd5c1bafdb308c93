pub mod greeks;
pub mod iv_model;

/// Common traits used by the P&L engine
pub mod traits {
    use chrono::NaiveDate;

    use crate::grid::{days_to_expiry, ExpiryKey, Grid};

    /// Maps a hypothetical spot move to an implied-volatility change.
    ///
    /// Implementors only provide the per-point estimate; the grid version is
    /// derived from it.
    pub trait IvChangeModel: Send + Sync {
        /// IV change in vol points at one `(moneyness, tenor)` point.
        fn estimate_iv_change(
            &self,
            spot_change_pct: f64,
            moneyness: f64,
            days_to_expiry: f64,
        ) -> f64;

        /// IV change for every `(moneyness, expiry)` cell.
        ///
        /// Days to expiry are computed once per column as
        /// `max((expiry - reference_date).days, 1)`, or 30 for label columns.
        fn estimate_iv_changes_grid(
            &self,
            spot_change_pct: f64,
            moneyness_levels: &[f64],
            expiry_dates: &[ExpiryKey],
            reference_date: NaiveDate,
        ) -> Grid {
            let dte = days_to_expiry(expiry_dates, reference_date);
            let values = moneyness_levels
                .iter()
                .flat_map(|&m| {
                    dte.iter()
                        .map(move |&d| self.estimate_iv_change(spot_change_pct, m, d))
                })
                .collect();

            Grid::from_parts(moneyness_levels.to_vec(), expiry_dates.to_vec(), values)
        }
    }
}

/// Small numeric helpers shared by the models
pub mod utils {
    /// Sign of `x` with `sign(0) = 0`.
    ///
    /// Unlike [`f64::signum`], zero (of either sign) maps to zero so that a flat
    /// spot move never activates directional effects.
    pub fn sign(x: f64) -> f64 {
        if x > 0.0 {
            1.0
        } else if x < 0.0 {
            -1.0
        } else {
            0.0
        }
    }
}
