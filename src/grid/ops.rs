//! Aligned element-wise arithmetic and axis reductions for [`Grid`].

use std::ops::{Add, Div, Mul, Sub};

use super::frame::Grid;
use super::types::ExpiryKey;

macro_rules! impl_grid_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&Grid> for &Grid {
            type Output = Grid;

            fn $method(self, rhs: &Grid) -> Grid {
                self.zip_with(rhs, |a, b| a $op b)
            }
        }

        impl $trait<f64> for &Grid {
            type Output = Grid;

            fn $method(self, rhs: f64) -> Grid {
                self.map(|a| a $op rhs)
            }
        }
    };
}

impl_grid_binop!(Add, add, +);
impl_grid_binop!(Sub, sub, -);
impl_grid_binop!(Mul, mul, *);
impl_grid_binop!(Div, div, /);

impl Mul<&Grid> for f64 {
    type Output = Grid;

    fn mul(self, rhs: &Grid) -> Grid {
        rhs.map(|v| self * v)
    }
}

impl Grid {
    /// Multiply every cell by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        self * factor
    }

    /// Raise every cell to an integer power.
    pub fn powi(&self, n: i32) -> Self {
        self.map(|v| v.powi(n))
    }

    /// Sum of every cell. A single NaN cell makes the total NaN.
    pub fn sum(&self) -> f64 {
        self.values().iter().sum()
    }

    /// Sum of every non-NaN cell.
    pub fn nan_sum(&self) -> f64 {
        self.values().iter().filter(|v| !v.is_nan()).sum()
    }

    /// Column totals: each expiry summed across moneyness, NaN cells skipped.
    pub fn sum_by_expiry(&self) -> Vec<(ExpiryKey, f64)> {
        self.expiries()
            .iter()
            .enumerate()
            .map(|(j, expiry)| {
                let total: f64 = self
                    .column(j)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|v| !v.is_nan())
                    .sum();
                (expiry.clone(), total)
            })
            .collect()
    }

    /// Row totals: each moneyness summed across expiries, NaN cells skipped.
    pub fn sum_by_moneyness(&self) -> Vec<(f64, f64)> {
        self.moneyness()
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                let total: f64 = self
                    .row(i)
                    .unwrap_or_default()
                    .iter()
                    .filter(|v| !v.is_nan())
                    .sum();
                (m, total)
            })
            .collect()
    }

    /// Cell-wise mean of `grids` on `like`'s axes, ignoring NaN per cell.
    ///
    /// Each grid is aligned to `like` first. A cell where no grid has a value
    /// stays NaN.
    pub fn nan_mean(grids: &[Grid], like: &Grid) -> Grid {
        let aligned: Vec<Grid> = grids.iter().map(|g| g.reindex_like(like)).collect();

        let values = (0..like.values().len())
            .map(|idx| {
                let (sum, count) = aligned
                    .iter()
                    .map(|g| g.values()[idx])
                    .filter(|v| !v.is_nan())
                    .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            })
            .collect();

        like.with_values(values)
    }
}
