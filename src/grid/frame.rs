use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::types::{ExpiryKey, GridSummary, MONEYNESS_EPSILON};
use crate::error::PnlError;

/// Dense (moneyness × expiry) table of `f64` values.
///
/// Rows are keyed by moneyness (strike / spot), columns by [`ExpiryKey`].
/// Values are stored row-major. Binary operations are left-aligned: the result
/// carries the left operand's axes, and a left cell with no counterpart in the
/// right operand becomes NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    moneyness: Vec<f64>,
    expiries: Vec<ExpiryKey>,
    values: Vec<f64>,
}

/// Vega exposure in dollars per vol point, by moneyness and expiry.
pub type VegaGrid = Grid;

impl Grid {
    /// Build a grid from its axes and a row-major value buffer.
    ///
    /// # Errors
    ///
    /// * [`PnlError::ShapeMismatch`] if `values.len() != moneyness.len() * expiries.len()`
    /// * [`PnlError::DuplicateAxisKey`] if either axis repeats a key
    pub fn new(
        moneyness: Vec<f64>,
        expiries: Vec<ExpiryKey>,
        values: Vec<f64>,
    ) -> Result<Self, PnlError> {
        let (rows, cols) = (moneyness.len(), expiries.len());
        if values.len() != rows * cols {
            return Err(PnlError::ShapeMismatch {
                rows,
                cols,
                len: values.len(),
            });
        }

        for (i, m) in moneyness.iter().enumerate() {
            if moneyness[..i]
                .iter()
                .any(|prev| (prev - m).abs() <= MONEYNESS_EPSILON)
            {
                return Err(PnlError::DuplicateAxisKey {
                    axis: "moneyness",
                    key: m.to_string(),
                });
            }
        }

        let mut seen = HashSet::with_capacity(cols);
        for expiry in &expiries {
            if !seen.insert(expiry) {
                return Err(PnlError::DuplicateAxisKey {
                    axis: "expiry",
                    key: expiry.to_string(),
                });
            }
        }

        Ok(Self {
            moneyness,
            expiries,
            values,
        })
    }

    /// Build a grid from one `Vec` per moneyness row.
    pub fn from_rows(
        moneyness: Vec<f64>,
        expiries: Vec<ExpiryKey>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, PnlError> {
        let cols = expiries.len();
        if rows.len() != moneyness.len() || rows.iter().any(|row| row.len() != cols) {
            return Err(PnlError::ShapeMismatch {
                rows: moneyness.len(),
                cols,
                len: rows.iter().map(Vec::len).sum(),
            });
        }
        Self::new(moneyness, expiries, rows.into_iter().flatten().collect())
    }

    /// Grid with every cell set to `value`.
    pub fn filled(
        moneyness: Vec<f64>,
        expiries: Vec<ExpiryKey>,
        value: f64,
    ) -> Result<Self, PnlError> {
        let len = moneyness.len() * expiries.len();
        Self::new(moneyness, expiries, vec![value; len])
    }

    /// Assemble a grid from axes that are already known to be valid.
    pub(crate) fn from_parts(
        moneyness: Vec<f64>,
        expiries: Vec<ExpiryKey>,
        values: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(values.len(), moneyness.len() * expiries.len());
        Self {
            moneyness,
            expiries,
            values,
        }
    }

    /// Zero grid with the same axes as `self`.
    pub fn zeros_like(&self) -> Self {
        self.with_values(vec![0.0; self.values.len()])
    }

    /// Same axes, new values. Callers guarantee the length.
    pub(crate) fn with_values(&self, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.values.len());
        Self {
            moneyness: self.moneyness.clone(),
            expiries: self.expiries.clone(),
            values,
        }
    }

    pub fn moneyness(&self) -> &[f64] {
        &self.moneyness
    }

    pub fn expiries(&self) -> &[ExpiryKey] {
        &self.expiries
    }

    /// Row-major cell values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.moneyness.len(), self.expiries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at positional `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.moneyness.len() || col >= self.expiries.len() {
            return None;
        }
        self.values.get(row * self.expiries.len() + col).copied()
    }

    /// Value at the `(moneyness, expiry)` key.
    pub fn value_at(&self, moneyness: f64, expiry: &ExpiryKey) -> Option<f64> {
        let row = self.row_position(moneyness)?;
        let col = self.expiries.iter().position(|e| e == expiry)?;
        self.get(row, col)
    }

    /// Values of one moneyness row.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let cols = self.expiries.len();
        if row >= self.moneyness.len() {
            return None;
        }
        Some(&self.values[row * cols..(row + 1) * cols])
    }

    /// Values of one expiry column, top to bottom.
    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        if col >= self.expiries.len() {
            return None;
        }
        Some(
            self.values
                .iter()
                .skip(col)
                .step_by(self.expiries.len())
                .copied()
                .collect(),
        )
    }

    pub(crate) fn row_position(&self, moneyness: f64) -> Option<usize> {
        self.moneyness
            .iter()
            .position(|m| (m - moneyness).abs() <= MONEYNESS_EPSILON)
    }

    /// True when both grids have the same axes in the same order.
    pub fn same_axes(&self, other: &Grid) -> bool {
        self.expiries == other.expiries
            && self.moneyness.len() == other.moneyness.len()
            && self
                .moneyness
                .iter()
                .zip(&other.moneyness)
                .all(|(a, b)| (a - b).abs() <= MONEYNESS_EPSILON)
    }

    /// Apply `f` to every cell.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        self.with_values(self.values.iter().map(|&v| f(v)).collect())
    }

    /// Apply `f(moneyness, value)` to every cell.
    pub fn map_with_moneyness(&self, f: impl Fn(f64, f64) -> f64) -> Self {
        let cols = self.expiries.len().max(1);
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| f(self.moneyness[i / cols], v))
            .collect();
        self.with_values(values)
    }

    /// Combine two grids cell by cell on the left operand's axes.
    ///
    /// Cells of `self` whose key is absent from `other` evaluate to NaN.
    pub fn zip_with(&self, other: &Grid, f: impl Fn(f64, f64) -> f64) -> Self {
        if self.same_axes(other) {
            let values = self
                .values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| f(a, b))
                .collect();
            return self.with_values(values);
        }

        let row_map: Vec<Option<usize>> = self
            .moneyness
            .iter()
            .map(|&m| other.row_position(m))
            .collect();
        let other_cols: HashMap<&ExpiryKey, usize> = other
            .expiries
            .iter()
            .enumerate()
            .map(|(j, e)| (e, j))
            .collect();
        let col_map: Vec<Option<usize>> = self
            .expiries
            .iter()
            .map(|e| other_cols.get(e).copied())
            .collect();

        let mut values = Vec::with_capacity(self.values.len());
        for (i, row) in row_map.iter().enumerate() {
            for (j, col) in col_map.iter().enumerate() {
                let a = self.values[i * self.expiries.len() + j];
                let b = match (row, col) {
                    (Some(r), Some(c)) => other.values[r * other.expiries.len() + c],
                    _ => f64::NAN,
                };
                values.push(f(a, b));
            }
        }
        self.with_values(values)
    }

    /// Reindex onto `like`'s axes, NaN where `self` has no value.
    pub fn reindex_like(&self, like: &Grid) -> Self {
        like.zip_with(self, |_, v| v)
    }

    /// Summary statistics of the grid.
    pub fn summary(&self) -> GridSummary {
        let observed = self.values.iter().copied().filter(|v| !v.is_nan());
        let (min_vega, max_vega) = observed.fold((f64::NAN, f64::NAN), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        let expiry_range = match (self.expiries.iter().min(), self.expiries.iter().max()) {
            (Some(lo), Some(hi)) => Some((lo.clone(), hi.clone())),
            _ => None,
        };
        let moneyness_range = if self.moneyness.is_empty() {
            None
        } else {
            Some(self.moneyness.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), &m| (lo.min(m), hi.max(m)),
            ))
        };

        GridSummary {
            total_vega: self.sum(),
            max_vega,
            min_vega,
            num_strikes: self.moneyness.len(),
            num_expiries: self.expiries.len(),
            expiry_range,
            moneyness_range,
        }
    }
}
