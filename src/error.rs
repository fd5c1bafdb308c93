//! Error types for the P&L pipeline.
//!
//! Only a missing ATM vega grid is fatal to a P&L computation. Every other
//! irregularity (unknown scenario, missing scenario grid, zero denominators)
//! resolves to a documented fallback and never surfaces here.

use thiserror::Error;

/// Scenario key every vega-grid collection must carry.
pub const ATM_KEY: &str = "atm";

/// Errors raised by grid construction and by operations that need the ATM grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PnlError {
    /// The vega-grid collection has no entry for the ATM anchor scenario.
    #[error("ATM vega grid missing: no entry for key '{key}'")]
    MissingAtmGrid {
        /// The key that was looked up
        key: String,
    },

    /// Value buffer length does not match the axis lengths.
    #[error("Grid shape mismatch: {rows} x {cols} axes but {len} values")]
    ShapeMismatch {
        /// Number of moneyness rows
        rows: usize,
        /// Number of expiry columns
        cols: usize,
        /// Length of the supplied value buffer
        len: usize,
    },

    /// An axis contains the same key twice.
    #[error("Duplicate {axis} key: {key}")]
    DuplicateAxisKey {
        /// Axis name ("moneyness" or "expiry")
        axis: &'static str,
        /// Rendered key
        key: String,
    },
}

impl PnlError {
    pub(crate) fn missing_atm() -> Self {
        PnlError::MissingAtmGrid {
            key: ATM_KEY.to_string(),
        }
    }
}
