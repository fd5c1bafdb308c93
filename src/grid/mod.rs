//! Strongly typed (moneyness × expiry) grids
//!
//! Vega exposure, IV changes, Greeks and P&L all live on the same two axes: an
//! ordered moneyness axis (strike / spot) and an ordered expiry axis. [`Grid`]
//! stores them densely with aligned arithmetic and axis reductions.

pub mod frame;
pub mod ops;
pub mod types;

pub use frame::{Grid, VegaGrid};
pub use types::*;
