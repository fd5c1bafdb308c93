//! Model parameters for IV-change estimation and volga scaling.
//!
//! A [`ModelParameters`] record is supplied fresh for every P&L run; nothing in
//! the crate keeps a shared mutable copy. [`ParamRanges`] describes the range a
//! front end would expose for each parameter. Values outside those ranges are
//! still accepted by the models.

use serde::{Deserialize, Serialize};

/// The five scalars driving the IV-change model and the volga proxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// ATM vol points per 1% spot move, typically -5 to -1.
    ///
    /// A value of -3 means a 1% spot drop raises ATM IV by 3 vol points.
    pub spot_vol_beta: f64,

    /// Skew dynamics multiplier. 0 is a parallel shift; positive values
    /// steepen the skew on selloffs.
    pub skew_factor: f64,

    /// Exponent on the term adjustment. Above 1 the front month reacts more,
    /// below 1 the response is flatter across tenors.
    pub term_structure_slope: f64,

    /// Scaling factor of the moneyness-based volga proxy.
    pub volga_scalar: f64,

    /// Tenor (days) at which the term adjustment is exactly 1.
    pub reference_tenor_days: f64,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            spot_vol_beta: -3.0,
            skew_factor: 1.0,
            term_structure_slope: 1.0,
            volga_scalar: 0.5,
            reference_tenor_days: 30.0,
        }
    }
}

impl ModelParameters {
    /// Names of the fields that fall outside `ranges`.
    ///
    /// `reference_tenor_days` has no slider range; it is reported when not
    /// strictly positive.
    pub fn out_of_range_fields(&self, ranges: &ParamRanges) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if !ranges.spot_vol_beta.contains(self.spot_vol_beta) {
            fields.push("spot_vol_beta");
        }
        if !ranges.skew_factor.contains(self.skew_factor) {
            fields.push("skew_factor");
        }
        if !ranges.term_structure_slope.contains(self.term_structure_slope) {
            fields.push("term_structure_slope");
        }
        if !ranges.volga_scalar.contains(self.volga_scalar) {
            fields.push("volga_scalar");
        }
        if self.reference_tenor_days.is_nan() || self.reference_tenor_days <= 0.0 {
            fields.push("reference_tenor_days");
        }
        fields
    }
}

/// Closed interval with a UI step size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// True when `value` lies in `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Recognized range of each tunable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRanges {
    pub spot_vol_beta: ParamRange,
    pub skew_factor: ParamRange,
    pub term_structure_slope: ParamRange,
    pub volga_scalar: ParamRange,
}

impl Default for ParamRanges {
    fn default() -> Self {
        Self {
            spot_vol_beta: ParamRange::new(-5.0, -1.0, 0.1),
            skew_factor: ParamRange::new(-2.0, 2.0, 0.1),
            term_structure_slope: ParamRange::new(0.5, 2.0, 0.1),
            volga_scalar: ParamRange::new(0.0, 1.0, 0.05),
        }
    }
}
