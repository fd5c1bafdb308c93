//! Spot scenarios and per-scenario vega grids.
//!
//! Scenario labels are symbolic (`"down_75"`, `"atm"`, `"up_25"`, ...) and map to
//! a spot-change fraction (`0.025` = +2.5%). `"atm"` with a zero change is the
//! anchor every relative computation is measured against.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{PnlError, ATM_KEY};
use crate::grid::VegaGrid;

/// Default scenario ladder, most negative shock first.
pub const DEFAULT_SPOT_SCENARIOS: [(&str, f64); 7] = [
    ("down_75", -0.075),
    ("down_50", -0.05),
    ("down_25", -0.025),
    (ATM_KEY, 0.0),
    ("up_25", 0.025),
    ("up_50", 0.05),
    ("up_75", 0.075),
];

/// One `label = spot change` entry, as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioEntry {
    pub label: String,
    pub spot_change: f64,
}

/// Ordered mapping from scenario label to spot-change fraction.
///
/// Iteration follows insertion order. That order matters: the one-sided vanna
/// fallback picks the first non-ATM scenario it meets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ScenarioEntry>", into = "Vec<ScenarioEntry>")]
pub struct ScenarioSet {
    entries: Vec<(String, f64)>,
}

impl Default for ScenarioSet {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_SPOT_SCENARIOS)
    }
}

impl ScenarioSet {
    /// Empty scenario set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from `(label, spot_change)` pairs, keeping their order.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        let mut set = Self::new();
        for (label, change) in pairs {
            set.insert(label, change);
        }
        set
    }

    /// Insert a scenario. An existing label keeps its position and takes the
    /// new value.
    pub fn insert(&mut self, label: impl Into<String>, spot_change: f64) {
        let label = label.into();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = spot_change,
            None => self.entries.push((label, spot_change)),
        }
    }

    /// Spot change of `label`, if configured.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, change)| *change)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    /// `(label, spot_change)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(l, c)| (l.as_str(), *c))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `"atm"` is present with a zero spot change.
    pub fn has_atm_anchor(&self) -> bool {
        self.get(ATM_KEY) == Some(0.0)
    }

    /// Human-readable label: `"ATM"` for the anchor, a signed percentage
    /// (`"-7.5%"`, `"+2.5%"`) for other known scenarios, the raw label otherwise.
    pub fn display_label(&self, label: &str) -> String {
        if label == ATM_KEY {
            return "ATM".to_string();
        }
        match self.get(label) {
            Some(change) => format!("{:+.1}%", change * 100.0),
            None => label.to_string(),
        }
    }
}

impl From<Vec<ScenarioEntry>> for ScenarioSet {
    fn from(entries: Vec<ScenarioEntry>) -> Self {
        Self::from_pairs(entries.into_iter().map(|e| (e.label, e.spot_change)))
    }
}

impl From<ScenarioSet> for Vec<ScenarioEntry> {
    fn from(set: ScenarioSet) -> Self {
        set.entries
            .into_iter()
            .map(|(label, spot_change)| ScenarioEntry { label, spot_change })
            .collect()
    }
}

/// Vega grids keyed by scenario label.
///
/// Must hold an `"atm"` grid before any Greek or P&L computation; other
/// scenarios are optional and only improve vanna estimation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VegaGridCollection {
    grids: BTreeMap<String, VegaGrid>,
}

impl VegaGridCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the grid of `scenario`.
    pub fn insert(&mut self, scenario: impl Into<String>, grid: VegaGrid) -> Option<VegaGrid> {
        self.grids.insert(scenario.into(), grid)
    }

    pub fn get(&self, scenario: &str) -> Option<&VegaGrid> {
        self.grids.get(scenario)
    }

    pub fn contains(&self, scenario: &str) -> bool {
        self.grids.contains_key(scenario)
    }

    /// The ATM grid.
    ///
    /// # Errors
    ///
    /// [`PnlError::MissingAtmGrid`] when no `"atm"` entry exists.
    pub fn atm(&self) -> Result<&VegaGrid, PnlError> {
        self.grids.get(ATM_KEY).ok_or_else(PnlError::missing_atm)
    }

    /// `(scenario, grid)` ordered by scenario label.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VegaGrid)> + '_ {
        self.grids.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, VegaGrid)> for VegaGridCollection {
    fn from_iter<I: IntoIterator<Item = (S, VegaGrid)>>(iter: I) -> Self {
        Self {
            grids: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
