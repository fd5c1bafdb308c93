use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Two moneyness keys closer than this are treated as the same row.
pub const MONEYNESS_EPSILON: f64 = 1e-9;

/// Days-to-expiry assumed for a column whose key is not a calendar date.
pub const DEFAULT_DAYS_TO_EXPIRY: f64 = 30.0;

/// Header formats tried, in order, before falling back to a free-form label.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%a %b %d %Y"];

/// Column key of a vega grid.
///
/// Expirations are calendar dates whenever the source header parses as one;
/// anything else (e.g. `"Weekly"` or a vendor code) is kept verbatim as a label.
/// Dates order before labels, dates chronologically, labels lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpiryKey {
    /// Calendar expiration date
    Date(NaiveDate),
    /// Unparseable header, kept as-is
    Label(String),
}

impl ExpiryKey {
    /// Parse a column header into an expiry key.
    ///
    /// Accepts ISO (`2025-01-17`), slash (`2025/01/17`, `01/17/2025`), compact
    /// (`20250117`), CBOE (`Fri Jan 17 2025`) and ISO timestamp
    /// (`2025-01-17 16:00:00`) headers. Anything else becomes [`ExpiryKey::Label`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use vega_pnl::ExpiryKey;
    ///
    /// let key = ExpiryKey::parse("Fri Jan 17 2025");
    /// assert_eq!(key, ExpiryKey::Date(NaiveDate::from_ymd_opt(2025, 1, 17).unwrap()));
    /// assert_eq!(ExpiryKey::parse("Weekly"), ExpiryKey::Label("Weekly".to_string()));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        for fmt in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return ExpiryKey::Date(date);
            }
        }

        if let Some(date) = parse_compact_date(trimmed) {
            return ExpiryKey::Date(date);
        }

        // Timestamps: keep the date part only
        if let Some(prefix) = trimmed.get(..10) {
            if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return ExpiryKey::Date(date);
            }
        }

        ExpiryKey::Label(trimmed.to_string())
    }

    /// Calendar date, if this key is one.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            ExpiryKey::Date(date) => Some(*date),
            ExpiryKey::Label(_) => None,
        }
    }

    /// Days from `reference_date` to this expiry, floored at one day.
    ///
    /// Label keys carry no date and always report [`DEFAULT_DAYS_TO_EXPIRY`].
    pub fn days_from(&self, reference_date: NaiveDate) -> f64 {
        self.as_date()
            .map(|date| (date - reference_date).num_days().max(1) as f64)
            .unwrap_or(DEFAULT_DAYS_TO_EXPIRY)
    }
}

impl fmt::Display for ExpiryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryKey::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            ExpiryKey::Label(label) => f.write_str(label),
        }
    }
}

impl From<NaiveDate> for ExpiryKey {
    fn from(date: NaiveDate) -> Self {
        ExpiryKey::Date(date)
    }
}

/// `YYYYMMDD` headers. chrono's `%Y` is greedy, so these are split by hand.
fn parse_compact_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = raw[..4].parse().ok()?;
    let month: u32 = raw[4..6].parse().ok()?;
    let day: u32 = raw[6..].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    // Reject implausible years so numeric vendor codes stay labels
    (1900..=2200).contains(&date.year()).then_some(date)
}

/// Days to expiry for each column, in column order.
///
/// Dated columns use `max((expiry - reference_date).days, 1)`; label columns
/// default to 30 days.
pub fn days_to_expiry(expiries: &[ExpiryKey], reference_date: NaiveDate) -> Vec<f64> {
    expiries
        .iter()
        .map(|expiry| expiry.days_from(reference_date))
        .collect()
}

/// Summary statistics for a vega grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSummary {
    /// Sum of all cells (NaN if any cell is NaN)
    pub total_vega: f64,
    /// Largest non-NaN cell, NaN when the grid has none
    pub max_vega: f64,
    /// Smallest non-NaN cell, NaN when the grid has none
    pub min_vega: f64,
    /// Number of moneyness rows
    pub num_strikes: usize,
    /// Number of expiry columns
    pub num_expiries: usize,
    /// Earliest and latest expiry key
    pub expiry_range: Option<(ExpiryKey, ExpiryKey)>,
    /// Lowest and highest moneyness
    pub moneyness_range: Option<(f64, f64)>,
}
