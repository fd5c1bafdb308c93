pub mod engine;
pub mod types;

pub use engine::{create_pnl_engine, PnlEngine};
pub use types::{PnlBreakdown, PnlResult, ScenarioSummaryRow};
