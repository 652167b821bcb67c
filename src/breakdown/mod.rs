//! The breakdown page: read-only summaries and charts of the ledger.

mod aggregation;
mod charts;
mod handlers;

pub use aggregation::{AggregationSnapshot, DailyResourceTotal, aggregate};
pub use handlers::{BreakdownState, get_breakdown_page};
