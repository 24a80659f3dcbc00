// Authentication Resilience Index (ARI) analytics.
//
// Loads a district-month dataset into an immutable `Snapshot` and derives
// priority rankings, early warnings, risk transitions, one-step forecasts
// and driver explanations from it.

pub mod config;
pub mod dataset;
pub mod drivers;
pub mod early_warning;
pub mod error;
pub mod forecast;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod priority;
pub mod reports;
pub mod schema;
pub mod temporal;
pub mod transition;
pub mod types;
pub mod util;

#[cfg(test)]
mod fixtures;

pub use dataset::{Filter, FilterOptions, Snapshot, SnapshotCache};
pub use drivers::{explain_drivers, DatasetMedians, NO_DOMINANT_DRIVER};
pub use early_warning::{detect_early_warning, EarlyWarning};
pub use error::{AriError, Result};
pub use forecast::{forecast_next, Forecast, Recommendation};
pub use normalize::{normalize, Direction};
pub use priority::{compute_priority_score, Prioritized};
pub use temporal::{compute_temporal_diff, PercentChange, Prior, TemporalDiff};
pub use transition::{detect_risk_transition, RiskTransition};
pub use types::{Derived, Metric, Record, RiskLevel};
