// Sudden ARI degradation detector.

use crate::temporal::{compute_temporal_diff, TemporalDiff};
use crate::types::{Derived, Metric, Record};

/// A drop of more than 15% against the previous period raises a warning.
pub const EARLY_WARNING_THRESHOLD: f64 = -0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct EarlyWarning {
    pub diff: TemporalDiff,
    pub early_warning: bool,
}

/// Annotate every dated record with an `Early_Warning` flag.
///
/// A record is flagged iff its ARI percent change is finite and strictly
/// below [`EARLY_WARNING_THRESHOLD`]. Timeline openers and zero-base
/// changes are never flagged.
pub fn detect_early_warning(records: &[Record]) -> Derived<EarlyWarning> {
    compute_temporal_diff(records, Metric::Ari).map_rows(|diff| {
        let early_warning = diff
            .pct_change
            .finite()
            .is_some_and(|p| p < EARLY_WARNING_THRESHOLD);
        EarlyWarning {
            diff,
            early_warning,
        }
    })
}

/// Keep only flagged rows.
pub fn flagged(warnings: &Derived<EarlyWarning>) -> Vec<&EarlyWarning> {
    warnings.rows.iter().filter(|w| w.early_warning).collect()
}
