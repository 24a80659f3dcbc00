// Risk category escalation detector.

use crate::temporal::{with_previous, Prior};
use crate::types::{Derived, Record, RiskLevel};

#[derive(Debug, Clone, PartialEq)]
pub struct RiskTransition {
    pub record: Record,
    pub prev_risk: Prior<RiskLevel>,
    pub transition: bool,
}

/// Annotate every dated record with a `Transition` flag.
///
/// Only Medium -> High between consecutive periods of the same district is
/// flagged. Every other change, including Low -> High, is left unflagged.
pub fn detect_risk_transition(records: &[Record]) -> Derived<RiskTransition> {
    with_previous(records, |r| Some(r.risk.clone())).map_rows(|lagged| {
        let transition = lagged.prev.value() == Some(&RiskLevel::Medium)
            && lagged.record.risk == RiskLevel::High;
        RiskTransition {
            record: lagged.record,
            prev_risk: lagged.prev,
            transition,
        }
    })
}
