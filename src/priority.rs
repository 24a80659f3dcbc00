// Composite intervention priority score.

use crate::normalize::{normalize, Direction};
use crate::types::{Derived, Metric, Record};
use std::cmp::Ordering;
use tracing::debug;

/// Fixed weights of the four priority drivers. They sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityWeights {
    /// Resilience deficit, from ARI (lower ARI is worse).
    pub resilience_deficit: f64,
    /// Update staleness, from BUR (higher is worse).
    pub update_staleness: f64,
    /// Update sparsity, from BUD (lower is worse).
    pub update_sparsity: f64,
    /// Authentication load, from AWF (higher is worse).
    pub auth_load: f64,
}

pub const PRIORITY_WEIGHTS: PriorityWeights = PriorityWeights {
    resilience_deficit: 0.40,
    update_staleness: 0.25,
    update_sparsity: 0.20,
    auth_load: 0.15,
};

impl PriorityWeights {
    pub fn sum(&self) -> f64 {
        self.resilience_deficit + self.update_staleness + self.update_sparsity + self.auth_load
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prioritized {
    pub record: Record,
    pub priority_score: f64,
}

/// Score and rank `records` by intervention priority, highest first.
///
/// Each driver is min-max normalised over the rows that have all four of
/// ARI, BUR, BUD and AWF; rows missing any of them are excluded and counted.
/// Scores are relative to this subset only, so values from two different
/// filter selections must not be compared. Ties keep input order.
pub fn compute_priority_score(records: &[Record]) -> Derived<Prioritized> {
    let scorable: Vec<Record> = records
        .iter()
        .filter(|r| r.ari.is_some() && r.bur.is_some() && r.bud.is_some() && r.awf.is_some())
        .cloned()
        .collect();
    let excluded = records.len() - scorable.len();

    let w = PRIORITY_WEIGHTS;
    let deficit = normalize(&scorable, Metric::Ari, Direction::Descending);
    let staleness = normalize(&scorable, Metric::Bur, Direction::Ascending);
    let sparsity = normalize(&scorable, Metric::Bud, Direction::Descending);
    let load = normalize(&scorable, Metric::Awf, Direction::Ascending);

    let mut rows: Vec<Prioritized> = scorable
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            // Present by construction of `scorable`.
            let score = w.resilience_deficit * deficit[i].unwrap_or_default()
                + w.update_staleness * staleness[i].unwrap_or_default()
                + w.update_sparsity * sparsity[i].unwrap_or_default()
                + w.auth_load * load[i].unwrap_or_default();
            Prioritized {
                record,
                // Summation can overshoot 1.0 by an ulp.
                priority_score: score.clamp(0.0, 1.0),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(Ordering::Equal)
    });
    debug!(scored = rows.len(), excluded, "priority scores computed");
    Derived { rows, excluded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{metrics, record};

    fn sample() -> Vec<Record> {
        vec![
            metrics("S", "A", 0.9, 1.0, 5.0, 2.0),
            metrics("S", "B", 0.2, 8.0, 1.0, 9.0),
            metrics("S", "C", 0.5, 4.0, 3.0, 5.0),
            metrics("S", "D", 0.7, 2.0, 4.0, 3.0),
        ]
    }

    #[test]
    fn weights_sum_to_one() {
        assert!((PRIORITY_WEIGHTS.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sorted_descending_within_unit_interval() {
        let out = compute_priority_score(&sample());
        assert_eq!(out.excluded, 0);
        assert_eq!(out.rows[0].record.district, "B");
        assert!((out.rows[0].priority_score - 1.0).abs() < 1e-12);
        assert_eq!(out.rows.last().unwrap().record.district, "A");
        assert!(out.rows.last().unwrap().priority_score.abs() < 1e-12);
        for pair in out.rows.windows(2) {
            assert!(pair[0].priority_score >= pair[1].priority_score);
        }
        for row in &out.rows {
            assert!((0.0..=1.0).contains(&row.priority_score));
        }
    }

    #[test]
    fn score_does_not_depend_on_input_order() {
        let forward = compute_priority_score(&sample());
        let mut reversed_input = sample();
        reversed_input.reverse();
        let reversed = compute_priority_score(&reversed_input);
        for row in &forward.rows {
            let other = reversed
                .rows
                .iter()
                .find(|r| r.record.district == row.record.district)
                .unwrap();
            assert!((other.priority_score - row.priority_score).abs() < 1e-12);
        }
    }

    #[test]
    fn ties_keep_input_order() {
        let rows = vec![
            metrics("S", "first", 0.5, 3.0, 3.0, 3.0),
            metrics("S", "second", 0.5, 3.0, 3.0, 3.0),
        ];
        let out = compute_priority_score(&rows);
        assert_eq!(out.rows[0].record.district, "first");
        assert_eq!(out.rows[1].record.district, "second");
        // Zero-range columns fall back to 0.5 everywhere.
        assert!((out.rows[0].priority_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn incomplete_rows_are_excluded() {
        let mut rows = sample();
        rows.push(record("S", "E", 1, Some(0.1)));
        let out = compute_priority_score(&rows);
        assert_eq!(out.excluded, 1);
        assert_eq!(out.rows.len(), 4);
    }

    #[test]
    fn deterministic() {
        assert_eq!(compute_priority_score(&sample()), compute_priority_score(&sample()));
    }
}
