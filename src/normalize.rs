// Min-max normalisation of a metric column over a row subset.

use crate::types::{Metric, Record};
use crate::util::min_max;
use tracing::warn;

/// Value emitted for every present cell when the column has zero range.
pub const ZERO_RANGE_FALLBACK: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `(x - min) / (max - min)`: the largest value maps to 1.
    Ascending,
    /// `1 - (x - min) / (max - min)`: the smallest value maps to 1.
    Descending,
}

/// Normalise `metric` over `records`, aligned to input order.
///
/// Missing cells stay `None` and do not take part in min/max. If every
/// present value is equal the column has zero range and all present cells
/// get [`ZERO_RANGE_FALLBACK`].
pub fn normalize(records: &[Record], metric: Metric, direction: Direction) -> Vec<Option<f64>> {
    let Some((min, max)) = min_max(records.iter().filter_map(|r| r.metric(metric))) else {
        return vec![None; records.len()];
    };
    let range = max - min;
    let degenerate = range.abs() < f64::EPSILON;
    if degenerate {
        warn!(
            column = metric.name(),
            value = min,
            fallback = ZERO_RANGE_FALLBACK,
            "zero-range column, using neutral normalisation"
        );
    }

    records
        .iter()
        .map(|r| {
            r.metric(metric).map(|x| {
                if degenerate {
                    return ZERO_RANGE_FALLBACK;
                }
                let scaled = ((x - min) / range).clamp(0.0, 1.0);
                match direction {
                    Direction::Ascending => scaled,
                    Direction::Descending => 1.0 - scaled,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;

    fn with_ari(values: &[Option<f64>]) -> Vec<Record> {
        values.iter().map(|v| record("S", "D", 1, *v)).collect()
    }

    #[test]
    fn ascending_and_descending_are_complements() {
        let rows = with_ari(&[Some(10.0), Some(20.0), Some(30.0)]);
        let up = normalize(&rows, Metric::Ari, Direction::Ascending);
        let down = normalize(&rows, Metric::Ari, Direction::Descending);
        assert_eq!(up, vec![Some(0.0), Some(0.5), Some(1.0)]);
        assert_eq!(down, vec![Some(1.0), Some(0.5), Some(0.0)]);
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let rows = with_ari(&[Some(-3.5), Some(7.25), Some(0.0), Some(100.0), Some(42.0)]);
        for v in normalize(&rows, Metric::Ari, Direction::Ascending).into_iter().flatten() {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn zero_range_uses_fallback() {
        let rows = with_ari(&[Some(4.0), Some(4.0), None]);
        let out = normalize(&rows, Metric::Ari, Direction::Descending);
        assert_eq!(out, vec![Some(0.5), Some(0.5), None]);
    }

    #[test]
    fn all_missing_yields_none() {
        let rows = with_ari(&[None, None]);
        assert_eq!(normalize(&rows, Metric::Ari, Direction::Ascending), vec![None, None]);
        assert!(normalize(&[], Metric::Ari, Direction::Ascending).is_empty());
    }
}
