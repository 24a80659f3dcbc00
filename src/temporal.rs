// Per-entity sequential differences.
//
// Records are grouped by `(state, district)` and each group is ordered by
// `MonthDate`. A record is only ever compared with the record immediately
// before it in its own timeline. Records without a `MonthDate` cannot be
// placed on a timeline and are excluded.

use crate::types::{Derived, Metric, Record};
use std::collections::BTreeMap;
use tracing::debug;

/// Value of a field in the previous period of the same timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Prior<T> {
    /// The record opens its timeline; there is no prior period.
    FirstInTimeline,
    /// A prior period exists but the field was null there.
    Missing,
    Value(T),
}

impl<T> Prior<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Prior::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_first(&self) -> bool {
        matches!(self, Prior::FirstInTimeline)
    }
}

/// Relative change `(current - previous) / previous`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentChange {
    Finite(f64),
    /// The previous value was exactly zero.
    ZeroBase,
    /// No prior period, or either side is null.
    Unavailable,
}

impl PercentChange {
    pub fn finite(&self) -> Option<f64> {
        match self {
            PercentChange::Finite(p) => Some(*p),
            _ => None,
        }
    }
}

/// A record paired with the previous period's value of some field.
#[derive(Debug, Clone, PartialEq)]
pub struct Lagged<T> {
    pub record: Record,
    pub prev: Prior<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemporalDiff {
    pub record: Record,
    pub prev: Prior<f64>,
    pub delta: Option<f64>,
    pub pct_change: PercentChange,
}

/// Group records into chronologically ordered entity timelines, keyed and
/// ordered by `(state, district)`. Returns the timelines and the number of
/// records dropped for lacking a date.
pub fn timelines(records: &[Record]) -> (Vec<Vec<&Record>>, usize) {
    let mut groups: BTreeMap<(&str, &str), Vec<&Record>> = BTreeMap::new();
    let mut undated = 0usize;
    for r in records {
        if r.month_date.is_none() {
            undated += 1;
            continue;
        }
        groups.entry(r.entity()).or_default().push(r);
    }
    let ordered = groups
        .into_values()
        .map(|mut g| {
            // Stable: same-month duplicates keep input order.
            g.sort_by_key(|r| r.month_date);
            g
        })
        .collect();
    (ordered, undated)
}

/// Pair every dated record with the previous value of `extract` in its
/// timeline.
pub fn with_previous<T, F>(records: &[Record], extract: F) -> Derived<Lagged<T>>
where
    F: Fn(&Record) -> Option<T>,
{
    let (groups, excluded) = timelines(records);
    let mut rows = Vec::with_capacity(records.len() - excluded);
    for group in groups {
        let mut prev: Prior<T> = Prior::FirstInTimeline;
        for r in group {
            let current = match extract(r) {
                Some(v) => Prior::Value(v),
                None => Prior::Missing,
            };
            rows.push(Lagged {
                record: r.clone(),
                prev: std::mem::replace(&mut prev, current),
            });
        }
    }
    Derived { rows, excluded }
}

/// Previous value, difference and percent change of `metric` per record.
pub fn compute_temporal_diff(records: &[Record], metric: Metric) -> Derived<TemporalDiff> {
    let lagged = with_previous(records, |r| r.metric(metric));
    debug!(
        column = metric.name(),
        rows = lagged.rows.len(),
        excluded = lagged.excluded,
        "temporal diff computed"
    );
    lagged.map_rows(|Lagged { record, prev }| {
        let current = record.metric(metric);
        let (delta, pct_change) = match (current, prev.value()) {
            (Some(c), Some(&p)) => {
                let pct = if p == 0.0 {
                    PercentChange::ZeroBase
                } else {
                    PercentChange::Finite((c - p) / p)
                };
                (Some(c - p), pct)
            }
            _ => (None, PercentChange::Unavailable),
        };
        TemporalDiff {
            record,
            prev,
            delta,
            pct_change,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;

    #[test]
    fn groups_sort_by_date_and_never_cross_entities() {
        let rows = vec![
            record("S", "B", 2, Some(20.0)),
            record("S", "A", 3, Some(30.0)),
            record("S", "A", 1, Some(10.0)),
            record("S", "B", 1, Some(50.0)),
        ];
        let out = compute_temporal_diff(&rows, Metric::Ari);
        assert_eq!(out.excluded, 0);

        let a: Vec<_> = out.rows.iter().filter(|d| d.record.district == "A").collect();
        assert!(a[0].prev.is_first());
        assert_eq!(a[1].prev, Prior::Value(10.0));
        assert_eq!(a[1].delta, Some(20.0));
        assert_eq!(a[1].pct_change, PercentChange::Finite(2.0));

        let b: Vec<_> = out.rows.iter().filter(|d| d.record.district == "B").collect();
        assert!(b[0].prev.is_first());
        assert_eq!(b[1].prev, Prior::Value(50.0));
    }

    #[test]
    fn first_record_has_no_prior_period() {
        let out = compute_temporal_diff(&[record("S", "A", 1, Some(0.0))], Metric::Ari);
        assert_eq!(out.rows[0].prev, Prior::FirstInTimeline);
        assert_eq!(out.rows[0].delta, None);
        assert_eq!(out.rows[0].pct_change, PercentChange::Unavailable);
    }

    #[test]
    fn zero_previous_maps_to_sentinel() {
        let rows = vec![record("S", "A", 1, Some(0.0)), record("S", "A", 2, Some(5.0))];
        let out = compute_temporal_diff(&rows, Metric::Ari);
        assert_eq!(out.rows[1].delta, Some(5.0));
        assert_eq!(out.rows[1].pct_change, PercentChange::ZeroBase);
    }

    #[test]
    fn null_values_and_dates() {
        let mut undated = record("S", "A", 4, Some(1.0));
        undated.month_date = None;
        let rows = vec![
            record("S", "A", 1, Some(10.0)),
            record("S", "A", 2, None),
            record("S", "A", 3, Some(12.0)),
            undated,
        ];
        let out = compute_temporal_diff(&rows, Metric::Ari);
        assert_eq!(out.excluded, 1);
        assert_eq!(out.rows.len(), 3);
        assert_eq!(out.rows[1].prev, Prior::Value(10.0));
        assert_eq!(out.rows[1].pct_change, PercentChange::Unavailable);
        assert_eq!(out.rows[2].prev, Prior::Missing);
        assert_eq!(out.rows[2].delta, None);
    }
}
