// One-step ARI extrapolation and the intervention recommendation built on it.

use crate::temporal::{compute_temporal_diff, TemporalDiff};
use crate::types::{Derived, Metric, Record};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recommendation {
    EscalateIntervention,
    Monitor,
}

impl Recommendation {
    /// Strictly lower forecast escalates; ties go to monitoring.
    pub fn from_forecast(current: f64, forecast_next: f64) -> Self {
        if forecast_next < current {
            Recommendation::EscalateIntervention
        } else {
            Recommendation::Monitor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::EscalateIntervention => "escalate intervention",
            Recommendation::Monitor => "monitor",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub diff: TemporalDiff,
    /// Last observed change; 0 when there is no usable prior period.
    pub trend: f64,
    /// `None` when the record's own ARI is null.
    pub forecast_ari_next: Option<f64>,
    pub recommendation: Option<Recommendation>,
}

/// Extrapolate next-period ARI as `current + (current - previous)`.
pub fn forecast_next(records: &[Record]) -> Derived<Forecast> {
    compute_temporal_diff(records, Metric::Ari).map_rows(|diff| {
        let trend = diff.delta.unwrap_or(0.0);
        let forecast_ari_next = diff.record.ari.map(|ari| ari + trend);
        let recommendation = diff
            .record
            .ari
            .zip(forecast_ari_next)
            .map(|(current, next)| Recommendation::from_forecast(current, next));
        Forecast {
            diff,
            trend,
            forecast_ari_next,
            recommendation,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::record;

    #[test]
    fn two_point_timeline() {
        let rows = vec![record("S", "A", 1, Some(50.0)), record("S", "A", 2, Some(40.0))];
        let out = forecast_next(&rows);

        assert_eq!(out.rows[0].trend, 0.0);
        assert_eq!(out.rows[0].forecast_ari_next, Some(50.0));
        assert_eq!(out.rows[0].recommendation, Some(Recommendation::Monitor));

        assert_eq!(out.rows[1].trend, -10.0);
        assert_eq!(out.rows[1].forecast_ari_next, Some(30.0));
        assert_eq!(
            out.rows[1].recommendation,
            Some(Recommendation::EscalateIntervention)
        );
    }

    #[test]
    fn improving_trend_is_monitored() {
        let rows = vec![record("S", "A", 1, Some(40.0)), record("S", "A", 2, Some(45.0))];
        let out = forecast_next(&rows);
        assert_eq!(out.rows[1].forecast_ari_next, Some(50.0));
        assert_eq!(out.rows[1].recommendation, Some(Recommendation::Monitor));
    }

    #[test]
    fn null_ari_has_no_forecast() {
        let rows = vec![record("S", "A", 1, Some(40.0)), record("S", "A", 2, None)];
        let out = forecast_next(&rows);
        assert_eq!(out.rows[1].trend, 0.0);
        assert_eq!(out.rows[1].forecast_ari_next, None);
        assert_eq!(out.rows[1].recommendation, None);
    }

    #[test]
    fn labels() {
        assert_eq!(Recommendation::from_forecast(1.0, 1.0).to_string(), "monitor");
        assert_eq!(
            Recommendation::from_forecast(1.0, 0.99).to_string(),
            "escalate intervention"
        );
    }
}
