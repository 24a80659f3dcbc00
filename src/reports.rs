// Report tables built on top of the analytic functions.
//
// Every generator takes the snapshot (for schema and full-population medians)
// and the currently selected rows. A missing input column comes back as
// `AriError::MissingColumn` so the caller can skip just that table.
use crate::dataset::{risk_distribution, Snapshot};
use crate::drivers::explain_drivers;
use crate::early_warning::{detect_early_warning, flagged};
use crate::error::Result;
use crate::forecast::{forecast_next, Recommendation};
use crate::priority::compute_priority_score;
use crate::schema::Feature;
use crate::transition::detect_risk_transition;
use crate::types::{
    ActionPlanRow, Derived, DistrictInsight, DistrictRow, EarlyWarningRow, PriorityRow, Record,
    RiskCountRow, RiskLevel, SummaryStats, TransitionRow,
};
use crate::util::{average, format_number, format_opt};
use std::cmp::Ordering;

/// Shown in the drivers column when BUR/BUD/AWF are not in the source.
pub const DRIVERS_UNAVAILABLE: &str = "unavailable";

fn by_ari_ascending(a: &Record, b: &Record) -> Ordering {
    match (a.ari, b.ari) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn insight(r: &Record) -> Option<DistrictInsight> {
    Some(DistrictInsight {
        state: r.state.clone(),
        district: r.district.clone(),
        ari: r.ari?,
        risk: r.risk.to_string(),
    })
}

pub fn generate_summary(snapshot: &Snapshot, selection: &[Record]) -> Result<SummaryStats> {
    snapshot.require(Feature::Summary)?;

    let aris: Vec<f64> = selection.iter().filter_map(|r| r.ari).collect();
    let count = |level: RiskLevel| selection.iter().filter(|r| r.risk == level).count();

    let mut ranked: Vec<&Record> = selection.iter().filter(|r| r.ari.is_some()).collect();
    ranked.sort_by(|a, b| by_ari_ascending(a, b));

    let early_warnings = snapshot
        .require(Feature::EarlyWarning)
        .ok()
        .map(|_| flagged(&detect_early_warning(selection)).len());
    let risk_escalations = snapshot.require(Feature::RiskTransition).ok().map(|_| {
        detect_risk_transition(selection)
            .rows
            .iter()
            .filter(|t| t.transition)
            .count()
    });
    let escalate_interventions = snapshot.require(Feature::Forecast).ok().map(|_| {
        forecast_next(selection)
            .rows
            .iter()
            .filter(|f| f.recommendation == Some(Recommendation::EscalateIntervention))
            .count()
    });

    Ok(SummaryStats {
        total_records: selection.len(),
        average_ari: average(&aris),
        high_risk: count(RiskLevel::High),
        medium_risk: count(RiskLevel::Medium),
        low_risk: count(RiskLevel::Low),
        worst_district: ranked.first().and_then(|r| insight(r)),
        best_district: ranked.last().and_then(|r| insight(r)),
        early_warnings,
        risk_escalations,
        escalate_interventions,
    })
}

/// The `n` lowest-ARI rows. Rows without ARI are left out.
pub fn worst_districts(snapshot: &Snapshot, selection: &[Record], n: usize) -> Result<Vec<DistrictRow>> {
    snapshot.require(Feature::WorstDistricts)?;
    let mut ranked: Vec<&Record> = selection.iter().filter(|r| r.ari.is_some()).collect();
    ranked.sort_by(|a, b| by_ari_ascending(a, b));
    Ok(ranked
        .into_iter()
        .take(n)
        .map(|r| DistrictRow {
            state: r.state.clone(),
            district: r.district.clone(),
            month: r.month_name.clone(),
            ari: format_opt(r.ari, 3),
            risk: r.risk.to_string(),
            bur: format_opt(r.bur, 3),
            bud: format_opt(r.bud, 3),
        })
        .collect())
}

pub fn risk_counts(snapshot: &Snapshot, selection: &[Record]) -> Result<Vec<RiskCountRow>> {
    snapshot.require(Feature::RiskDistribution)?;
    Ok(risk_distribution(selection)
        .into_iter()
        .map(|(risk, count)| RiskCountRow {
            risk: risk.to_string(),
            count,
        })
        .collect())
}

pub fn priority_ranking(snapshot: &Snapshot, selection: &[Record]) -> Result<Derived<PriorityRow>> {
    snapshot.require(Feature::PriorityScore)?;
    let scored = compute_priority_score(selection);
    let excluded = scored.excluded;
    let rows = scored
        .rows
        .into_iter()
        .enumerate()
        .map(|(idx, p)| PriorityRow {
            rank: idx + 1,
            state: p.record.state,
            district: p.record.district,
            month: p.record.month_name,
            ari: format_opt(p.record.ari, 3),
            priority_score: format_number(p.priority_score, 4),
        })
        .collect();
    Ok(Derived { rows, excluded })
}

/// Flagged early-warning rows only.
pub fn early_warnings(snapshot: &Snapshot, selection: &[Record]) -> Result<Derived<EarlyWarningRow>> {
    snapshot.require(Feature::EarlyWarning)?;
    let warnings = detect_early_warning(selection);
    let rows = flagged(&warnings)
        .into_iter()
        .map(|w| {
            let r = &w.diff.record;
            EarlyWarningRow {
                state: r.state.clone(),
                district: r.district.clone(),
                month: r.month_name.clone(),
                prev_ari: format_opt(w.diff.prev.value().copied(), 3),
                ari: format_opt(r.ari, 3),
                change_pct: format_opt(w.diff.pct_change.finite().map(|p| p * 100.0), 2),
            }
        })
        .collect();
    Ok(Derived {
        rows,
        excluded: warnings.excluded,
    })
}

/// Medium -> High escalations only.
pub fn risk_transitions(snapshot: &Snapshot, selection: &[Record]) -> Result<Derived<TransitionRow>> {
    snapshot.require(Feature::RiskTransition)?;
    let detected = detect_risk_transition(selection);
    let excluded = detected.excluded;
    let rows = detected
        .rows
        .into_iter()
        .filter(|t| t.transition)
        .map(|t| TransitionRow {
            prev_risk: t
                .prev_risk
                .value()
                .map(|p| p.to_string())
                .unwrap_or_default(),
            state: t.record.state,
            district: t.record.district,
            month: t.record.month_name,
            risk: t.record.risk.to_string(),
        })
        .collect();
    Ok(Derived { rows, excluded })
}

/// Forecast, recommendation and drivers per row, worst ARI first.
pub fn action_plan(snapshot: &Snapshot, selection: &[Record]) -> Result<Derived<ActionPlanRow>> {
    snapshot.require(Feature::Forecast)?;
    let drivers_available = snapshot.require(Feature::Drivers).is_ok();
    let medians = snapshot.medians();

    let mut forecasts = forecast_next(selection);
    forecasts
        .rows
        .sort_by(|a, b| by_ari_ascending(&a.diff.record, &b.diff.record));

    Ok(forecasts.map_rows(|f| {
        let r = f.diff.record;
        let drivers = if drivers_available {
            explain_drivers(&r, medians)
        } else {
            DRIVERS_UNAVAILABLE.to_string()
        };
        ActionPlanRow {
            ari: format_opt(r.ari, 3),
            risk: r.risk.to_string(),
            trend: format_number(f.trend, 3),
            forecast: format_opt(f.forecast_ari_next, 3),
            recommendation: f
                .recommendation
                .map(|rec| rec.to_string())
                .unwrap_or_else(|| "-".to_string()),
            drivers,
            state: r.state,
            district: r.district,
            month: r.month_name,
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AriError;

    const CSV: &str = "state,district,ARI,BUR,BUD,AWF,MAF_raw,Risk,MonthName,MonthDate
Kerala,Idukki,0.80,2,6,5,0.1,Medium,January,2025-01-01
Kerala,Idukki,0.50,6,2,12,0.2,High,February,2025-02-01
Kerala,Wayanad,0.60,4,4,8,0.1,Low,January,2025-01-01
Kerala,Wayanad,0.62,4,4,8,0.1,Low,February,2025-02-01
";

    fn snapshot() -> Snapshot {
        Snapshot::from_bytes(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn summary_counts() {
        let snap = snapshot();
        let s = generate_summary(&snap, snap.records()).unwrap();
        assert_eq!(s.total_records, 4);
        assert!((s.average_ari - 0.63).abs() < 1e-9);
        assert_eq!((s.high_risk, s.medium_risk, s.low_risk), (1, 1, 2));
        let worst = s.worst_district.as_ref().unwrap();
        assert_eq!((worst.district.as_str(), worst.ari, worst.risk.as_str()), ("Idukki", 0.50, "High"));
        assert_eq!(worst.to_string(), "Idukki (Kerala) | ARI=0.500 | Risk=High");
        let best = s.best_district.as_ref().unwrap();
        assert_eq!((best.ari, best.risk.as_str()), (0.80, "Medium"));
        assert_eq!(s.early_warnings, Some(1));
        assert_eq!(s.risk_escalations, Some(1));
        assert_eq!(s.escalate_interventions, Some(1));
    }

    #[test]
    fn empty_selection_summary() {
        let snap = snapshot();
        let s = generate_summary(&snap, &[]).unwrap();
        assert_eq!(s.average_ari, 0.0);
        assert_eq!(s.worst_district, None);
    }

    #[test]
    fn action_plan_is_worst_first_with_drivers() {
        let snap = snapshot();
        let plan = action_plan(&snap, snap.records()).unwrap();
        let first = &plan.rows[0];
        assert_eq!(first.district, "Idukki");
        assert_eq!(first.ari, "0.500");
        assert_eq!(first.forecast, "0.200");
        assert_eq!(first.recommendation, "escalate intervention");
        assert_eq!(
            first.drivers,
            "outdated biometrics, low update density, high authentication load"
        );
    }

    #[test]
    fn missing_date_column_disables_temporal_tables_only() {
        let snap = Snapshot::from_bytes(
            "state,district,ARI,BUR,BUD,AWF,Risk\nA,B,0.5,1,1,1,High\n".as_bytes(),
        )
        .unwrap();
        let err = early_warnings(&snap, snap.records()).unwrap_err();
        assert!(matches!(err, AriError::MissingColumn { feature: Feature::EarlyWarning, .. }));
        assert!(err.is_unavailable());
        assert!(priority_ranking(&snap, snap.records()).is_ok());
        let s = generate_summary(&snap, snap.records()).unwrap();
        assert_eq!(s.early_warnings, None);
    }
}
