// Record builders shared by the unit tests.

use crate::types::{Record, RiskLevel};
use chrono::NaiveDate;

pub fn record(state: &str, district: &str, month: u32, ari: Option<f64>) -> Record {
    Record {
        state: state.to_string(),
        district: district.to_string(),
        month_date: NaiveDate::from_ymd_opt(2025, month, 1),
        month_name: format!("M{:02}", month),
        ari,
        bur: None,
        bud: None,
        awf: None,
        maf_raw: None,
        risk: RiskLevel::Low,
    }
}

pub fn metrics(state: &str, district: &str, ari: f64, bur: f64, bud: f64, awf: f64) -> Record {
    Record {
        bur: Some(bur),
        bud: Some(bud),
        awf: Some(awf),
        ..record(state, district, 1, Some(ari))
    }
}

pub fn with_risk(mut r: Record, risk: &str) -> Record {
    r.risk = RiskLevel::parse(risk);
    r
}
