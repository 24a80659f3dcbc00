// Per-record explanation of what pushes a district's risk up.

use crate::types::Record;
use crate::util::median;
use serde::Serialize;

/// Returned when no driver exceeds its reference median.
pub const NO_DOMINANT_DRIVER: &str = "no dominant driver";

/// Medians of the full, unfiltered dataset. Computed once per snapshot so
/// explanations do not shift when filters change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DatasetMedians {
    pub bur: Option<f64>,
    pub bud: Option<f64>,
    pub awf: Option<f64>,
}

impl DatasetMedians {
    pub fn from_records(records: &[Record]) -> Self {
        DatasetMedians {
            bur: median(records.iter().map(|r| r.bur)),
            bud: median(records.iter().map(|r| r.bud)),
            awf: median(records.iter().map(|r| r.awf)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    OutdatedBiometrics,
    LowUpdateDensity,
    HighAuthLoad,
}

impl Driver {
    pub fn phrase(&self) -> &'static str {
        match self {
            Driver::OutdatedBiometrics => "outdated biometrics",
            Driver::LowUpdateDensity => "low update density",
            Driver::HighAuthLoad => "high authentication load",
        }
    }
}

/// Drivers that apply to `record`, in BUR, BUD, AWF order. A null value or
/// null median skips that driver.
pub fn drivers(record: &Record, medians: &DatasetMedians) -> Vec<Driver> {
    let above = |v: Option<f64>, m: Option<f64>| matches!((v, m), (Some(v), Some(m)) if v > m);
    let below = |v: Option<f64>, m: Option<f64>| matches!((v, m), (Some(v), Some(m)) if v < m);

    let mut out = Vec::with_capacity(3);
    if above(record.bur, medians.bur) {
        out.push(Driver::OutdatedBiometrics);
    }
    if below(record.bud, medians.bud) {
        out.push(Driver::LowUpdateDensity);
    }
    if above(record.awf, medians.awf) {
        out.push(Driver::HighAuthLoad);
    }
    out
}

pub fn explain_drivers(record: &Record, medians: &DatasetMedians) -> String {
    let found = drivers(record, medians);
    if found.is_empty() {
        return NO_DOMINANT_DRIVER.to_string();
    }
    found
        .iter()
        .map(Driver::phrase)
        .collect::<Vec<_>>()
        .join(", ")
}
