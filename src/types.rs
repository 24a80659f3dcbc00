use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One CSV row as it appears on disk. Every cell is optional text; coercion
/// happens in the loader.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRow {
    pub state: Option<String>,
    pub district: Option<String>,
    #[serde(rename = "ARI")]
    pub ari: Option<String>,
    #[serde(rename = "BUR")]
    pub bur: Option<String>,
    #[serde(rename = "BUD")]
    pub bud: Option<String>,
    #[serde(rename = "AWF")]
    pub awf: Option<String>,
    #[serde(rename = "MAF_raw")]
    pub maf_raw: Option<String>,
    #[serde(rename = "Risk")]
    pub risk: Option<String>,
    #[serde(rename = "MonthName")]
    pub month_name: Option<String>,
    #[serde(rename = "MonthDate")]
    pub month_date: Option<String>,
}

/// Risk category label. Only the exact labels "High", "Medium" and "Low"
/// map to the named variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
    Other(String),
}

impl RiskLevel {
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "High" => RiskLevel::High,
            "Medium" => RiskLevel::Medium,
            "Low" => RiskLevel::Low,
            other => RiskLevel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
            RiskLevel::Other(s) => s,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (district, month) observation after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub state: String,
    pub district: String,
    pub month_date: Option<NaiveDate>,
    pub month_name: String,
    pub ari: Option<f64>,
    pub bur: Option<f64>,
    pub bud: Option<f64>,
    pub awf: Option<f64>,
    pub maf_raw: Option<f64>,
    pub risk: RiskLevel,
}

impl Record {
    /// Timeline key.
    pub fn entity(&self) -> (&str, &str) {
        (self.state.as_str(), self.district.as_str())
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Ari => self.ari,
            Metric::Bur => self.bur,
            Metric::Bud => self.bud,
            Metric::Awf => self.awf,
            Metric::MafRaw => self.maf_raw,
        }
    }
}

/// Numeric columns of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Ari,
    Bur,
    Bud,
    Awf,
    MafRaw,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Ari => "ARI",
            Metric::Bur => "BUR",
            Metric::Bud => "BUD",
            Metric::Awf => "AWF",
            Metric::MafRaw => "MAF_raw",
        }
    }
}

/// Best-effort output of an analytic function: the annotated rows plus the
/// number of input rows that had to be left out.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived<T> {
    pub rows: Vec<T>,
    pub excluded: usize,
}

impl<T> Derived<T> {
    pub fn map_rows<U>(self, f: impl FnMut(T) -> U) -> Derived<U> {
        Derived {
            rows: self.rows.into_iter().map(f).collect(),
            excluded: self.excluded,
        }
    }
}

// ---------------- report rows ----------------

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistrictRow {
    #[serde(rename = "state")]
    #[tabled(rename = "state")]
    pub state: String,
    #[serde(rename = "district")]
    #[tabled(rename = "district")]
    pub district: String,
    #[serde(rename = "MonthName")]
    #[tabled(rename = "MonthName")]
    pub month: String,
    #[serde(rename = "ARI")]
    #[tabled(rename = "ARI")]
    pub ari: String,
    #[serde(rename = "Risk")]
    #[tabled(rename = "Risk")]
    pub risk: String,
    #[serde(rename = "BUR")]
    #[tabled(rename = "BUR")]
    pub bur: String,
    #[serde(rename = "BUD")]
    #[tabled(rename = "BUD")]
    pub bud: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RiskCountRow {
    #[serde(rename = "Risk")]
    #[tabled(rename = "Risk")]
    pub risk: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PriorityRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "state")]
    #[tabled(rename = "state")]
    pub state: String,
    #[serde(rename = "district")]
    #[tabled(rename = "district")]
    pub district: String,
    #[serde(rename = "MonthName")]
    #[tabled(rename = "MonthName")]
    pub month: String,
    #[serde(rename = "ARI")]
    #[tabled(rename = "ARI")]
    pub ari: String,
    #[serde(rename = "Priority_Score")]
    #[tabled(rename = "Priority_Score")]
    pub priority_score: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct EarlyWarningRow {
    #[serde(rename = "state")]
    #[tabled(rename = "state")]
    pub state: String,
    #[serde(rename = "district")]
    #[tabled(rename = "district")]
    pub district: String,
    #[serde(rename = "MonthName")]
    #[tabled(rename = "MonthName")]
    pub month: String,
    #[serde(rename = "ARI_prev")]
    #[tabled(rename = "ARI_prev")]
    pub prev_ari: String,
    #[serde(rename = "ARI")]
    #[tabled(rename = "ARI")]
    pub ari: String,
    #[serde(rename = "ARI_change_pct")]
    #[tabled(rename = "ARI_change_pct")]
    pub change_pct: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TransitionRow {
    #[serde(rename = "state")]
    #[tabled(rename = "state")]
    pub state: String,
    #[serde(rename = "district")]
    #[tabled(rename = "district")]
    pub district: String,
    #[serde(rename = "MonthName")]
    #[tabled(rename = "MonthName")]
    pub month: String,
    #[serde(rename = "Prev_Risk")]
    #[tabled(rename = "Prev_Risk")]
    pub prev_risk: String,
    #[serde(rename = "Risk")]
    #[tabled(rename = "Risk")]
    pub risk: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ActionPlanRow {
    #[serde(rename = "state")]
    #[tabled(rename = "state")]
    pub state: String,
    #[serde(rename = "district")]
    #[tabled(rename = "district")]
    pub district: String,
    #[serde(rename = "MonthName")]
    #[tabled(rename = "MonthName")]
    pub month: String,
    #[serde(rename = "ARI")]
    #[tabled(rename = "ARI")]
    pub ari: String,
    #[serde(rename = "Risk")]
    #[tabled(rename = "Risk")]
    pub risk: String,
    #[serde(rename = "ARI_trend")]
    #[tabled(rename = "ARI_trend")]
    pub trend: String,
    #[serde(rename = "Forecast_ARI_Next")]
    #[tabled(rename = "Forecast_ARI_Next")]
    pub forecast: String,
    #[serde(rename = "Recommendation")]
    #[tabled(rename = "Recommendation")]
    pub recommendation: String,
    #[serde(rename = "Drivers")]
    #[tabled(rename = "Drivers")]
    pub drivers: String,
}

/// One district-month picked out for the headline (worst or best ARI).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictInsight {
    pub state: String,
    pub district: String,
    #[serde(rename = "ARI")]
    pub ari: f64,
    #[serde(rename = "Risk")]
    pub risk: String,
}

impl fmt::Display for DistrictInsight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) | ARI={:.3} | Risk={}",
            self.district, self.state, self.ari, self.risk
        )
    }
}

/// Headline figures for the current selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub average_ari: f64,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub worst_district: Option<DistrictInsight>,
    pub best_district: Option<DistrictInsight>,
    pub early_warnings: Option<usize>,
    pub risk_escalations: Option<usize>,
    pub escalate_interventions: Option<usize>,
}
