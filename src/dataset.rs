// Immutable dataset snapshots, the content-keyed load cache and filters.

use crate::drivers::DatasetMedians;
use crate::error::Result;
use crate::loader::{load_from_reader, LoadReport, Loaded};
use crate::schema::{Feature, Schema};
use crate::types::{Record, RiskLevel};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Read-only view of one loaded source. Cheap to clone and share.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Arc<[Record]>,
    schema: Schema,
    medians: DatasetMedians,
    report: LoadReport,
    fingerprint: [u8; 32],
}

impl Snapshot {
    pub fn new(loaded: Loaded, fingerprint: [u8; 32]) -> Self {
        let medians = DatasetMedians::from_records(&loaded.records);
        Snapshot {
            records: loaded.records.into(),
            schema: loaded.schema,
            medians,
            report: loaded.report,
            fingerprint,
        }
    }

    /// Build a snapshot directly from CSV bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let fingerprint = fingerprint(bytes);
        Ok(Snapshot::new(load_from_reader(bytes)?, fingerprint))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Full-population medians used by the driver explanation.
    pub fn medians(&self) -> &DatasetMedians {
        &self.medians
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    pub fn require(&self, feature: Feature) -> Result<()> {
        self.schema.require(feature)
    }

    pub fn select(&self, filter: &Filter) -> Vec<Record> {
        filter.apply(&self.records)
    }
}

fn fingerprint(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}

/// Memoizes load-and-clean per source path, keyed on the file's content hash.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<PathBuf, Arc<Snapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the snapshot for `path`, re-parsing only when its content changed.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Arc<Snapshot>> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let digest = fingerprint(&bytes);

        if let Some(hit) = self.entries.get(path) {
            if hit.fingerprint == digest {
                debug!(path = %path.display(), "snapshot cache hit");
                return Ok(Arc::clone(hit));
            }
        }

        let snapshot = Arc::new(Snapshot::new(load_from_reader(bytes.as_slice())?, digest));
        let report = snapshot.load_report();
        info!(
            path = %path.display(),
            rows = report.loaded_rows,
            parse_errors = report.parse_errors,
            null_dates = report.null_dates,
            null_metrics = report.null_metrics,
            "dataset loaded"
        );
        self.entries.insert(path.to_path_buf(), Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Drop the cached entry so the next `load` re-parses.
    pub fn invalidate(&mut self, path: impl AsRef<Path>) {
        self.entries.remove(path.as_ref());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Row selection. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub month: Option<String>,
    pub state: Option<String>,
    pub risk: Option<String>,
    /// Case-insensitive substring of the district name. Blank is ignored.
    pub district_query: Option<String>,
}

impl Filter {
    pub fn matches(&self, r: &Record) -> bool {
        if let Some(m) = &self.month {
            if &r.month_name != m {
                return false;
            }
        }
        if let Some(s) = &self.state {
            if &r.state != s {
                return false;
            }
        }
        if let Some(risk) = &self.risk {
            if r.risk.as_str() != risk {
                return false;
            }
        }
        match self.district_query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => r.district.to_lowercase().contains(&q.to_lowercase()),
            _ => true,
        }
    }

    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    pub fn is_all(&self) -> bool {
        self.month.is_none()
            && self.state.is_none()
            && self.risk.is_none()
            && self
                .district_query
                .as_deref()
                .map_or(true, |q| q.trim().is_empty())
    }
}

/// Distinct values offered by the month / state / risk selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub months: Vec<String>,
    pub states: Vec<String>,
    pub risks: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[Record]) -> Self {
        FilterOptions {
            months: distinct(records.iter().map(|r| r.month_name.as_str())),
            states: distinct(records.iter().map(|r| r.state.as_str())),
            risks: distinct(records.iter().map(|r| r.risk.as_str())),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Count records per risk label, most frequent first. Equal counts fall back
/// to High, Medium, Low, then other labels alphabetically.
pub fn risk_distribution(records: &[Record]) -> Vec<(RiskLevel, usize)> {
    let mut counts: HashMap<&RiskLevel, usize> = HashMap::new();
    for r in records {
        *counts.entry(&r.risk).or_default() += 1;
    }
    let mut out: Vec<(RiskLevel, usize)> =
        counts.into_iter().map(|(k, v)| (k.clone(), v)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}
