// Typed column schema.
//
// The loader records which known columns the source file carried. Each
// derived table declares the columns it needs through `Feature`, and
// `Schema::require` turns an absent column into a typed
// `AriError::MissingColumn` instead of a silently empty result.

use crate::error::{AriError, Result};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    State,
    District,
    Ari,
    Bur,
    Bud,
    Awf,
    MafRaw,
    Risk,
    MonthName,
    MonthDate,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::State,
        Column::District,
        Column::Ari,
        Column::Bur,
        Column::Bud,
        Column::Awf,
        Column::MafRaw,
        Column::Risk,
        Column::MonthName,
        Column::MonthDate,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Column::State => "state",
            Column::District => "district",
            Column::Ari => "ARI",
            Column::Bur => "BUR",
            Column::Bud => "BUD",
            Column::Awf => "AWF",
            Column::MafRaw => "MAF_raw",
            Column::Risk => "Risk",
            Column::MonthName => "MonthName",
            Column::MonthDate => "MonthDate",
        }
    }

    pub fn from_header(h: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == h.trim())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A derived table and the columns it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Summary,
    RiskDistribution,
    WorstDistricts,
    PriorityScore,
    EarlyWarning,
    RiskTransition,
    Forecast,
    Drivers,
}

impl Feature {
    pub fn required_columns(&self) -> &'static [Column] {
        use Column::*;
        match self {
            Feature::Summary => &[State, District, Ari],
            Feature::RiskDistribution => &[Risk],
            Feature::WorstDistricts => &[State, District, Ari],
            Feature::PriorityScore => &[Ari, Bur, Bud, Awf],
            Feature::EarlyWarning => &[State, District, MonthDate, Ari],
            Feature::RiskTransition => &[State, District, MonthDate, Risk],
            Feature::Forecast => &[State, District, MonthDate, Ari],
            Feature::Drivers => &[Bur, Bud, Awf],
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Summary => "Summary",
            Feature::RiskDistribution => "Risk distribution",
            Feature::WorstDistricts => "Worst districts",
            Feature::PriorityScore => "Priority score",
            Feature::EarlyWarning => "Early warning",
            Feature::RiskTransition => "Risk transition",
            Feature::Forecast => "Forecast",
            Feature::Drivers => "Driver explanation",
        };
        f.write_str(name)
    }
}

/// Set of known columns present in the loaded source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    present: BTreeSet<Column>,
}

impl Schema {
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Schema {
            present: headers.into_iter().filter_map(Column::from_header).collect(),
        }
    }

    pub fn has(&self, column: Column) -> bool {
        self.present.contains(&column)
    }

    pub fn missing(&self) -> Vec<Column> {
        Column::ALL.into_iter().filter(|c| !self.has(*c)).collect()
    }

    pub fn require(&self, feature: Feature) -> Result<()> {
        match feature
            .required_columns()
            .iter()
            .find(|c| !self.has(**c))
        {
            Some(column) => Err(AriError::MissingColumn {
                feature,
                column: *column,
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_headers_are_ignored() {
        let schema = Schema::from_headers(["state", " district ", "ARI", "Notes"]);
        assert!(schema.has(Column::District));
        assert!(!schema.has(Column::Bur));
        assert_eq!(schema.missing().len(), 7);
    }

    #[test]
    fn require_reports_first_missing_column() {
        let schema = Schema::from_headers(["state", "district", "ARI", "Risk"]);
        assert!(schema.require(Feature::WorstDistricts).is_ok());
        match schema.require(Feature::EarlyWarning) {
            Err(AriError::MissingColumn { feature, column }) => {
                assert_eq!(feature, Feature::EarlyWarning);
                assert_eq!(column, Column::MonthDate);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
