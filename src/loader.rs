use crate::error::Result;
use crate::schema::Schema;
use crate::types::{RawRow, Record, RiskLevel};
use crate::util::{clean_text, parse_date_safe, parse_f64_safe};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub null_dates: usize,
    pub null_metrics: usize,
}

/// Output of one load-and-clean pass.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub records: Vec<Record>,
    pub schema: Schema,
    pub report: LoadReport,
}

pub fn load_and_clean(path: impl AsRef<Path>) -> Result<Loaded> {
    let bytes = std::fs::read(path)?;
    load_from_reader(bytes.as_slice())
}

/// Parse and clean CSV content. Unparseable dates and numbers become `None`;
/// text is trimmed. Rows the CSV reader cannot decode are skipped and counted.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Loaded> {
    // Headers are trimmed so serde field names match what `Schema` reports.
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);
    let schema = Schema::from_headers(rdr.headers()?.iter());
    for column in schema.missing() {
        debug!(%column, "column absent from source");
    }

    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row = report.total_rows, error = %e, "skipping undecodable row");
                report.parse_errors += 1;
                continue;
            }
        };

        let record = Record {
            state: clean_text(row.state),
            district: clean_text(row.district),
            month_date: parse_date_safe(row.month_date.as_deref()),
            month_name: clean_text(row.month_name),
            ari: parse_f64_safe(row.ari.as_deref()),
            bur: parse_f64_safe(row.bur.as_deref()),
            bud: parse_f64_safe(row.bud.as_deref()),
            awf: parse_f64_safe(row.awf.as_deref()),
            maf_raw: parse_f64_safe(row.maf_raw.as_deref()),
            risk: RiskLevel::parse(row.risk.as_deref().unwrap_or_default()),
        };

        if record.month_date.is_none() {
            report.null_dates += 1;
        }
        if [record.ari, record.bur, record.bud, record.awf, record.maf_raw]
            .iter()
            .any(Option::is_none)
        {
            report.null_metrics += 1;
        }
        records.push(record);
    }

    report.loaded_rows = records.len();
    Ok(Loaded {
        records,
        schema,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use chrono::NaiveDate;

    const CSV: &str = "state,district,ARI,BUR,BUD,AWF,MAF_raw,Risk,MonthName,MonthDate\n\
 Kerala , Idukki ,0.61,4.0,2.5,9.0,0.1, High ,March,2025-03-01\n\
Kerala,Wayanad,abc,4.0,,9.0,0.1,Low,March,not-a-date\n";

    #[test]
    fn coerces_bad_cells_to_none_and_trims_text() {
        let loaded = load_from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(loaded.report.total_rows, 2);
        assert_eq!(loaded.report.loaded_rows, 2);
        assert_eq!(loaded.report.null_dates, 1);
        assert_eq!(loaded.report.null_metrics, 1);

        let first = &loaded.records[0];
        assert_eq!(first.entity(), ("Kerala", "Idukki"));
        assert_eq!(first.risk, RiskLevel::High);
        assert_eq!(first.month_date, NaiveDate::from_ymd_opt(2025, 3, 1));

        let second = &loaded.records[1];
        assert_eq!(second.ari, None);
        assert_eq!(second.bud, None);
        assert_eq!(second.month_date, None);
    }

    #[test]
    fn missing_columns_load_as_absent() {
        let loaded = load_from_reader("state,district,ARI\nA,B,0.5\n".as_bytes()).unwrap();
        assert!(!loaded.schema.has(Column::MonthDate));
        assert_eq!(loaded.records[0].bur, None);
        assert_eq!(loaded.records[0].risk, RiskLevel::Other(String::new()));
    }

    #[test]
    fn padded_headers_still_bind_to_fields() {
        let csv = "state, district ,ARI,Risk,MonthDate\n\
A,Alpha,100,Medium,2025-01-01\n\
A,Beta,50,High,2025-02-01\n";
        let loaded = load_from_reader(csv.as_bytes()).unwrap();
        assert!(loaded.schema.has(Column::District));
        let districts: Vec<&str> = loaded.records.iter().map(|r| r.district.as_str()).collect();
        assert_eq!(districts, vec!["Alpha", "Beta"]);
    }
}
