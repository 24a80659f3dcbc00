use crate::error::Result;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Render the first `max_rows` rows as a markdown table.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RiskCountRow;

    fn rows() -> Vec<RiskCountRow> {
        vec![
            RiskCountRow { risk: "High".into(), count: 3 },
            RiskCountRow { risk: "Low".into(), count: 1 },
        ]
    }

    #[test]
    fn render_limits_rows() {
        let table = render_table(&rows(), 1).unwrap();
        assert!(table.contains("| Risk"));
        assert!(table.contains("High"));
        assert!(!table.contains("Low"));
        assert!(render_table::<RiskCountRow>(&[], 5).is_none());
    }

    #[test]
    fn csv_uses_serde_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risk.csv");
        write_csv(&path, &rows()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Risk,Count\nHigh,3\nLow,1\n");
    }
}
