// Entry point and interactive console flow.
//
// - Option [1] loads and cleans the CSV (memoized on file content).
// - Option [2] sets the Month / State / Risk / district filters.
// - Option [3] generates every report for the current selection, writes
//   the CSV tables plus summary.json and previews them on the console.
use anyhow::Context;
use ari_report::config::Config;
use ari_report::dataset::{Filter, FilterOptions, Snapshot, SnapshotCache};
use ari_report::error::AriError;
use ari_report::output::{preview_table, write_csv, write_json};
use ari_report::reports;
use ari_report::types::Derived;
use ari_report::util::{format_int, format_number, format_opt};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct AppState {
    config: Config,
    cache: SnapshotCache,
    snapshot: Option<Arc<Snapshot>>,
    filter: Filter,
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Blank input or "All" clears the filter.
fn prompt_filter(label: &str, options: &[String]) -> Option<String> {
    if !options.is_empty() {
        println!("{} options: All, {}", label, options.join(", "));
    }
    let v = prompt(&format!("{} [All]: ", label));
    if v.is_empty() || v.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(v)
    }
}

fn handle_load(state: &mut AppState) {
    let path = state.config.data.path.clone();
    match state.cache.load(&path) {
        Ok(snapshot) => {
            let report = snapshot.load_report();
            println!(
                "Processing dataset... ({} rows loaded, {} skipped due to parse errors)",
                format_int(report.loaded_rows),
                format_int(report.parse_errors)
            );
            if report.null_dates > 0 {
                println!(
                    "Note: {} rows have no usable MonthDate and are left out of trend analysis.",
                    format_int(report.null_dates)
                );
            }
            if report.null_metrics > 0 {
                println!(
                    "Note: {} rows have at least one missing metric.",
                    format_int(report.null_metrics)
                );
            }
            let missing = snapshot.schema().missing();
            if !missing.is_empty() {
                let names: Vec<String> = missing.iter().map(|c| c.to_string()).collect();
                println!("Warning: columns not found: {}", names.join(", "));
            }
            println!();
            state.snapshot = Some(snapshot);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "load failed");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn handle_filters(state: &mut AppState) {
    let Some(snapshot) = state.snapshot.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let opts = FilterOptions::from_records(snapshot.records());
    state.filter = Filter {
        month: prompt_filter("Month", &opts.months),
        state: prompt_filter("State", &opts.states),
        risk: prompt_filter("Risk", &opts.risks),
        district_query: Some(prompt("Search district (optional): ")).filter(|q| !q.is_empty()),
    };
    let selected = snapshot.select(&state.filter).len();
    println!("Selection: {} of {} rows.\n", format_int(selected), format_int(snapshot.records().len()));
}

/// Write and preview one table, or report why it is unavailable.
fn emit_table<T>(
    out_dir: &Path,
    file: &str,
    title: &str,
    note: &str,
    preview_rows: usize,
    table: ari_report::Result<Derived<T>>,
) -> anyhow::Result<()>
where
    T: Serialize + Tabled + Clone,
{
    let table = match table {
        Ok(t) => t,
        Err(e) if e.is_unavailable() => {
            println!("{}: {}\n", title, e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let path = out_dir.join(file);
    write_csv(&path, &table.rows).with_context(|| format!("writing {}", path.display()))?;
    preview_table(title, Some(note), &table.rows, preview_rows);
    if table.excluded > 0 {
        println!("Note: {} rows excluded (missing values).", format_int(table.excluded));
    }
    println!("(Full table exported to {})\n", path.display());
    Ok(())
}

fn handle_generate_reports(state: &AppState) -> anyhow::Result<()> {
    let Some(snapshot) = state.snapshot.as_ref() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return Ok(());
    };
    let out = &state.config.output;
    std::fs::create_dir_all(&out.dir)
        .with_context(|| format!("creating {}", out.dir.display()))?;

    let selection = snapshot.select(&state.filter);
    info!(rows = selection.len(), all = state.filter.is_all(), "generating reports");
    if selection.is_empty() {
        println!("No rows match the current filters.\n");
    }

    let top_n = reports::worst_districts(snapshot, &selection, out.top_n).map(|rows| Derived { rows, excluded: 0 });
    emit_table(
        &out.dir,
        "worst_districts.csv",
        &format!("Top {} Worst Districts (Lowest ARI)", out.top_n),
        "Lower ARI => higher authentication vulnerability",
        out.preview_rows,
        top_n,
    )?;

    let counts = reports::risk_counts(snapshot, &selection).map(|rows| Derived { rows, excluded: 0 });
    emit_table(&out.dir, "risk_distribution.csv", "Risk Distribution", "Records per risk category", out.preview_rows, counts)?;

    emit_table(
        &out.dir,
        "priority_ranking.csv",
        "Intervention Priority Ranking",
        "Scores are relative to the current selection only",
        out.preview_rows,
        reports::priority_ranking(snapshot, &selection),
    )?;
    emit_table(
        &out.dir,
        "early_warnings.csv",
        "Early Warnings",
        "ARI dropped more than 15% from the previous month",
        out.preview_rows,
        reports::early_warnings(snapshot, &selection),
    )?;
    emit_table(
        &out.dir,
        "risk_transitions.csv",
        "Risk Escalations",
        "Medium -> High since the previous month",
        out.preview_rows,
        reports::risk_transitions(snapshot, &selection),
    )?;
    emit_table(
        &out.dir,
        "action_plan.csv",
        "Recommended Intervention Plan",
        "Forecast = current ARI + last monthly change",
        out.preview_rows,
        reports::action_plan(snapshot, &selection),
    )?;

    match reports::generate_summary(snapshot, &selection) {
        Ok(summary) => {
            let path = out.dir.join("summary.json");
            write_json(&path, &summary).with_context(|| format!("writing {}", path.display()))?;
            println!("Summary Stats ({}):", path.display());
            println!(
                "Total Records: {} | Average ARI: {} | High: {} | Medium: {} | Low: {}",
                format_int(summary.total_records),
                format_number(summary.average_ari, 3),
                format_int(summary.high_risk),
                format_int(summary.medium_risk),
                format_int(summary.low_risk)
            );
            if let Some(worst) = &summary.worst_district {
                println!("Worst District: {}", worst);
            }
            if let Some(best) = &summary.best_district {
                println!("Best District: {}", best);
            }
            let opt = |v: Option<usize>| format_opt(v.map(|n| n as f64), 0);
            println!(
                "Early warnings: {} | Risk escalations: {} | Escalate intervention: {}\n",
                opt(summary.early_warnings),
                opt(summary.risk_escalations),
                opt(summary.escalate_interventions)
            );
        }
        Err(e @ AriError::MissingColumn { .. }) => println!("Summary: {}\n", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ari_report=info,warn")),
        )
        .init();

    let config = Config::load().context("loading configuration")?;
    info!(data = %config.data.path.display(), output = %config.output.dir.display(), "configuration loaded");

    let mut state = AppState {
        config,
        cache: SnapshotCache::new(),
        snapshot: None,
        filter: Filter::default(),
    };

    loop {
        println!("ARI District Analytics");
        println!("[1] Load the file");
        println!("[2] Set filters");
        println!("[3] Generate Reports\n");
        match read_choice().as_str() {
            "1" => handle_load(&mut state),
            "2" => handle_filters(&mut state),
            "3" => {
                println!();
                handle_generate_reports(&state)?;
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
    Ok(())
}
