use crate::core::scoring::{CATEGORY_DECIMALS, FINAL_DECIMALS, METRIC_DECIMALS};
use crate::engine::table::{ReportLayout, ReportRow, ScoreTable};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes one row per design. `ranked` orders rows by final score instead of insertion order.
pub fn write_table<W: Write>(
    writer: W,
    table: &ScoreTable,
    layout: &ReportLayout,
    ranked: bool,
) -> Result<(), ReportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(header(layout))?;

    if ranked {
        for record in table.ranked() {
            csv.write_record(cells(&ReportRow::from_record(record, layout)))?;
        }
    } else {
        for row in table.rows(layout) {
            csv.write_record(cells(&row))?;
        }
    }
    csv.flush()?;
    Ok(())
}

pub fn write_table_to_path<P: AsRef<Path>>(
    path: P,
    table: &ScoreTable,
    layout: &ReportLayout,
    ranked: bool,
) -> Result<(), ReportError> {
    let file = File::create(path.as_ref())?;
    write_table(BufWriter::new(file), table, layout, ranked)?;
    info!(
        path = %path.as_ref().display(),
        designs = table.len(),
        "Wrote score report"
    );
    Ok(())
}

fn header(layout: &ReportLayout) -> Vec<String> {
    let mut columns = vec!["team".to_string(), "challenge".into(), "design".into()];
    columns.extend(layout.metrics().iter().map(|m| m.to_string()));
    columns.extend(layout.metrics().iter().map(|m| format!("{}_score", m)));
    columns.extend(layout.categories().iter().map(|c| format!("{}_score", c)));
    columns.extend(
        ["final_score", "viable", "fail_reason", "warnings"]
            .into_iter()
            .map(String::from),
    );
    columns
}

fn cells(row: &ReportRow) -> Vec<String> {
    let mut cells = vec![
        row.key.team.clone(),
        row.key.challenge.to_string(),
        row.key.design.clone(),
    ];
    cells.extend(row.raw.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
    cells.extend(row.metric_scores.iter().map(|v| fixed(*v, METRIC_DECIMALS)));
    cells.extend(row.category_scores.iter().map(|v| fixed(*v, CATEGORY_DECIMALS)));
    cells.push(fixed(row.final_score, FINAL_DECIMALS));
    cells.push(row.viable.to_string());
    cells.push(row.fail_reason.clone().unwrap_or_default());
    cells.push(row.warnings.join("; "));
    cells
}

/// Absent renders as an empty cell, never as `0`.
fn fixed(value: Option<f64>, decimals: i32) -> String {
    value
        .map(|v| format!("{:.*}", decimals.max(0) as usize, v))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::DesignKey;
    use crate::core::models::record::MetricRecord;
    use crate::core::profile::ProfileRegistry;
    use crate::engine::progress::ProgressReporter;
    use crate::workflows::score::run;
    use tempfile::tempdir;

    fn scored_table() -> (ScoreTable, ReportLayout) {
        let registry = ProfileRegistry::builtin().unwrap();
        let mut low = MetricRecord::new(DesignKey::new("Alpha", "challenge1", "low"));
        low.record_value("ipsae", 0.55);
        low.record_failure("dockq", "dockq: DockQ crashed");
        let mut high = MetricRecord::new(DesignKey::new("Beta", "challenge2", "high"));
        for (id, v) in [
            ("prodigy_dg", -13.0),
            ("ipsae", 0.94),
            ("netsolp", 0.6),
            ("cdr_sasa", 887.5),
            ("cdrh3_identity", 60.0),
        ] {
            high.record_value(id, v);
        }
        let outcome = run(&[low, high], &registry, &ProgressReporter::new()).unwrap();
        let layout = ReportLayout::for_table(&outcome.table, &registry);
        (outcome.table, layout)
    }

    fn render(ranked: bool) -> Vec<Vec<String>> {
        let (table, layout) = scored_table();
        let mut buffer = Vec::new();
        write_table(&mut buffer, &table, &layout, ranked).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(buffer.as_slice());
        reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn header_lists_raw_then_scores_then_summary() {
        let rows = render(false);
        assert_eq!(
            rows[0],
            [
                "team",
                "challenge",
                "design",
                "prodigy_dg",
                "ipsae",
                "dockq",
                "netsolp",
                "cdr_sasa",
                "cdrh3_identity",
                "prodigy_dg_score",
                "ipsae_score",
                "dockq_score",
                "netsolp_score",
                "cdr_sasa_score",
                "cdrh3_identity_score",
                "binding_score",
                "developability_score",
                "novelty_score",
                "final_score",
                "viable",
                "fail_reason",
                "warnings",
            ]
        );
    }

    #[test]
    fn absent_values_are_empty_cells() {
        let rows = render(false);
        let low = &rows[1];
        assert_eq!(low[2], "low");
        assert_eq!(low[3], "");
        assert_eq!(low[4], "0.55");
        assert_eq!(low[5], "");
        assert_eq!(low[10], "25.00");
        assert_eq!(low[11], "");
        assert_eq!(low[15], "25.00");
        assert_eq!(low[16], "");
        assert_eq!(low[18], "25.0");
        assert_eq!(low[19], "false");
        assert_eq!(low[20], "ipSAE < 0.60");
        assert!(low[21].starts_with("dockq: DockQ crashed"));
    }

    #[test]
    fn challenge2_rows_leave_dockq_empty() {
        let rows = render(false);
        let high = &rows[2];
        assert_eq!(high[1], "challenge2");
        assert_eq!(high[5], "");
        assert_eq!(high[11], "");
        assert_eq!(high[15], "84.29");
        assert_eq!(high[18], "71.1");
        assert_eq!(high[19], "true");
        assert_eq!(high[21], "");
    }

    #[test]
    fn ranked_output_puts_best_first() {
        let rows = render(true);
        assert_eq!(rows[1][2], "high");
        assert_eq!(rows[2][2], "low");
    }

    #[test]
    fn write_to_path_creates_the_file() {
        let (table, layout) = scored_table();
        let dir = tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        write_table_to_path(&path, &table, &layout, false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
