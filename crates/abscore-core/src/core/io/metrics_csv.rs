use super::aliases::{canonical_column, is_absent_token};
use super::traits::MetricSource;
use crate::core::models::ids::{ChallengeId, DesignKey, MetricId};
use crate::core::models::metric::MetricValue;
use crate::core::models::record::MetricRecord;
use std::collections::HashMap;
use std::io::{self, Read};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MetricsCsvError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Required column '{0}' is missing")]
    MissingColumn(&'static str),
    #[error("Line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// One row per `(team, challenge, design, metric, value[, warning])` tuple.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongCsv;

/// One row per design with one column per metric.
///
/// When the file has no `challenge` column (or a row leaves it empty), the default
/// challenge is used.
#[derive(Debug, Clone, Default)]
pub struct WideCsv {
    default_challenge: Option<ChallengeId>,
}

impl WideCsv {
    pub fn new(default_challenge: Option<ChallengeId>) -> Self {
        Self { default_challenge }
    }
}

pub fn read_long(reader: impl Read) -> Result<Vec<MetricRecord>, MetricsCsvError> {
    LongCsv.read_from(reader)
}

pub fn read_wide(
    reader: impl Read,
    default_challenge: Option<&ChallengeId>,
) -> Result<Vec<MetricRecord>, MetricsCsvError> {
    WideCsv::new(default_challenge.cloned()).read_from(reader)
}

impl MetricSource for LongCsv {
    type Error = MetricsCsvError;

    fn read_from(&self, reader: impl Read) -> Result<Vec<MetricRecord>, MetricsCsvError> {
        let mut csv = csv_reader(reader);
        let headers = canonical_headers(&mut csv)?;
        let team = require(&headers, "team")?;
        let challenge = require(&headers, "challenge")?;
        let design = require(&headers, "design")?;
        let metric = require(&headers, "metric")?;
        let value = require(&headers, "value")?;
        let warning = find(&headers, "warning");

        let mut records: Vec<MetricRecord> = Vec::new();
        let mut index: HashMap<DesignKey, usize> = HashMap::new();
        let mut rows = 0usize;

        for row in csv.records() {
            let row = row?;
            let line = line_of(&row);
            let key = DesignKey::new(
                cell(&row, team),
                cell(&row, challenge),
                cell(&row, design),
            );
            check_key(&key, line)?;

            let metric_name = canonical_column(cell(&row, metric));
            if metric_name.is_empty() {
                return Err(MetricsCsvError::InvalidRow {
                    line,
                    reason: "metric name is empty".to_string(),
                });
            }

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    index.insert(key.clone(), records.len());
                    records.push(MetricRecord::new(key));
                    records.len() - 1
                }
            };
            apply_cell(
                &mut records[slot],
                MetricId::new(metric_name),
                cell(&row, value),
                warning.map(|i| cell(&row, i)),
            );
            rows += 1;
        }

        debug!(rows, designs = records.len(), "Parsed long-format metrics");
        Ok(records)
    }
}

impl MetricSource for WideCsv {
    type Error = MetricsCsvError;

    fn read_from(&self, reader: impl Read) -> Result<Vec<MetricRecord>, MetricsCsvError> {
        let mut csv = csv_reader(reader);
        let headers = canonical_headers(&mut csv)?;
        let team = require(&headers, "team")?;
        let design = require(&headers, "design")?;
        let challenge = find(&headers, "challenge");
        let warning = find(&headers, "warning");
        if challenge.is_none() && self.default_challenge.is_none() {
            return Err(MetricsCsvError::MissingColumn("challenge"));
        }

        let identity = [Some(team), Some(design), challenge, warning];
        let metric_columns: Vec<(usize, MetricId)> = headers
            .iter()
            .enumerate()
            .filter(|(i, name)| !name.is_empty() && !identity.contains(&Some(*i)))
            .map(|(i, name)| (i, MetricId::new(name)))
            .collect();

        let mut records = Vec::new();
        for row in csv.records() {
            let row = row?;
            let line = line_of(&row);
            let challenge_id = challenge
                .map(|i| cell(&row, i))
                .filter(|c| !c.is_empty())
                .map(ChallengeId::new)
                .or_else(|| self.default_challenge.clone())
                .ok_or_else(|| MetricsCsvError::InvalidRow {
                    line,
                    reason: "challenge is empty and no default challenge was given".to_string(),
                })?;
            let key = DesignKey::new(cell(&row, team), challenge_id, cell(&row, design));
            check_key(&key, line)?;

            let mut record = MetricRecord::new(key);
            if let Some(i) = warning {
                cell(&row, i)
                    .split(';')
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .for_each(|w| record.add_warning(w));
            }
            for (i, metric) in &metric_columns {
                apply_cell(&mut record, metric.clone(), cell(&row, *i), None);
            }
            records.push(record);
        }

        debug!(
            designs = records.len(),
            metrics = metric_columns.len(),
            "Parsed wide-format metrics"
        );
        Ok(records)
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn canonical_headers<R: Read>(csv: &mut csv::Reader<R>) -> Result<Vec<String>, MetricsCsvError> {
    Ok(csv.headers()?.iter().map(canonical_column).collect())
}

fn find(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

fn require(headers: &[String], name: &'static str) -> Result<usize, MetricsCsvError> {
    find(headers, name).ok_or(MetricsCsvError::MissingColumn(name))
}

fn cell(row: &csv::StringRecord, index: usize) -> &str {
    row.get(index).unwrap_or("")
}

fn line_of(row: &csv::StringRecord) -> u64 {
    row.position().map_or(0, csv::Position::line)
}

fn check_key(key: &DesignKey, line: u64) -> Result<(), MetricsCsvError> {
    let missing = if key.team.is_empty() {
        "team"
    } else if key.design.is_empty() {
        "design"
    } else if key.challenge.as_str().is_empty() {
        "challenge"
    } else {
        return Ok(());
    };
    Err(MetricsCsvError::InvalidRow {
        line,
        reason: format!("{} is empty", missing),
    })
}

/// Parses a cell into a metric value. `None` means the text is not a number at all.
fn parse_value(raw: &str) -> Option<MetricValue> {
    if is_absent_token(raw) {
        return Some(MetricValue::Absent);
    }
    raw.trim().parse::<f64>().ok().map(MetricValue::Present)
}

fn apply_cell(record: &mut MetricRecord, metric: MetricId, raw: &str, warning: Option<&str>) {
    let warning = warning
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(|w| format!("{}: {}", metric, w));

    match parse_value(raw) {
        Some(MetricValue::Present(value)) => {
            record.record_value(metric, value);
            if let Some(text) = warning {
                record.add_warning(text);
            }
        }
        Some(MetricValue::Absent) => record.record(metric, MetricValue::Absent, warning),
        None => {
            let text = format!("{}: unparseable value '{}' treated as absent", metric, raw.trim());
            record.record(metric, MetricValue::Absent, Some(text));
            if let Some(text) = warning {
                record.add_warning(text);
            }
        }
    }
}
