//! SIPp `-trace_stat` row parsing.
//!
//! Row layout (semicolon separated):
//! - row 1: header names, trailing empty columns allowed
//! - column 2 of a data row: `date \t time \t epoch` triplet, the epoch is the row timestamp
//! - columns 3.. : metric values paired with the normalized header name

use std::sync::Arc;

use crate::error::{Result, SippexError};
use crate::normalize::normalize_header;
use crate::queue::SampleQueue;
use crate::registry::MetricTypeRegistry;
use crate::sample::Sample;

/// Field separator of the stats file.
pub const FIELD_SEPARATOR: char = ';';
/// Column holding the timestamp triplet.
pub const TIMESTAMP_COLUMN: usize = 2;
/// First column carrying a metric value.
pub const FIRST_METRIC_COLUMN: usize = 3;

/// Normalized header list; `None` marks an ignored (blank) column.
#[derive(Debug, Clone)]
pub struct HeaderRow {
    columns: Vec<Option<Arc<str>>>,
}

impl HeaderRow {
    /// Parse a header line. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = trim_line(line);
        if line.trim().is_empty() {
            return None;
        }
        let columns = line
            .split(FIELD_SEPARATOR)
            .map(|raw| normalize_header(raw).map(Arc::<str>::from))
            .collect();
        Some(Self { columns })
    }

    pub fn columns(&self) -> &[Option<Arc<str>>] {
        &self.columns
    }

    /// Normalized names of the metric columns, in column order.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .skip(FIRST_METRIC_COLUMN)
            .filter_map(|c| c.as_deref())
    }

    /// Minimum field count of a well-formed data row.
    fn required_len(&self) -> usize {
        let last_named = self
            .columns
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |i| i + 1);
        last_named.max(TIMESTAMP_COLUMN + 1)
    }
}

/// Outcome of ingesting one data row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RowReport {
    pub pushed: usize,
    pub skipped: usize,
    pub evicted: usize,
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Extract the integer timestamp from the `date \t time \t epoch` triplet.
pub fn parse_timestamp(field: &str) -> Result<i64> {
    let last = field.rsplit('\t').next().unwrap_or_default().trim();
    match last.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v.trunc() as i64),
        _ => Err(SippexError::MalformedRow(format!(
            "bad timestamp field: {field:?}"
        ))),
    }
}

/// Turn one data row into samples and push them onto `queue`.
///
/// Short rows and rows with an unreadable timestamp fail as a whole;
/// individual unparseable fields are skipped with a warning.
pub fn ingest_row(
    headers: &HeaderRow,
    line: &str,
    registry: &MetricTypeRegistry,
    queue: &SampleQueue,
) -> Result<RowReport> {
    let fields: Vec<&str> = trim_line(line).split(FIELD_SEPARATOR).collect();

    let required = headers.required_len();
    if fields.len() < required {
        return Err(SippexError::MalformedRow(format!(
            "expected {required} columns, got {}",
            fields.len()
        )));
    }

    let ts_field = fields
        .get(TIMESTAMP_COLUMN)
        .ok_or_else(|| SippexError::MalformedRow("missing timestamp column".into()))?;
    let timestamp = parse_timestamp(ts_field)?;

    let mut report = RowReport::default();
    let columns = headers.columns.iter().zip(fields.iter()).skip(FIRST_METRIC_COLUMN);

    for (column, raw) in columns {
        let Some(name) = column else { continue; };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let value = registry
            .resolve(name, raw)
            .and_then(|meta| meta.parse(raw));
        let Some(value) = value else {
            let err = SippexError::UnrecognizedValue {
                name: name.to_string(),
                raw: raw.to_string(),
            };
            tracing::warn!(code = err.code().as_str(), error = %err, "field skipped");
            report.skipped += 1;
            continue;
        };

        if let Some(old) = queue.push(Sample::new(Arc::clone(name), value, timestamp)) {
            tracing::trace!(
                metric = %old.name(),
                ts = old.timestamp(),
                "queue full, oldest sample evicted"
            );
            report.evicted += 1;
        }
        report.pushed += 1;
    }

    Ok(report)
}
