//! Metric type registry.
//!
//! Maps a normalized metric name to its kind (gauge/counter) and value
//! format. Entries are created once, on the first observation whose raw
//! value has a recognizable shape, and never change afterwards. Every
//! registration appends one `# TYPE` declaration line; declarations keep
//! registration order.

use std::fmt::{self, Write};
use std::sync::{Mutex, MutexGuard};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Exposition type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Periodic snapshot (`(P)` columns).
    Gauge,
    /// Cumulative since generator start.
    Counter,
}

impl MetricKind {
    /// Names ending in `p` are periodic and therefore gauges.
    pub fn infer(name: &str) -> Self {
        if name.ends_with('p') {
            MetricKind::Gauge
        } else {
            MetricKind::Counter
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw value shape, fixed per metric at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Plain number, taken as-is.
    Numeric,
    /// `H:MM:SS:mmm` -> milliseconds.
    TimerMillis,
    /// `H:MM:SS` -> milliseconds.
    Timer,
}

impl ValueFormat {
    /// Detect the format of a raw field. `None` when nothing matches.
    pub fn infer(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if parse_numeric(raw).is_some() {
            return Some(ValueFormat::Numeric);
        }
        match timer_groups(raw)?.len() {
            4 => Some(ValueFormat::TimerMillis),
            3 => Some(ValueFormat::Timer),
            _ => None,
        }
    }

    /// Convert a raw field with this format. `None` when the value does
    /// not have the registered shape.
    pub fn parse(self, raw: &str) -> Option<f64> {
        let raw = raw.trim();
        match self {
            ValueFormat::Numeric => parse_numeric(raw),
            ValueFormat::TimerMillis => match timer_groups(raw)?.as_slice() {
                [h, m, s, ms] => Some(hms_millis(*h, *m, *s) + *ms as f64),
                _ => None,
            },
            ValueFormat::Timer => match timer_groups(raw)?.as_slice() {
                [h, m, s] => Some(hms_millis(*h, *m, *s)),
                _ => None,
            },
        }
    }
}

fn parse_numeric(raw: &str) -> Option<f64> {
    // `f64::from_str` also accepts "inf"/"NaN"; SIPp never writes those.
    if raw.is_empty()
        || !raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn timer_groups(raw: &str) -> Option<Vec<u64>> {
    raw.split(':')
        .map(|g| {
            if g.is_empty() || !g.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            g.parse::<u64>().ok()
        })
        .collect()
}

fn hms_millis(h: u64, m: u64, s: u64) -> f64 {
    (h as f64 * 3600.0 + m as f64 * 60.0 + s as f64) * 1000.0
}

/// Kind and value format of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricMetadata {
    pub kind: MetricKind,
    pub format: ValueFormat,
}

impl MetricMetadata {
    pub fn parse(&self, raw: &str) -> Option<f64> {
        self.format.parse(raw)
    }
}

/// Shared name -> metadata cache plus the `# TYPE` declaration buffer.
#[derive(Default)]
pub struct MetricTypeRegistry {
    types: DashMap<String, MetricMetadata>,
    declarations: Mutex<Vec<String>>,
}

impl MetricTypeRegistry {
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
            declarations: Mutex::new(Vec::new()),
        }
    }

    fn declarations_lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.declarations.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the metadata for `name`, registering it from `raw` on first
    /// sight. Unrecognized values leave the name unregistered.
    pub fn resolve(&self, name: &str, raw: &str) -> Option<MetricMetadata> {
        if let Some(meta) = self.types.get(name) {
            return Some(*meta);
        }

        // The entry guard holds the shard lock, so only one caller can
        // register a given name and push its declaration. A caller that lost
        // the race gets the winner's metadata whatever its own raw value.
        match self.types.entry(name.to_string()) {
            Entry::Occupied(e) => Some(*e.get()),
            Entry::Vacant(e) => {
                let format = ValueFormat::infer(raw)?;
                let meta = MetricMetadata {
                    kind: MetricKind::infer(name),
                    format,
                };
                self.declarations_lock()
                    .push(format!("# TYPE {} {}", name, meta.kind));
                e.insert(meta);
                tracing::debug!(
                    metric = %name,
                    kind = %meta.kind,
                    format = ?meta.format,
                    "metric registered"
                );
                Some(meta)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<MetricMetadata> {
        self.types.get(name).map(|m| *m)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Snapshot of the declaration lines, in registration order.
    pub fn declarations(&self) -> Vec<String> {
        self.declarations_lock().clone()
    }

    /// Append every declaration line to `out`.
    pub fn render_declarations(&self, out: &mut String) {
        for line in self.declarations_lock().iter() {
            let _ = writeln!(out, "{line}");
        }
    }
}
