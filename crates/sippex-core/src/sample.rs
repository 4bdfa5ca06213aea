//! Timestamped metric sample.

use std::fmt;
use std::sync::Arc;

/// One typed observation taken from a stats row.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    name: Arc<str>,
    value: f64,
    timestamp: i64,
}

impl Sample {
    pub fn new(name: impl Into<Arc<str>>, value: f64, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn value(&self) -> f64 { self.value }
    pub fn timestamp(&self) -> i64 { self.timestamp }
}

/// Exposition line: `<name> <value> <timestamp>`.
impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.value, self.timestamp)
    }
}
