//! sippex core: SIPp statistics ingestion primitives.
//!
//! Header normalization, the metric type registry, the bounded sample
//! queue, row ingestion and scrape rendering. This crate carries no
//! runtime or transport dependencies; the exporter crate wires these
//! pieces to files and HTTP.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed rows
//! and unparseable fields surface as `SippexError` so a bad line never
//! takes a reader down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod normalize;
pub mod queue;
pub mod registry;
pub mod sample;
pub mod stats;

/// Shared result type.
pub use error::{ErrorCode, Result, SippexError};
pub use queue::{SampleQueue, QUEUE_CAPACITY};
pub use registry::{MetricKind, MetricMetadata, MetricTypeRegistry, ValueFormat};
pub use sample::Sample;
