//! sippex exporter library entry.
//!
//! Wires config loading, the per-file stats readers, and the HTTP
//! exposition endpoint into one service. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod ops;
pub mod reader;
pub mod router;
