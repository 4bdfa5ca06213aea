//! Top-level facade crate for sippex.
//!
//! Re-exports the core pipeline and the exporter service so users can depend on a single crate.

pub mod core {
    pub use sippex_core::*;
}

pub mod exporter {
    pub use sippex_exporter::*;
}
