//! Source list expansion.
//!
//! Entries containing `*`, `?` or `[` are glob patterns and must match at
//! least one file. Literal paths are passed through; the reader reports a
//! missing file when it opens it. Duplicates collapse, first one wins.

use std::path::PathBuf;

use sippex_core::error::{Result, SippexError};

use super::ExporterConfig;

fn is_pattern(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

impl ExporterConfig {
    /// Expand `sources` into the ordered list of files to tail.
    pub fn resolve_sources(&self) -> Result<Vec<PathBuf>> {
        let mut out: Vec<PathBuf> = Vec::new();

        for entry in &self.sources {
            let entry = entry.trim();
            if !is_pattern(entry) {
                push_unique(&mut out, PathBuf::from(entry));
                continue;
            }

            let paths = glob::glob(entry)
                .map_err(|e| {
                    SippexError::Config(format!("invalid source pattern {entry:?}: {e}"))
                })?;

            let mut matched: Vec<PathBuf> = paths
                .filter_map(|p| match p {
                    Ok(p) => Some(p),
                    Err(e) => {
                        tracing::warn!(
                            pattern = %entry,
                            error = %e,
                            "unreadable glob match skipped"
                        );
                        None
                    }
                })
                .filter(|p| p.is_file())
                .collect();
            matched.sort();

            if matched.is_empty() {
                return Err(SippexError::Config(format!(
                    "source pattern {entry:?} matched no files"
                )));
            }
            for p in matched {
                push_unique(&mut out, p);
            }
        }

        Ok(out)
    }
}

fn push_unique(out: &mut Vec<PathBuf>, p: PathBuf) {
    if !out.contains(&p) {
        out.push(p);
    }
}
