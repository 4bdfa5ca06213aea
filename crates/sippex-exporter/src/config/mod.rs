//! Exporter config loader (strict parsing).
//!
//! Sources, in order of precedence:
//! - environment overrides (`SIPP_TRACE_STAT`, `SIPP_EXPORTER_ADDR`, `SIPP_EXPORTER_PORT`)
//! - the YAML file (`SIPPEX_CONFIG`, default `sippex.yaml`), when present
//! - built-in defaults

pub mod schema;
pub mod sources;

use std::fs;
use std::io;

use sippex_core::error::{Result, SippexError};

pub use schema::{ExporterConfig, ExporterSection, DEFAULT_SOURCE};

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "SIPPEX_CONFIG";
/// Config file used when `SIPPEX_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "sippex.yaml";

pub const ENV_TRACE_STAT: &str = "SIPP_TRACE_STAT";
pub const ENV_ADDR: &str = "SIPP_EXPORTER_ADDR";
pub const ENV_PORT: &str = "SIPP_EXPORTER_PORT";

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse_str(s: &str) -> Result<ExporterConfig> {
    serde_yaml::from_str(s).map_err(|e| SippexError::Config(format!("invalid yaml: {e}")))
}

/// Load `path` if it exists (defaults otherwise), apply env overrides from
/// `env`, then validate.
pub fn load<F>(path: &str, env: F) -> Result<ExporterConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match fs::read_to_string(path) {
        Ok(s) => parse_str(&s)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(%path, "config file not found, using defaults");
            ExporterConfig::default()
        }
        Err(e) => return Err(SippexError::io(path, e)),
    };

    apply_env_overrides(&mut cfg, env)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn apply_env_overrides<F>(cfg: &mut ExporterConfig, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(file) = set(ENV_TRACE_STAT) {
        cfg.sources = vec![file];
    }
    if let Some(addr) = set(ENV_ADDR) {
        cfg.exporter.set_listen_host(addr.trim());
    }
    if let Some(port) = set(ENV_PORT) {
        cfg.exporter.set_listen_port(&port)?;
    }
    Ok(())
}
