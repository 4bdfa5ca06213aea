use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use sippex_core::error::{Result, SippexError};

/// Stats file written by `sipp -trace_stat` when no `-stf` is given.
pub const DEFAULT_SOURCE: &str = "/var/log/sipp/sipp_trace_stat.log";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub version: u32,

    #[serde(default)]
    pub exporter: ExporterSection,

    /// Stats files to tail: literal paths or glob patterns.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            exporter: ExporterSection::default(),
            sources: vec![DEFAULT_SOURCE.to_string()],
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(SippexError::UnsupportedVersion);
        }
        if self.sources.is_empty() {
            return Err(SippexError::Config("sources must not be empty".into()));
        }
        if self.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(SippexError::Config("sources must not contain blank entries".into()));
        }

        self.exporter.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ExporterSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ExporterSection {
    pub fn validate(&self) -> Result<()> {
        if !(10..=10000).contains(&self.poll_interval_ms) {
            return Err(SippexError::Config(
                "exporter.poll_interval_ms must be between 10 and 10000".into(),
            ));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            SippexError::Config(format!("exporter.listen must be a valid SocketAddr: {e}"))
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Replace the host part of `listen`, keeping the port.
    pub fn set_listen_host(&mut self, host: &str) {
        let port = self
            .listen
            .rsplit_once(':')
            .map(|(_, p)| p.to_string())
            .unwrap_or_else(|| DEFAULT_PORT.to_string());
        self.listen = join_host_port(host, &port);
    }

    /// Replace the port part of `listen`, keeping the host.
    pub fn set_listen_port(&mut self, port: &str) -> Result<()> {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| SippexError::Config(format!("invalid listen port: {port:?}")))?;
        let host = self
            .listen
            .rsplit_once(':')
            .map(|(h, _)| h.to_string())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        self.listen = join_host_port(&host, &port.to_string());
        Ok(())
    }
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8436;

fn join_host_port(host: &str, port: &str) -> String {
    // bare IPv6 needs brackets
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

fn default_listen() -> String {
    format!("{DEFAULT_HOST}:{DEFAULT_PORT}")
}
fn default_poll_interval_ms() -> u64 {
    250
}
