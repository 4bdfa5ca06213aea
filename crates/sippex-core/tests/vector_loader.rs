//! JSON test vector loader shared by normalization/format tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use sippex_core::ValueFormat;

#[derive(Debug, Deserialize)]
pub struct HeaderVector {
    pub description: String,
    pub raw: String,
    #[serde(default)]
    pub expect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValueVector {
    pub description: String,
    pub raw: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl ValueVector {
    pub fn expected_format(&self) -> Option<ValueFormat> {
        self.format.as_deref().map(|f| match f {
            "numeric" => ValueFormat::Numeric,
            "timer_millis" => ValueFormat::TimerMillis,
            "timer" => ValueFormat::Timer,
            other => panic!("unsupported format in test vector: {other}"),
        })
    }
}

pub fn load<T: DeserializeOwned>(name: &str) -> Vec<T> {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).expect("invalid test vector file")
}
