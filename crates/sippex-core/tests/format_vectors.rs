//! Header normalization and value format vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use sippex_core::normalize::normalize_header;

mod vector_loader;
use vector_loader::{HeaderVector, ValueVector};

#[test]
fn header_vectors() {
    let vectors: Vec<HeaderVector> = vector_loader::load("headers.json");
    assert!(!vectors.is_empty());

    for v in vectors {
        let got = normalize_header(&v.raw);
        assert_eq!(got, v.expect, "vector={}", v.description);
    }
}

#[test]
fn normalization_is_deterministic() {
    let vectors: Vec<HeaderVector> = vector_loader::load("headers.json");
    for v in vectors {
        assert_eq!(normalize_header(&v.raw), normalize_header(&v.raw), "vector={}", v.description);
    }
}

#[test]
fn value_vectors() {
    let vectors: Vec<ValueVector> = vector_loader::load("values.json");

    for v in vectors {
        let format = sippex_core::ValueFormat::infer(&v.raw);
        assert_eq!(format, v.expected_format(), "vector={}", v.description);

        match (format, v.value) {
            (Some(f), Some(expected)) => {
                let got = f.parse(&v.raw).expect("registered format must parse");
                assert!((got - expected).abs() < 1e-9, "vector={} got={got}", v.description);
            }
            (None, None) => {}
            _ => panic!("vector={} has inconsistent expectations", v.description),
        }
    }
}
