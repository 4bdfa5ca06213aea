//! Metric type registry: kind inference, first-wins immutability, races.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Barrier};
use std::thread;

use sippex_core::{MetricKind, MetricTypeRegistry, ValueFormat};

#[test]
fn kind_is_gauge_iff_name_ends_in_p() {
    let reg = MetricTypeRegistry::new();
    let cases = [
        ("sipp_call_rate_p", MetricKind::Gauge),
        ("sipp_call_rate_c", MetricKind::Counter),
        ("sipp_current_call", MetricKind::Counter),
        ("sipp_target_rate", MetricKind::Counter),
        ("sipp_watchdog_minor_p", MetricKind::Gauge),
    ];
    for (name, kind) in cases {
        assert_eq!(reg.resolve(name, "1").unwrap().kind, kind, "name={name}");
        assert_eq!(MetricKind::infer(name), kind, "name={name}");
    }
}

#[test]
fn first_registration_wins() {
    let reg = MetricTypeRegistry::new();

    let first = reg.resolve("sipp_elapsed_time_p", "00:00:05:250").unwrap();
    assert_eq!(first.format, ValueFormat::TimerMillis);

    // A later, differently shaped value keeps the original parser.
    let again = reg.resolve("sipp_elapsed_time_p", "17").unwrap();
    assert_eq!(again, first);
    assert_eq!(again.parse("17"), None);

    // Even an unparseable value returns the registered metadata.
    assert_eq!(reg.resolve("sipp_elapsed_time_p", "garbage"), Some(first));
    assert_eq!(reg.declarations().len(), 1);
}

#[test]
fn declarations_keep_registration_order() {
    let reg = MetricTypeRegistry::new();
    reg.resolve("sipp_b_c", "1");
    reg.resolve("sipp_a_p", "1");
    reg.resolve("sipp_skipped", "???");
    reg.resolve("sipp_b_c", "2");

    assert_eq!(
        reg.declarations(),
        ["# TYPE sipp_b_c counter", "# TYPE sipp_a_p gauge"]
    );

    let mut out = String::new();
    reg.render_declarations(&mut out);
    assert_eq!(out, "# TYPE sipp_b_c counter\n# TYPE sipp_a_p gauge\n");
}

#[test]
fn concurrent_registration_declares_once() {
    let reg = Arc::new(MetricTypeRegistry::new());
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let reg = Arc::clone(&reg);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Half the racers see a timer, half a number: only one shape may win.
                let raw = if i % 2 == 0 { "00:00:01" } else { "3" };
                reg.resolve("sipp_call_length_c", raw).unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winner = results[0];
    assert!(results.iter().all(|m| *m == winner));
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.declarations(), ["# TYPE sipp_call_length_c counter"]);
}
