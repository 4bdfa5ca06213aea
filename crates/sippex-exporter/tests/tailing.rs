//! Stats reader: header handling, partial rows, tail-after-EOF, stop.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sippex_core::{MetricTypeRegistry, Sample};
use sippex_exporter::reader::{ReaderState, StatsReader, MAX_ROWS_PER_POLL};

const HEADER: &str = "StartTime;LastResetTime;CurrentTime;TargetRate;CallRate(P);\n";
const POLL: Duration = Duration::from_millis(10);

fn data_row(ts: i64, rate: &str) -> String {
    format!("s;r;2024-01-15\t10:00:00.000000\t{ts}.250000;10;{rate};\n")
}

fn append(path: &Path, s: &str) {
    append_bytes(path, s.as_bytes());
}

fn append_bytes(path: &Path, b: &[u8]) {
    let mut f = OpenOptions::new().append(true).open(path).unwrap();
    f.write_all(b).unwrap();
    f.flush().unwrap();
}

async fn open_reader(path: &Path) -> StatsReader {
    StatsReader::open(path, Arc::new(MetricTypeRegistry::new()), POLL)
        .await
        .unwrap()
}

fn rendered(samples: &[Sample]) -> Vec<String> {
    let mut out: Vec<String> = samples.iter().map(Sample::to_string).collect();
    out.sort();
    out
}

async fn wait_for(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let res = StatsReader::open(
        dir.path().join("nope.csv"),
        Arc::new(MetricTypeRegistry::new()),
        POLL,
    )
    .await;

    let err = res.err().expect("open must fail");
    assert_eq!(err.code().as_str(), "IO");
}

#[tokio::test]
async fn header_is_read_at_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stat.csv");
    fs::write(&path, format!("\n{HEADER}")).unwrap();

    let reader = open_reader(&path).await;
    let names: Vec<&str> = reader.headers().unwrap().metric_names().collect();
    assert_eq!(names, ["sipp_target_rate", "sipp_call_rate_p"]);
    assert_eq!(reader.state(), ReaderState::Init);
}

#[tokio::test]
async fn header_written_after_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stat.csv");
    fs::write(&path, "").unwrap();

    let mut reader = open_reader(&path).await;
    assert!(reader.headers().is_none());
    assert_eq!(reader.poll_once().await.unwrap(), 0);

    append(&path, HEADER);
    append(&path, &data_row(100, "1.5"));
    assert_eq!(reader.poll_once().await.unwrap(), 1);
    assert_eq!(reader.queue().len(), 2);
}

#[tokio::test]
async fn partial_row_waits_for_its_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stat.csv");
    fs::write(&path, format!("{HEADER}{}", data_row(100, "1.5"))).unwrap();

    let mut reader = open_reader(&path).await;
    assert_eq!(reader.poll_once().await.unwrap(), 1);
    let queue = reader.queue();
    assert_eq!(queue.drain_newest_first().len(), 2);

    let row = data_row(101, "2.5");
    let (head, tail) = row.split_at(row.len() / 2);
    append(&path, head);
    assert_eq!(reader.poll_once().await.unwrap(), 0);
    assert!(queue.is_empty());

    append(&path, tail);
    assert_eq!(reader.poll_once().await.unwrap(), 1);

    let samples = queue.drain_newest_first();
    assert_eq!(samples.len(), 2);
    assert!(samples.iter().all(|s| s.timestamp() == 101));
    assert_eq!(samples[0].name(), "sipp_call_rate_p");
    assert_eq!(samples[0].value(), 2.5);

    // Nothing new: nothing served again.
    assert_eq!(reader.poll_once().await.unwrap(), 0);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn malformed_rows_do_not_stop_ingestion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stat.csv");
    fs::write(
        &path,
        format!("{HEADER}garbage\n\r\n{}s;r;no-timestamp;1;2;\n", data_row(7, "3")),
    )
    .unwrap();

    let mut reader = open_reader(&path).await;
    assert_eq!(reader.poll_once().await.unwrap(), 3);

    let samples = reader.queue().drain_newest_first();
    assert_eq!(samples.len(), 2);
    assert!(samples.iter().all(|s| s.timestamp() == 7));
}

#[tokio::test]
async fn invalid_utf8_only_spoils_its_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stat.csv");
    fs::write(&path, HEADER).unwrap();

    let mut reader = open_reader(&path).await;
    append_bytes(&path, b"s;r;2024-01-15\t10:00:00.000000\t5.250000;10;\xff\xfe;\n");
    append(&path, &data_row(6, "2"));

    assert_eq!(reader.poll_once().await.unwrap(), 2);
    assert_eq!(reader.poll_once().await.unwrap(), 0);

    let samples = reader.queue().drain_newest_first();
    assert_eq!(
        rendered(&samples),
        [
            "sipp_call_rate_p 2 6",
            "sipp_target_rate 10 5",
            "sipp_target_rate 10 6",
        ]
    );
}

#[tokio::test]
async fn invalid_utf8_in_partial_row_keeps_row_whole() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stat.csv");
    fs::write(&path, HEADER).unwrap();

    let mut reader = open_reader(&path).await;
    append_bytes(&path, b"s;r;2024-01-15\t10:00:00.000000\t5.250000;10;\xff");
    assert_eq!(reader.poll_once().await.unwrap(), 0);
    assert!(reader.queue().is_empty());

    append(&path, "7;\n");
    assert_eq!(reader.poll_once().await.unwrap(), 1);

    let samples = reader.queue().drain_newest_first();
    assert_eq!(rendered(&samples), ["sipp_target_rate 10 5"]);
}

#[tokio::test]
async fn backlog_is_read_in_bounded_polls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stat.csv");
    let backlog = MAX_ROWS_PER_POLL * 2 + 17;
    let mut body = HEADER.to_string();
    for ts in 0..backlog {
        body.push_str(&data_row(ts as i64, "1"));
    }
    fs::write(&path, body).unwrap();

    let mut reader = open_reader(&path).await;
    let mut polls = Vec::new();
    loop {
        let rows = reader.poll_once().await.unwrap();
        polls.push(rows);
        if rows == 0 {
            break;
        }
    }
    assert_eq!(polls, [MAX_ROWS_PER_POLL, MAX_ROWS_PER_POLL, 17, 0]);
}

#[tokio::test]
async fn spawned_reader_tails_appends_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stat.csv");
    fs::write(&path, HEADER).unwrap();

    let reader = open_reader(&path).await;
    let handle = reader.spawn();
    let queue = handle.queue();

    wait_for(|| handle.state() == ReaderState::Tailing).await;

    let mut served: Vec<Sample> = Vec::new();
    for batch in 0..3i64 {
        // Let the reader hit EOF and go idle before each append.
        tokio::time::sleep(POLL * 3).await;
        append(&path, &data_row(1000 + batch * 2, "1"));
        append(&path, &data_row(1001 + batch * 2, "1"));

        let want = ((batch + 1) * 4) as usize;
        wait_for(|| {
            served.extend(queue.drain_newest_first());
            served.len() >= want
        })
        .await;
    }

    tokio::time::sleep(POLL * 5).await;
    served.extend(queue.drain_newest_first());
    assert_eq!(served.len(), 12);

    let mut ts: Vec<i64> = served.iter().map(Sample::timestamp).collect();
    ts.sort_unstable();
    ts.dedup();
    assert_eq!(ts, (1000..1006).collect::<Vec<_>>());

    assert_eq!(handle.stop().await, ReaderState::Closed);
}

#[tokio::test]
async fn stop_closes_reader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stat.csv");
    fs::write(&path, HEADER).unwrap();

    let registry = Arc::new(MetricTypeRegistry::new());
    let reader = StatsReader::open(&path, registry, Duration::from_secs(60))
        .await
        .unwrap();
    let handle = reader.spawn();
    wait_for(|| handle.state() == ReaderState::Tailing).await;

    // The idle sleep is long; stop must still complete promptly.
    let state = tokio::time::timeout(Duration::from_secs(5), handle.stop())
        .await
        .expect("stop must interrupt the idle wait");
    assert_eq!(state, ReaderState::Closed);
}
