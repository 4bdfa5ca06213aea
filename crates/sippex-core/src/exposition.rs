//! Scrape body rendering.
//!
//! Body layout:
//! - every `# TYPE` declaration, in registration order
//! - then, reader by reader, each queued sample as `<name> <value> <timestamp>`,
//!   drained newest-first
//!
//! Rendering consumes the queues: a sample is served by exactly one scrape.

use std::fmt::Write;

use crate::queue::SampleQueue;
use crate::registry::MetricTypeRegistry;

pub fn render_scrape<'a, I>(registry: &MetricTypeRegistry, queues: I) -> String
where
    I: IntoIterator<Item = &'a SampleQueue>,
{
    let mut out = String::new();
    registry.render_declarations(&mut out);

    for queue in queues {
        while let Some(sample) = queue.pop_newest() {
            let _ = writeln!(out, "{sample}");
        }
    }
    out
}
