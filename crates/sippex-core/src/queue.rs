//! Bounded per-reader sample queue.
//!
//! - Producer side appends at the back; a full queue evicts its oldest entry.
//! - Consumer side pops from the back as well (newest first), so a drain
//!   serves samples in reverse arrival order and removes them for good.
//!
//! All operations take a short `Mutex` critical section; one reader task
//! produces while any number of scrape handlers consume.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::sample::Sample;

/// Default queue capacity per reader.
pub const QUEUE_CAPACITY: usize = 1000;

pub struct SampleQueue {
    inner: Mutex<VecDeque<Sample>>,
    capacity: usize,
    evicted: AtomicU64,
}

impl SampleQueue {
    pub fn new() -> Self {
        Self::with_capacity(QUEUE_CAPACITY)
    }

    /// Capacity is clamped to at least 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            evicted: AtomicU64::new(0),
        }
    }

    // A poisoned lock still holds a structurally valid deque.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Sample>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a sample; returns the evicted oldest sample when full.
    pub fn push(&self, sample: Sample) -> Option<Sample> {
        let mut q = self.lock();
        let evicted = if q.len() >= self.capacity {
            q.pop_front()
        } else {
            None
        };
        q.push_back(sample);
        drop(q);

        if evicted.is_some() {
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        evicted
    }

    /// Remove and return the most recently appended sample.
    pub fn pop_newest(&self) -> Option<Sample> {
        self.lock().pop_back()
    }

    /// Pop newest-first until the queue reports empty.
    ///
    /// Each pop is its own critical section, so samples appended while the
    /// drain is running are served by this drain too.
    pub fn drain_newest_first(&self) -> Vec<Sample> {
        let mut out = Vec::new();
        while let Some(s) = self.pop_newest() {
            out.push(s);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total samples dropped by overflow since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl Default for SampleQueue {
    fn default() -> Self {
        Self::new()
    }
}
