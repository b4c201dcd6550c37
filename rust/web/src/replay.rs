//! Bounded experience buffer for offline training.
//!
//! Records are free-form JSON objects (timestamp, street, actor,
//! infoset id, action) appended per applied action when replay is
//! enabled; the trainer samples batches or loads the JSONL dump.

use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("capacity must be positive")]
    ZeroCapacity,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid record: {0}")]
    Parse(#[from] serde_json::Error),
}

struct Inner {
    buffer: VecDeque<serde_json::Value>,
    rng: ChaCha20Rng,
}

pub struct ReplayBuffer {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Result<Self, ReplayError> {
        Self::with_seed(capacity, rand::random())
    }

    pub fn with_seed(capacity: usize, seed: u64) -> Result<Self, ReplayError> {
        if capacity == 0 {
            return Err(ReplayError::ZeroCapacity);
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                buffer: VecDeque::with_capacity(capacity.min(1024)),
                rng: ChaCha20Rng::seed_from_u64(seed),
            }),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends one experience, evicting the oldest past capacity.
    pub fn add(&self, experience: serde_json::Value) {
        let mut inner = self.lock();
        if inner.buffer.len() == self.capacity {
            inner.buffer.pop_front();
        }
        inner.buffer.push_back(experience);
    }

    /// Uniform sample without replacement, at most `batch_size` records.
    pub fn sample(&self, batch_size: usize) -> Vec<serde_json::Value> {
        if batch_size == 0 {
            return Vec::new();
        }
        let mut inner = self.lock();
        let items: Vec<serde_json::Value> = inner.buffer.iter().cloned().collect();
        let take = batch_size.min(items.len());
        let mut sampled: Vec<serde_json::Value> = Vec::with_capacity(take);
        for value in items.choose_multiple(&mut inner.rng, take) {
            sampled.push(value.clone());
        }
        sampled
    }

    /// Writes the buffer as JSONL, one record per line.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let inner = self.lock();
        for record in &inner.buffer {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Loads a JSONL dump, keeping the most recent records when they
    /// exceed the requested capacity.
    pub fn load(path: impl AsRef<Path>, capacity: Option<usize>) -> Result<Self, ReplayError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut entries: Vec<serde_json::Value> = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }

        let capacity = capacity.unwrap_or_else(|| entries.len().max(1));
        let buffer = Self::new(capacity)?;
        let skip = entries.len().saturating_sub(capacity);
        for entry in entries.into_iter().skip(skip) {
            buffer.add(entry);
        }
        Ok(buffer)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(i: usize) -> serde_json::Value {
        json!({"street": "preflop", "seq": i})
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            ReplayBuffer::new(0),
            Err(ReplayError::ZeroCapacity)
        ));
    }

    #[test]
    fn capacity_bounds_the_buffer() {
        let buffer = ReplayBuffer::with_seed(3, 1).unwrap();
        for i in 0..5 {
            buffer.add(record(i));
        }
        assert_eq!(buffer.len(), 3);
        // The oldest records were evicted.
        let all = buffer.sample(10);
        assert!(all.iter().all(|r| r["seq"].as_u64().unwrap() >= 2));
    }

    #[test]
    fn sample_is_bounded_by_contents() {
        let buffer = ReplayBuffer::with_seed(10, 2).unwrap();
        assert!(buffer.sample(4).is_empty());
        buffer.add(record(0));
        buffer.add(record(1));
        assert_eq!(buffer.sample(4).len(), 2);
        assert_eq!(buffer.sample(1).len(), 1);
        assert!(buffer.sample(0).is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.jsonl");

        let buffer = ReplayBuffer::with_seed(10, 3).unwrap();
        for i in 0..4 {
            buffer.add(record(i));
        }
        buffer.save(&path).unwrap();

        let loaded = ReplayBuffer::load(&path, None).unwrap();
        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded.capacity(), 4);

        // A smaller capacity keeps only the most recent records.
        let truncated = ReplayBuffer::load(&path, Some(2)).unwrap();
        assert_eq!(truncated.len(), 2);
        let kept = truncated.sample(2);
        assert!(kept.iter().all(|r| r["seq"].as_u64().unwrap() >= 2));
    }

    #[test]
    fn malformed_lines_fail_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jsonl");
        std::fs::write(&path, "{\"ok\": 1}\nnot-json\n").unwrap();
        assert!(matches!(
            ReplayBuffer::load(&path, None),
            Err(ReplayError::Parse(_))
        ));
    }
}
