//! Test utilities and module declarations for storage tests.

#![expect(clippy::unwrap_used, reason = "test code")]

use std::sync::{Arc, Mutex};

use agentmem_core::{MemoryConfig, NewObservation};
use chrono::{DateTime, TimeDelta, TimeZone as _, Utc};
use tempfile::TempDir;

use crate::{Clock, Storage};

/// Manually driven clock. Every read advances it by one second so rows
/// written back to back get distinct, ordered timestamps.
#[derive(Clone)]
pub struct TestClock(Arc<Mutex<DateTime<Utc>>>);

impl TestClock {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())))
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.0.lock().unwrap();
        *now += delta;
    }

    pub fn clock(&self) -> Clock {
        let inner = Arc::clone(&self.0);
        Arc::new(move || {
            let mut now = inner.lock().unwrap();
            *now += TimeDelta::seconds(1);
            *now
        })
    }
}

pub fn create_clocked_storage() -> (Storage, TestClock, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let clock = TestClock::new();
    let storage =
        Storage::with_config(&db_path, MemoryConfig::default()).unwrap().with_clock(clock.clock());
    (storage, clock, temp_dir)
}

pub fn create_test_storage() -> (Storage, TempDir) {
    let (storage, _clock, temp_dir) = create_clocked_storage();
    (storage, temp_dir)
}

pub fn note(title: &str, content: &str) -> NewObservation {
    NewObservation::new("session-1", "decision", title, content).project("engine")
}

/// Saves an observation and returns its id.
pub fn add(storage: &Storage, title: &str, content: &str) -> i64 {
    storage.add_observation(&note(title, content)).unwrap()
}

mod graph_tests;
mod search_tests;
