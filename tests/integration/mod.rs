//! Integration tests module for search-history
//!
//! This module provides common utilities and test infrastructure
//! for integration testing of the history service.

pub mod file_store_test;
pub mod history_properties_test;

use chrono::{DateTime, Duration, Utc};
use search_history::history::Clock;
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        // Global test setup goes here if ever needed
    });
}

/// Clock shared between a test and the service under test.
#[derive(Clone)]
pub struct TestClock(Arc<Mutex<DateTime<Utc>>>);

impl TestClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(now)))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}
