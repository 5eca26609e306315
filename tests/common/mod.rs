#![allow(dead_code)]

use std::sync::Once;
use std::time::Instant;
use tracing::info;

pub mod cli;
pub mod fixtures;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        cody_sync::logging::init_test_logging();
    });
}

pub struct TestLogGuard {
    name: String,
    start: Instant,
}

impl TestLogGuard {
    fn new(name: &str) -> Self {
        init_test_logging();
        info!("{name}: starting");
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }
}

impl Drop for TestLogGuard {
    fn drop(&mut self) {
        info!(
            "{}: assertions passed (elapsed {:?})",
            self.name,
            self.start.elapsed()
        );
    }
}

pub fn test_log(name: &str) -> TestLogGuard {
    TestLogGuard::new(name)
}
