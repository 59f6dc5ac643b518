//! Progress sink that records every report.

use parking_lot::Mutex;

use crate::drain::ProgressSink;

/// Records reported percentages for assertions.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    values: Mutex<Vec<f64>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every reported value, in order.
    pub fn values(&self) -> Vec<f64> {
        self.values.lock().clone()
    }

    /// The most recent report.
    pub fn last(&self) -> Option<f64> {
        self.values.lock().last().copied()
    }

    /// Whether reports never decreased.
    pub fn is_monotonic(&self) -> bool {
        self.values.lock().windows(2).all(|w| w[0] <= w[1])
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, percent: f64) {
        self.values.lock().push(percent);
    }
}
