//! Progress reporting and cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives progress percentages from a running analysis
pub trait ProgressSink {
    fn report(&mut self, percent: u8);
}

impl<F: FnMut(u8)> ProgressSink for F {
    fn report(&mut self, percent: u8) {
        self(percent);
    }
}

/// Sink that drops every report
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent: u8) {}
}

/// Keeps reported progress within 0-100 and never lets it go backwards
///
/// Repeated values are swallowed, so the sink only sees strictly increasing
/// percentages.
pub struct ProgressTracker<'a> {
    sink: &'a mut dyn ProgressSink,
    last: Option<u8>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a mut dyn ProgressSink) -> Self {
        Self { sink, last: None }
    }

    /// Report an absolute percentage
    pub fn set(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        self.sink.report(percent);
    }

    /// Report a position inside a stage spanning `from..to` percent
    pub fn set_within(&mut self, from: u8, to: u8, done: usize, total: usize) {
        if total == 0 {
            self.set(to);
            return;
        }
        let span = f64::from(to.saturating_sub(from));
        let fraction = (done as f64 / total as f64).clamp(0.0, 1.0);
        self.set(from + (span * fraction) as u8);
    }

    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

/// Cooperative cancellation flag shared between caller and worker
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
