//! Synchronous progress reporting
//!
//! Callbacks receive `(percent, label)` on the calling thread. The reporter
//! clamps to 0–100 and never lets the percentage go backwards within one call.

/// Progress callback signature
pub type ProgressFn<'a> = dyn FnMut(u8, &str) + 'a;

/// Monotonic wrapper around a progress callback
pub struct ProgressReporter<'a> {
    callback: Option<&'a mut ProgressFn<'a>>,
    last: u8,
}

impl<'a> ProgressReporter<'a> {
    /// Wrap a callback
    pub fn new(callback: &'a mut ProgressFn<'a>) -> Self {
        Self {
            callback: Some(callback),
            last: 0,
        }
    }

    /// A reporter that discards updates
    pub fn silent() -> Self {
        Self {
            callback: None,
            last: 0,
        }
    }

    /// Report a percentage with a stage label
    pub fn report(&mut self, percent: u8, label: &str) {
        let percent = percent.min(100).max(self.last);
        self.last = percent;
        if let Some(callback) = self.callback.as_mut() {
            callback(percent, label);
        }
    }

    /// Report a fraction of the span `[from, to]`
    pub fn report_span(&mut self, from: u8, to: u8, fraction: f32, label: &str) {
        let fraction = fraction.clamp(0.0, 1.0);
        let span = f32::from(to.saturating_sub(from));
        self.report(from.saturating_add((span * fraction).round() as u8), label);
    }

    /// Last reported percentage
    pub fn last(&self) -> u8 {
        self.last
    }
}
