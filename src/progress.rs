//! Progress events for compression and upload
//!
//! Producers call [`ProgressReporter::report`] with a percentage; consumers
//! read a stream of `u8` values from the paired channel. Values are clamped
//! to `0..=100` and never decrease.

use tokio::sync::mpsc;

/// Monotonic percentage producer
#[derive(Debug)]
pub struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<u8>>,
    last: Option<u8>,
}

impl ProgressReporter {
    /// Reporter paired with a receiver for the emitted percentages
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<u8>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
                last: None,
            },
            receiver,
        )
    }

    /// Reporter that discards every event
    pub fn noop() -> Self {
        Self {
            sender: None,
            last: None,
        }
    }

    /// Emit `percent` unless it would move backwards or repeat the last value.
    pub fn report(&mut self, percent: u8) {
        let percent = percent.min(100);
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        if let Some(sender) = &self.sender {
            // A dropped receiver just means nobody is watching.
            let _ = sender.send(percent);
        }
    }

    /// Emit the fraction `done / total` as a percentage.
    pub fn report_fraction(&mut self, done: u64, total: u64) {
        let percent = if total == 0 {
            100
        } else {
            ((done.min(total) * 100) / total) as u8
        };
        self.report(percent);
    }

    /// Last value emitted, if any
    pub fn last(&self) -> Option<u8> {
        self.last
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::noop()
    }
}
