use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

/// Observer contract for one harvest.
///
/// `on_progress` receives the number of records newly accumulated since the
/// previous call; `should_cancel` is polled between batches. Both must be
/// fast and non-blocking: the harvester never waits on its observer.
pub trait ProgressSink: Send + Sync {
    /// Called after each batch with the newly accumulated record count.
    fn on_progress(&self, delta: usize);

    /// Polled between batches; returning true stops the harvest before the
    /// next batch is dispatched. The batch already in flight finishes and
    /// its records are kept.
    fn should_cancel(&self) -> bool;
}

/// Sink that ignores progress and never cancels.
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_progress(&self, _delta: usize) {}

    fn should_cancel(&self) -> bool {
        false
    }
}

/// Shared cancellation flag for sinks driven from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; observed at the next between-batch poll.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Sink that forwards deltas over a channel and honors a shared flag.
///
/// This is the seam a dashboard front end consumes: the receiving side
/// turns deltas into whatever notification its sessions need, and flips the
/// flag when a user asks to stop.
pub struct ChannelProgress {
    tx: mpsc::Sender<usize>,
    cancel: CancelFlag,
}

impl ChannelProgress {
    pub fn new(tx: mpsc::Sender<usize>, cancel: CancelFlag) -> Self {
        Self { tx, cancel }
    }
}

impl ProgressSink for ChannelProgress {
    fn on_progress(&self, delta: usize) {
        let _ = self.tx.send(delta);
    }

    fn should_cancel(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
