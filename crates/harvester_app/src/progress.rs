use indicatif::{ProgressBar, ProgressStyle};

use harvester_core::{CancelFlag, ProgressSink};

/// Progress-bar sink for the line-mode front end.
///
/// Ctrl-C flips the shared flag; the harvester observes it between batches,
/// so the batch in flight still lands before the run stops.
pub struct CliProgress {
    bar: ProgressBar,
    cancel: CancelFlag,
}

impl CliProgress {
    pub fn new(target_count: usize, quiet: bool, cancel: CancelFlag) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(target_count as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} [{bar:40.green}] {pos}/{len} movies ({elapsed})",
                )
                .unwrap()
                .progress_chars("=> "),
            );
            bar
        };
        Self { bar, cancel }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for CliProgress {
    fn on_progress(&self, delta: usize) {
        self.bar.inc(delta as u64);
    }

    fn should_cancel(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Installs a Ctrl-C handler that flips the cancellation flag.
///
/// Must be called from within the async runtime.
pub fn install_ctrl_c(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received; finishing the current batch");
            cancel.cancel();
        }
    });
}
