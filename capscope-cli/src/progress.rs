//! Terminal progress bar for batched fetch runs, and a log writer that
//! keeps log lines from tearing through it.

use capscope_core::data::FetchProgress;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};

pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// Drive `bar`, which may already be shared with [`SuspendingWriter`].
    pub fn new(bar: ProgressBar) -> Self {
        if let Ok(style) = ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} batches {msg}",
        ) {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl FetchProgress for BarProgress {
    fn on_start(&self, total_batches: usize) {
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
        self.bar.set_length(total_batches as u64);
        self.bar.set_message("fetching market caps...");
    }

    fn on_batch_complete(&self, index: usize, _total_batches: usize, succeeded: bool) {
        if !succeeded {
            self.bar.set_message(format!("batch {} dropped", index + 1));
        }
        self.bar.inc(1);
    }

    fn on_finish(&self, succeeded: usize, failed: usize, _total_batches: usize) {
        self.bar
            .finish_with_message(format!("done: {succeeded} ok, {failed} dropped"));
    }
}

/// Stderr writer for the tracing subscriber. Each write clears the bar,
/// prints, and redraws it; with a hidden bar it is a plain stderr write.
pub struct SuspendingWriter {
    bar: ProgressBar,
}

impl SuspendingWriter {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Write for SuspendingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar
            .suspend(|| io::stderr().lock().write_all(buf))
            .map(|()| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.bar.suspend(|| io::stderr().flush())
    }
}
