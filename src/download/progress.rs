use indicatif::{ProgressBar, ProgressStyle};

/// Receives transfer progress for one download at a time.
pub trait ProgressObserver: Send {
    /// `total_bytes` is 0 when the server sent no content-length.
    fn on_start(&mut self, label: &str, total_bytes: u64);
    /// Cumulative bytes written so far.
    fn on_progress(&mut self, received_bytes: u64);
    fn on_finish(&mut self, succeeded: bool);
}

pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_start(&mut self, _label: &str, _total_bytes: u64) {}
    fn on_progress(&mut self, _received_bytes: u64) {}
    fn on_finish(&mut self, _succeeded: bool) {}
}

/// Terminal progress bar, one per download.
#[derive(Default)]
pub struct ProgressBarObserver {
    bar: Option<ProgressBar>,
}

impl ProgressBarObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn on_start(&mut self, label: &str, total_bytes: u64) {
        let bar = if total_bytes > 0 {
            let bar = ProgressBar::new(total_bytes);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("━╸━"),
            );
            bar
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {bytes} ({bytes_per_sec}) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar
        };
        bar.set_message(label.to_string());
        self.bar = Some(bar);
    }

    fn on_progress(&mut self, received_bytes: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(received_bytes);
        }
    }

    fn on_finish(&mut self, succeeded: bool) {
        if let Some(bar) = self.bar.take() {
            if succeeded {
                bar.finish_and_clear();
            } else {
                bar.abandon_with_message("failed");
            }
        }
    }
}
