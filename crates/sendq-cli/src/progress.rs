//! Live progress bar fed by the uploader hooks

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use sendq_engine::{Progress, UploadHooks, WorkItem};
use sendq_types::TransferStatus;
use std::time::Duration;

use crate::display::format_bytes;

const TEMPLATE: &str =
    "{spinner:.green} {msg} [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})";

/// Upload hooks driving an `indicatif` progress bar
///
/// The bar counts bytes over the whole batch: finished and failed items contribute
/// their declared size, the current item its transferred bytes.
pub struct ProgressHooks {
    progress_bar: Option<ProgressBar>,
    settled_bytes: u64,
}

impl ProgressHooks {
    /// Create hooks for a batch of `total_bytes`; `quiet` disables all output
    pub fn new(quiet: bool, total_bytes: u64) -> Self {
        let progress_bar = if quiet {
            None
        } else {
            let pb = ProgressBar::new(total_bytes);
            let bar_style = ProgressStyle::default_bar()
                .template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  ");
            pb.set_style(bar_style);
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        };

        Self {
            progress_bar,
            settled_bytes: 0,
        }
    }

    fn settle(&mut self, item: &WorkItem) {
        self.settled_bytes += item.size;
        if let Some(pb) = &self.progress_bar {
            pb.set_position(self.settled_bytes);
        }
    }

    fn println(&self, line: String) {
        if let Some(pb) = &self.progress_bar {
            pb.suspend(|| println!("{}", line));
        }
    }
}

impl UploadHooks for ProgressHooks {
    fn on_before_item(&mut self, item: &WorkItem) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("Uploading: {}", item.name));
        }
    }

    fn on_after_item(&mut self, item: &WorkItem) {
        self.settle(item);
        let detail = if item.is_directory {
            "directory".to_string()
        } else {
            format_bytes(item.size)
        };
        self.println(format!(
            "  {} {} ({})",
            style("✓").green(),
            item.name,
            style(detail).dim()
        ));
    }

    fn on_error_item(&mut self, item: &WorkItem) {
        self.settle(item);
        self.println(format!(
            "  {} {}: {}",
            style("✗").red().bold(),
            style(&item.name).red(),
            item.error.as_deref().unwrap_or("unknown error")
        ));
    }

    fn on_connection_error(&mut self, message: &str) {
        self.println(format!(
            "{} Connection error: {}",
            style("⚠").yellow().bold(),
            style(message).yellow()
        ));
    }

    fn on_connection_end(&mut self) {
        self.println(format!(
            "{} {}",
            style("⚠").yellow().bold(),
            style("Connection ended by server").yellow()
        ));
    }

    fn on_finished(&mut self, _status: &TransferStatus) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn on_progress(&mut self, progress: &Progress) {
        let (Some(pb), Some(item)) = (&self.progress_bar, &progress.item) else {
            return;
        };

        pb.set_position(self.settled_bytes + item.transferred);
        pb.set_message(format!(
            "Uploading: {} ({:.1}%) - {}/s",
            item.name,
            item.progress(),
            format_bytes(progress.transfer_status.speed_average)
        ));
    }
}
