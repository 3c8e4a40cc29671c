//! Display utilities for the sendq CLI

use console::style;
use sendq_engine::WorkItem;
use sendq_types::{ItemStatus, TransferStatus};
use std::time::Duration;

/// Print the summary of a finished push
pub fn print_summary(
    status: &TransferStatus,
    items: &[WorkItem],
    elapsed: Duration,
    last_connection_error: Option<&str>,
) {
    let uploaded = uploaded_bytes(items);

    println!();
    println!("{}", style("Upload Summary:").bold().underlined());
    println!("  Completed: {}", style(status.finished_count).green());
    println!(
        "  Failed: {}",
        if status.error_count > 0 {
            style(status.error_count).red()
        } else {
            style(status.error_count).green()
        }
    );
    println!("  Total items: {}", style(status.total).cyan());
    println!("  Bytes: {}", style(format_bytes(uploaded)).green());
    println!("  Duration: {}", style(format_duration(elapsed)).blue());
    println!(
        "  Average rate: {}/s",
        style(format_bytes(average_rate(uploaded, elapsed))).blue()
    );

    if let Some(message) = last_connection_error {
        println!("  Last connection error: {}", style(message).yellow());
    }

    let failed: Vec<&WorkItem> = items
        .iter()
        .filter(|item| item.status == ItemStatus::Error)
        .collect();
    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed items:").red().bold());
        for item in failed {
            println!(
                "  {} {} -> {}: {}",
                style("✗").red(),
                item.local_path.display(),
                item.server_path,
                item.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

/// Bytes of completed file items
pub fn uploaded_bytes(items: &[WorkItem]) -> u64 {
    items
        .iter()
        .filter(|item| item.status == ItemStatus::Complete && !item.is_directory)
        .map(|item| item.size)
        .sum()
}

fn average_rate(bytes: u64, elapsed: Duration) -> u64 {
    let seconds = elapsed.as_secs_f64();
    if seconds > 0.0 {
        (bytes as f64 / seconds) as u64
    } else {
        0
    }
}

/// Format bytes in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format duration in human-readable format
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Display a warning message
pub fn display_warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

/// Display a success message
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), style(message).green());
}
