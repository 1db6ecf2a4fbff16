//! Progress reporting for assembly loops
//!
//! Bars are created hidden unless the dataset configuration asks for them,
//! so library callers and tests stay quiet by default.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for a record progress bar
pub const DEFAULT_RECORD_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Create a record progress bar
///
/// # Arguments
/// * `length` - Number of records to process
/// * `description` - Message displayed next to the bar
/// * `visible` - Whether the bar is drawn at all
///
/// # Returns
/// A configured `ProgressBar`, hidden when `visible` is false
#[must_use]
pub fn create_record_progress_bar(length: u64, description: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template(DEFAULT_RECORD_TEMPLATE)
        .map_or_else(|_| ProgressStyle::default_bar(), |style| style.progress_chars("#>-"));
    pb.set_style(style);
    pb.set_message(description.to_string());
    pb
}

/// Finish a progress bar with a completion message
pub fn finish_progress_bar(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(message.to_string());
}
