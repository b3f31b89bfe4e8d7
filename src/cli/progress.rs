//! CLI-specific progress handling for schoolmiles
//!
//! Provides a progress bar over the oracle queries a run still has to make.

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar for pair resolution
pub fn create_progress_bar(total_pairs: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_pairs);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} pairs ({percent}%)")
            .expect("Failed to create progress style")
            .progress_chars("#>-"),
    );
    pb
}

/// Progress manager for a merge pass
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_pairs: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_pairs);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }
}
