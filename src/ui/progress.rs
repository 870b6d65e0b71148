//! Progress reporting

use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use std::path::Path;

/// Progress reporter for copy and verify operations
pub struct ProgressReporter {
    bar: ProgressBar,
    entries: u64,
    bytes: u64,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }

        Self {
            bar,
            entries: 0,
            bytes: 0,
        }
    }

    /// Mark the start of a copy operation
    pub fn start_copy(&self, source: &Path) {
        self.bar
            .set_message(format!("Copying {}...", source.display()));
    }

    /// Record one materialized destination entry
    pub fn entry_created(&mut self, bytes: u64) {
        self.entries += 1;
        self.bytes = self.bytes.saturating_add(bytes);
        self.bar.set_message(format!(
            "Copying... {} entries | {}",
            self.entries,
            HumanBytes(self.bytes)
        ));
    }

    /// Surface a skipped entry without disturbing the spinner
    pub fn entry_skipped(&self, rel_path: &Path, detail: &str) {
        self.bar
            .println(format!("SKIP {}: {}", rel_path.display(), detail));
    }

    /// Finalize the copy phase
    pub fn finish_copy(&self, entries: usize, skipped: usize, bytes: u64) {
        self.bar.finish_with_message(format!(
            "Copied {} entries | {}{}",
            entries,
            HumanBytes(bytes),
            if skipped > 0 {
                format!(" | {skipped} skipped")
            } else {
                String::new()
            }
        ));
    }

    /// Mark the start of a verify operation
    pub fn start_verify(&self, left: &Path, right: &Path) {
        self.bar.set_message(format!(
            "Comparing {} and {}...",
            left.display(),
            right.display()
        ));
    }

    /// Finalize the verify phase
    pub fn finish_verify(&self, differences: usize) {
        if differences == 0 {
            self.bar.finish_with_message("Trees are identical".to_string());
        } else {
            self.bar
                .finish_with_message(format!("{differences} difference(s) found"));
        }
    }

    /// Entries counted so far
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Bytes counted so far
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
