//! Copy command

use crate::copier::{copy_dir, CopyEvent, CopyStats};
use crate::types::ReplikError;
use crate::ui::ProgressReporter;
use crate::Config;
use indicatif::HumanBytes;
use std::sync::{Arc, Mutex};

/// Run the copy operation
pub fn run(config: &Config) -> Result<CopyStats, ReplikError> {
    if config.quiet {
        return copy_dir(config, None);
    }

    let reporter = Arc::new(Mutex::new(ProgressReporter::new()));
    if let Ok(progress) = reporter.lock() {
        progress.start_copy(&config.source);
    }

    let callback = {
        let reporter = Arc::clone(&reporter);
        move |event: &CopyEvent| match event {
            CopyEvent::EntryCreated { bytes_copied, .. } => {
                if let Ok(mut progress) = reporter.lock() {
                    progress.entry_created(*bytes_copied);
                }
            }
            CopyEvent::Skipped { rel_path, detail } => {
                if let Ok(progress) = reporter.lock() {
                    progress.entry_skipped(rel_path, detail);
                }
            }
            CopyEvent::Complete { stats } => {
                if let Ok(progress) = reporter.lock() {
                    progress.finish_copy(stats.entries_created(), stats.skipped, stats.bytes_copied);
                }
            }
        }
    };

    let stats = copy_dir(config, Some(&callback))?;
    println!("{}", format_summary(&stats));

    Ok(stats)
}

fn format_summary(stats: &CopyStats) -> String {
    format!(
        "Copy complete:\n  Dirs: {}  Files: {}  Hardlinks: {}  Symlinks: {}  Skipped: {}\n  Content transferred: {}",
        stats.dirs_created,
        stats.files_copied,
        stats.hardlinks_created,
        stats.symlinks_created,
        stats.skipped,
        HumanBytes(stats.bytes_copied)
    )
}
