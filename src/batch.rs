use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::file_reader;
use crate::scanner::SourceFile;

/// Result of running one analysis over one file.
pub struct FileOutcome<T> {
    pub relative: String,
    pub result: Result<T, String>,
}

/// Reads every file and runs `analyze` on its text, one file per task.
/// Empty and binary files produce no outcome; once `cancelled` is set the
/// remaining files are skipped. Outcomes keep the order of `files`.
pub fn analyze_files<T, F>(
    files: &[SourceFile],
    cancelled: &AtomicBool,
    analyze: F,
) -> Vec<FileOutcome<T>>
where
    T: Send,
    F: Fn(&str) -> T + Sync,
{
    let outcomes: Vec<FileOutcome<T>> = files
        .par_iter()
        .filter_map(|file| {
            if cancelled.load(Ordering::Relaxed) {
                return None;
            }
            let result = match file_reader::read_source(&file.path) {
                Ok(Some(text)) => Ok(analyze(&text)),
                Ok(None) => return None,
                Err(e) => {
                    warn!(path = %file.relative, error = %e, "file not analyzed");
                    Err(e)
                }
            };
            Some(FileOutcome {
                relative: file.relative.clone(),
                result,
            })
        })
        .collect();

    debug!(
        files = files.len(),
        analyzed = outcomes.len(),
        cancelled = cancelled.load(Ordering::Relaxed),
        "batch finished"
    );
    outcomes
}
