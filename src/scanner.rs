use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::exclusion::ExclusionFilter;
use crate::glob::GlobSet;

/// A file selected for analysis.
pub struct SourceFile {
    pub path: PathBuf,
    /// Root-relative, `/`-separated; used for matching and output.
    pub relative: String,
}

/// Every file under `root` whose name or relative path matches `globs`,
/// sorted by relative path. Excluded directories are not entered.
pub fn find_files(
    root: &Path,
    globs: &GlobSet,
    filter: &ExclusionFilter,
    cancelled: &AtomicBool,
) -> Vec<SourceFile> {
    let mut results = Vec::new();
    find_files_recursive(root, root, globs, filter, cancelled, &mut results);
    results.sort_by(|a, b| a.relative.cmp(&b.relative));
    debug!(root = %root.display(), files = results.len(), "source files found");
    results
}

fn find_files_recursive(
    root: &Path,
    dir: &Path,
    globs: &GlobSet,
    filter: &ExclusionFilter,
    cancelled: &AtomicBool,
    results: &mut Vec<SourceFile>,
) {
    if cancelled.load(Ordering::Relaxed) {
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) => {
            trace!(dir = %dir.display(), error = %e, "directory skipped");
            return;
        }
    };

    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let ft = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };
        let name = entry.file_name();
        let name_str = name.to_string_lossy();

        if ft.is_file() {
            let path = entry.path();
            let relative = normalized_relative(root, &path);
            if globs.is_match(&relative, &name_str) {
                results.push(SourceFile { path, relative });
            }
        } else if ft.is_dir() && !filter.is_excluded(&name_str) {
            subdirs.push(entry.path());
        }
    }

    let sub_results: Vec<Vec<SourceFile>> = subdirs
        .par_iter()
        .map(|subdir| {
            let mut sub = Vec::new();
            find_files_recursive(root, subdir, globs, filter, cancelled, &mut sub);
            sub
        })
        .collect();

    for sub in sub_results {
        results.extend(sub);
    }
}

pub fn normalized_relative(root: &Path, full: &Path) -> String {
    match full.strip_prefix(root) {
        Ok(rel) => {
            let s = rel.to_string_lossy();
            if cfg!(windows) {
                s.replace('\\', "/")
            } else {
                s.into_owned()
            }
        }
        Err(_) => full.to_string_lossy().into_owned(),
    }
}
