use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use memmap2::Mmap;
use tracing::trace;

pub const MMAP_THRESHOLD: u64 = 64 * 1024;
pub const BINARY_CHECK_SIZE: usize = 8192;

const BOM: &str = "\u{feff}";

/// Reads a source file as text. `Ok(None)` means there is nothing to
/// analyze: the file is empty or looks binary.
pub fn read_source(path: &Path) -> Result<Option<String>, String> {
    let metadata = std::fs::metadata(path).map_err(|e| e.to_string())?;
    if metadata.len() == 0 {
        return Ok(None);
    }
    let text = if metadata.len() >= MMAP_THRESHOLD {
        trace!(path = %path.display(), bytes = metadata.len(), "reading via mmap");
        read_mmap(path)?
    } else {
        read_buffered(path)?
    };
    Ok(text.map(strip_bom))
}

fn read_mmap(path: &Path) -> Result<Option<String>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    // SAFETY: the mapping is read once and copied out before it is dropped.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| e.to_string())?;
    decode(&mmap[..])
}

fn read_buffered(path: &Path) -> Result<Option<String>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut all = Vec::new();
    reader.read_to_end(&mut all).map_err(|e| e.to_string())?;
    decode(&all)
}

fn decode(data: &[u8]) -> Result<Option<String>, String> {
    if is_binary(data) {
        return Ok(None);
    }
    let s = std::str::from_utf8(data).map_err(|_| "Not valid UTF-8".to_string())?;
    Ok(Some(s.to_owned()))
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix(BOM) {
        Some(rest) => rest.to_owned(),
        None => text,
    }
}

pub fn is_binary(data: &[u8]) -> bool {
    let check_len = data.len().min(BINARY_CHECK_SIZE);
    data[..check_len].contains(&0)
}
