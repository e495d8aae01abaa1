//! Small filesystem helpers shared by the progress store and catalog loader.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, StepwiseError};

/// Maximum size of a progress record or content file (4 MB).
///
/// A progress record is a few kilobytes even for a finished curriculum, so
/// anything near this limit is corrupt.
pub const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// Read a file into a string, refusing files larger than `MAX_FILE_SIZE`.
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_FILE_SIZE)
}

/// Read a file into a string with a custom size limit.
///
/// # Errors
///
/// Returns a storage error if the file cannot be read, or a content error
/// if it exceeds `max_size`.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| StepwiseError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(StepwiseError::content(format!(
            "file {} is too large ({} bytes, max {} bytes)",
            path.display(),
            size,
            max_size
        )));
    }

    fs::read_to_string(path).map_err(|e| StepwiseError::storage(path, e))
}

/// Write `contents` to `final_path` atomically via a sibling temp file.
///
/// The temp file is synced before the rename so a crash leaves either the
/// old record or the new one, never a torn write.
pub fn write_atomic(final_path: &Path, temp_path: &Path, contents: &[u8]) -> Result<()> {
    {
        let mut file =
            fs::File::create(temp_path).map_err(|e| StepwiseError::storage(temp_path, e))?;
        file.write_all(contents)
            .map_err(|e| StepwiseError::storage(temp_path, e))?;
        file.sync_all()
            .map_err(|e| StepwiseError::storage(temp_path, e))?;
    }

    fs::rename(temp_path, final_path).map_err(|e| StepwiseError::storage(final_path, e))
}
