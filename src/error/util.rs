//! Utility functions for error handling
//!
//! Helpers that open upload files and attach the path to any failure.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, ScheduleError};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (logged on failure)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.is_file() {
        log::warn!("Cannot open {} for {purpose}: not a file", path.display());
        return Err(ScheduleError::io(
            path,
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        ));
    }

    fs::File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            log::warn!("Permission denied opening {} for {purpose}", path.display());
        }
        ScheduleError::io(path, e)
    })
}

/// Create a file for writing, replacing any existing content
pub fn safe_create_file(path: &Path, purpose: &str) -> Result<fs::File> {
    fs::File::create(path).map_err(|e| {
        log::warn!("Cannot create {} for {purpose}: {e}", path.display());
        ScheduleError::io(path, e)
    })
}
