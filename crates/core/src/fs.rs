//! Filesystem utilities

use std::fs;
use std::path::Path;

use log::{error, info};

/// Ensure a directory exists, creating it if necessary
///
/// Returns true if the directory exists (either already existed or was created).
pub fn ensure_dir_exists(path: &str) -> bool {
    let path = Path::new(path);

    if path.is_dir() {
        return true;
    }

    match fs::create_dir_all(path) {
        Ok(_) => {
            info!("Created directory: {}", path.display());
            true
        }
        Err(e) => {
            error!("Failed to create directory {}: {}", path.display(), e);
            false
        }
    }
}
