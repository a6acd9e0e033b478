/// JPEG discovery
///
/// Walks the photo folder recursively and lists every file whose name ends
/// in `.jpg` or `.jpeg`, in any letter case.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffixes accepted as JPEG, compared against the lowercased file name
const JPEG_SUFFIXES: [&str; 2] = [".jpeg", ".jpg"];

/// Check whether a file name looks like a JPEG
pub fn is_jpeg_name(name: &str) -> bool {
    let name = name.to_lowercase();
    JPEG_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Find every JPEG under `root`
///
/// # Arguments
/// * `root` - Folder to scan, subfolders included
///
/// # Returns
/// * Paths in traversal order
/// * `Err(Error::Discovery)` if the folder can't be walked (missing root,
///   permission denied); this is fatal for the run
pub fn find_jpegs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut jpegs = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;

        if !is_jpeg_name(&entry.file_name().to_string_lossy()) {
            continue;
        }

        // Only files (a folder called "x.jpg" is still a folder). Symlinks
        // are not followed by the walk, so check what they point at
        if entry.file_type().is_file() || (entry.path_is_symlink() && points_to_file(entry.path())) {
            jpegs.push(entry.into_path());
        }
    }

    log::info!("Found {} JPEG files under {}", jpegs.len(), root.display());
    Ok(jpegs)
}

fn points_to_file(link: &Path) -> bool {
    match fs::metadata(link) {
        Ok(target) => target.is_file(),
        Err(e) => {
            log::debug!("Skipping dangling link {}: {}", link.display(), e);
            false
        }
    }
}
