/// Error types shared by every stage of the run
///
/// Per-image failures never reach this type's callers: the metadata
/// extractor logs them and reports "no metadata". Everything here is
/// fatal for the run and bubbles up to `main`.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Generic I/O failure (opening a file, removing a stale output, ...)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Walking the photo folder failed (missing root, permission denied)
    #[error("scanning folder failed: {0}")]
    Discovery(#[from] walkdir::Error),

    /// File content is not a JPEG, whatever its extension says
    #[error("{} is not a JPEG image", path.display())]
    NotJpeg { path: PathBuf },

    /// EXIF block is present but could not be decoded
    #[error("reading EXIF failed: {0}")]
    Exif(#[from] exif::Error),

    /// Writing the GeoPackage failed
    #[error("writing GeoPackage failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Configuration file is not valid TOML or has unknown keys
    #[error("invalid configuration file: {0}")]
    ConfigFile(#[from] toml::de::Error),

    /// Command-line arguments could not be parsed
    #[error("invalid arguments: {0}")]
    Args(#[from] pico_args::Error),

    /// Any other configuration problem
    #[error("configuration error: {0}")]
    Config(String),

    /// Worker threads could not be started
    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A worker crashed while processing an image
    #[error("worker pool crashed: {0}")]
    WorkerPool(String),
}
