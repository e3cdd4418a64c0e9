use std::path::PathBuf;

use thiserror::Error;

/// Errors that end a whole batch run
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("The specified directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to list {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors that skip a single file
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Failed to read file: {0}")]
    Read(#[source] std::io::Error),

    #[error("Start of Scan marker (FF DA) not found")]
    MarkerNotFound,

    #[error("Failed to re-encode input: {0}")]
    Normalize(#[source] CodecError),

    #[error("Failed to read metadata: {0}")]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("header does not start with a JPEG signature")]
    NotJpeg,
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Error opening image: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Error opening image: viewer exited with {0}")]
    Status(std::process::ExitStatus),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings file: {0}")]
    Json(#[from] serde_json::Error),
}
