use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IconAtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Glob error: {0}")]
    Glob(#[from] globset::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Nothing to pack")]
    Empty,
    #[error("Asset not found: {}", .0.display())]
    MissingAsset(PathBuf),
}

pub type Result<T> = std::result::Result<T, IconAtlasError>;
