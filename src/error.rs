use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong outside the per-tick path.
#[derive(Debug, Error)]
pub enum Error {
    /// The host could not provide a surface with a drawable area.
    #[error("drawing surface is unusable ({width}x{height})")]
    UnusableSurface { width: usize, height: usize },

    #[error("invalid color `{0}`")]
    InvalidColor(String),

    #[error("failed to read config {}: {source}", .path.display())]
    ReadConfig { path: PathBuf, source: io::Error },

    #[error("failed to parse config {}: {source}", .path.display())]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
