//! Error type shared by the model, file I/O and application setup

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PetError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),

    #[error("{0} does not exist")]
    NotFound(PathBuf),

    /// An operation was called in a model state that does not allow it
    #[error("invalid state: {0}")]
    Precondition(&'static str),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid accelerator {input:?}: {reason}")]
    Accelerator { input: String, reason: String },

    #[error("font: {0}")]
    Font(String),

    #[error("graphics: {0}")]
    Gpu(String),

    #[error("window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
}

impl PetError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = PetError> = std::result::Result<T, E>;
