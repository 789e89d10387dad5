//! Error types for vid-gif

use crate::session::FileStatus;
use crate::settings::InvalidSettings;
use shared_utils::errors::MediaToolError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GifError {
    #[error(transparent)]
    InvalidSettings(#[from] InvalidSettings),

    #[error(transparent)]
    Tool(#[from] MediaToolError),

    #[error("Cannot move {path} from {from} to {to}")]
    InvalidTransition {
        path: PathBuf,
        from: FileStatus,
        to: FileStatus,
    },

    #[error("A conversion is in progress")]
    Busy,

    #[error("No file at index {0}")]
    NoSuchFile(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GifError>;
