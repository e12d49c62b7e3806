use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or parsing the building model document.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Building map not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read building map {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse building map {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Inconsistent building map {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Failures translating a loaded model into a snapshot. Any of these aborts the whole build.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Floor plan image not found: {}", .path.display())]
    ImageNotFound { path: PathBuf },

    #[error("Failed to read floor plan image {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Door {door} on level {level} references vertex {index}, but the level has {vertex_count} vertices")]
    VertexIndexOutOfRange {
        level: String,
        door: String,
        index: usize,
        vertex_count: usize,
    },

    #[error("Door {door} on level {level} is missing required parameter '{param}'")]
    MissingParameter {
        level: String,
        door: String,
        param: &'static str,
    },

    #[error("Door {door} on level {level} has invalid value for '{param}': {value}")]
    InvalidParameter {
        level: String,
        door: String,
        param: &'static str,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type LoadResult<T> = Result<T, LoadError>;
pub type BuildResult<T> = Result<T, BuildError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
