//! Error types for dissolve-rs.

use thiserror::Error;

/// The main error type for dissolve-rs operations.
#[derive(Error, Debug)]
pub enum DissolveError {
    /// The mesh cannot be sampled (no triangles, or no surface area).
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// A construction parameter is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A command was issued against a model whose mesh is not loaded.
    #[error("model '{0}' is not loaded")]
    NotLoaded(String),

    /// The mesh source failed to produce a mesh.
    #[error("failed to load '{path}': {reason}")]
    LoadFailed { path: String, reason: String },

    /// A color string could not be parsed.
    #[error("invalid color '{0}'")]
    InvalidColor(String),

    /// A model with the given name already exists.
    #[error("model '{0}' already exists")]
    ModelExists(String),

    /// A model with the given name was not found.
    #[error("model '{0}' not found")]
    ModelNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for dissolve-rs operations.
pub type Result<T> = std::result::Result<T, DissolveError>;
