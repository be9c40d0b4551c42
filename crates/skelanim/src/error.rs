use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for building an animated model from decoded scene data
#[derive(Error, Debug)]
pub enum AnimError {
    /// The scene description could not be decoded
    #[error("Asset parse error: {0}")]
    AssetParse(String),

    /// A binary buffer referenced by the scene could not be read
    #[error("Failed to load buffer '{}': {source}", path.display())]
    BufferLoad {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A buffer view points outside of its buffer
    #[error("Buffer range error: {0}")]
    BufferRange(String),

    /// A primitive lacks an attribute the runtime cannot work without
    #[error("Mesh '{mesh}' primitive {primitive} is missing required attribute {attribute}")]
    MissingRequiredAttribute {
        mesh: String,
        primitive: usize,
        attribute: &'static str,
    },

    /// A primitive does not fit into the 16-bit index space
    #[error(
        "Mesh '{mesh}' primitive {primitive} has {vertex_count} vertices, exceeding the 16-bit index space"
    )]
    IndexSpaceOverflow {
        mesh: String,
        primitive: usize,
        vertex_count: usize,
    },

    /// Accessor data has the wrong element type or count
    #[error("Malformed accessor: {0}")]
    MalformedAccessor(String),

    /// A reference to a node, sampler or buffer that does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// The node links do not form a forest
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// Interpolation mode the runtime does not evaluate
    #[error("Unsupported interpolation: {0}")]
    UnsupportedInterpolation(String),
}

impl From<serde_json::Error> for AnimError {
    fn from(err: serde_json::Error) -> Self {
        Self::AssetParse(err.to_string())
    }
}

/// Result type using AnimError
pub type Result<T> = std::result::Result<T, AnimError>;
