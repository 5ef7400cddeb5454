//! Error types for the renderer.
//!
//! Degenerate numeric input (zero vectors, singular matrices, zero-area
//! triangles) never reaches this type; those cases have defined fallbacks.

use thiserror::Error;

use crate::scene::NodeId;

/// Main error type for the renderer.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Malformed color string
    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// Unknown Euler rotation order name
    #[error("invalid euler order: {0:?}")]
    InvalidEulerOrder(String),

    /// Index buffer not a multiple of 3 or an index past the vertex count
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Re-parenting that would make a node its own ancestor
    #[error("cannot add node {child:?} under {parent:?}: it would become its own ancestor")]
    Cycle { parent: NodeId, child: NodeId },

    /// Node id not present in the scene arena
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),

    /// Zero-sized render target
    #[error("invalid size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// OBJ loading errors
    #[error("load error: {0}")]
    Load(#[from] tobj::LoadError),

    /// Image encoding errors
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Presentation backend errors
    #[error("surface error: {0}")]
    Surface(String),
}

/// Result type alias using the renderer's error type.
pub type Result<T> = std::result::Result<T, RenderError>;
