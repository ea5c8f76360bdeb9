//! Error types for the render layer.

use thiserror::Error;

use crate::scene::PrimitiveKind;

/// Upload capacity cannot hold a single primitive of `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error(
        "upload capacity of {capacity} bytes cannot hold one {kind} primitive ({required} bytes)"
    )]
    CapacityTooSmall {
        kind: PrimitiveKind,
        capacity: usize,
        required: usize,
    },
}

/// Shader program creation failure. `log` carries the full compiler/linker output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    #[error("failed to compile {kind} shader:\n{log}")]
    Compile { kind: PrimitiveKind, log: String },

    #[error("failed to link {kind} program:\n{log}")]
    Link { kind: PrimitiveKind, log: String },
}

impl ShaderError {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            ShaderError::Compile { kind, .. } | ShaderError::Link { kind, .. } => *kind,
        }
    }

    pub fn log(&self) -> &str {
        match self {
            ShaderError::Compile { log, .. } | ShaderError::Link { log, .. } => log,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("renderer used before initialize()")]
    NotInitialized,

    #[error("backend upload limit of {limit} bytes is below the required minimum of {minimum} bytes")]
    UploadLimitTooSmall { limit: usize, minimum: usize },

    #[error("unknown primitive kind tag {0}")]
    UnknownPrimitive(u32),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Shader(#[from] ShaderError),
}

/// Result type for render-layer operations.
pub type RenderResult<T> = Result<T, RenderError>;
