use thiserror::Error;
use vulkano::ValidationError;

/// Everything that can go wrong while setting up and drawing the scene.
///
/// All of these are unrecoverable for a one-shot render: callers abort the
/// remaining setup and surface the error, there is no retry or degraded mode.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("failed to allocate GPU resource: {0}")]
    ResourceAllocationFailure(String),

    #[error("vertex attribute `{0}` not found in the shader interface")]
    AttributeNotFound(String),

    #[error("failed to get a rendering context: {0}")]
    ContextUnavailable(String),

    #[error("failed to initialize shaders: {0}")]
    ShaderInitFailure(String),

    #[error("failed to record or submit draw commands: {0}")]
    SubmitFailure(String),
}

impl From<Box<ValidationError>> for RenderError {
    fn from(err: Box<ValidationError>) -> Self {
        RenderError::SubmitFailure(err.to_string())
    }
}
